use crate::libusb::device::DeviceList;
use crate::transport::UsbError;

#[derive(Copy, Clone, Debug)]
#[repr(i32)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
}

/// A libusb session. `libusb_init` runs in [`Context::new`] and `libusb_exit` when the value is
/// dropped, so the program's lifetime of the library is the lifetime of this value.
#[derive(Debug)]
pub struct Context(core::ptr::NonNull<libusb1_sys::libusb_context>);
unsafe impl Send for Context {}
impl Context {
    pub fn new() -> Result<Context, UsbError> {
        let mut context = core::ptr::null_mut();
        try_unsafe!(libusb1_sys::libusb_init(&mut context));
        core::ptr::NonNull::new(context)
            .map(Context)
            .ok_or(UsbError::Other)
    }
    pub fn set_debug_level(&self, new_level: LogLevel) {
        unsafe { libusb1_sys::libusb_set_debug(self.0.as_ptr(), new_level as i32) }
    }
    pub fn device_list(&self) -> Result<DeviceList, UsbError> {
        let mut out = core::ptr::null();
        let len = unsafe { libusb1_sys::libusb_get_device_list(self.0.as_ptr(), &mut out) };
        if len < 0 {
            return Err(crate::libusb::error::from_libusb(len as i32));
        }
        let ptr = core::ptr::NonNull::new(out as *mut *mut libusb1_sys::libusb_device)
            .ok_or(UsbError::NoMem)?;
        Ok(unsafe { DeviceList::from_libusb(ptr, len as usize) })
    }
}
impl Drop for Context {
    fn drop(&mut self) {
        unsafe { libusb1_sys::libusb_exit(self.0.as_ptr()) }
    }
}
