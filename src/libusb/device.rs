use crate::libusb::config_descriptor::ConfigDescriptor;
use crate::libusb::device_descriptor::DeviceDescriptor;
use crate::libusb::device_handle::DeviceHandle;
use crate::transport::UsbError;

/// A referenced `libusb_device`. The reference is dropped with the value.
#[derive(Debug)]
pub struct Device(core::ptr::NonNull<libusb1_sys::libusb_device>);
impl Device {
    /// # Safety
    /// Assumes the pointer is valid, points to a `libusb_device` and carries a reference owned by
    /// the new value.
    pub const unsafe fn from_libusb(ptr: core::ptr::NonNull<libusb1_sys::libusb_device>) -> Device {
        Device(ptr)
    }

    pub fn active_config_descriptor(&self) -> Result<ConfigDescriptor, UsbError> {
        let mut out: *const libusb1_sys::libusb_config_descriptor = core::ptr::null();
        try_unsafe!(libusb1_sys::libusb_get_active_config_descriptor(
            self.0.as_ptr(),
            &mut out as *mut _
        ));
        let ptr = core::ptr::NonNull::new(out as *mut libusb1_sys::libusb_config_descriptor)
            .ok_or(UsbError::NotFound)?;
        Ok(unsafe { ConfigDescriptor::from_libusb(ptr) })
    }
    pub fn bus_number(&self) -> u8 {
        unsafe { libusb1_sys::libusb_get_bus_number(self.0.as_ptr()) }
    }
    pub fn device_address(&self) -> u8 {
        unsafe { libusb1_sys::libusb_get_device_address(self.0.as_ptr()) }
    }

    pub fn device_descriptor(&self) -> Result<DeviceDescriptor, UsbError> {
        let mut out: core::mem::MaybeUninit<libusb1_sys::libusb_device_descriptor> =
            core::mem::MaybeUninit::uninit();
        try_unsafe!(libusb1_sys::libusb_get_device_descriptor(
            self.0.as_ptr() as *const _,
            out.as_mut_ptr()
        ));
        Ok(unsafe { DeviceDescriptor::from(out.assume_init()) })
    }
    pub fn open(&self) -> Result<DeviceHandle, UsbError> {
        let mut out = core::ptr::null_mut();
        try_unsafe!(libusb1_sys::libusb_open(self.0.as_ptr(), &mut out));
        let ptr = core::ptr::NonNull::new(out).ok_or(UsbError::Other)?;
        Ok(unsafe { DeviceHandle::from_libusb(ptr) })
    }
}
impl Drop for Device {
    fn drop(&mut self) {
        unsafe { libusb1_sys::libusb_unref_device(self.0.as_ptr()) }
    }
}

/// The array returned by `libusb_get_device_list`. Devices handed out by [`DeviceList::get`]
/// take their own reference, so they outlive the list.
#[derive(Debug)]
pub struct DeviceList {
    ptr: core::ptr::NonNull<*mut libusb1_sys::libusb_device>,
    len: usize,
}
impl DeviceList {
    /// # Safety
    /// Assumes the pointer is valid and points to a list of `len` devices
    pub const unsafe fn from_libusb(
        ptr: core::ptr::NonNull<*mut libusb1_sys::libusb_device>,
        len: usize,
    ) -> DeviceList {
        DeviceList { ptr, len }
    }
    fn len(&self) -> usize {
        self.len
    }
    pub fn get(&self, pos: usize) -> Option<Device> {
        if pos >= self.len {
            return None;
        }
        let ptr = unsafe { *self.ptr.as_ptr().add(pos) };
        let ptr = core::ptr::NonNull::new(ptr)?;
        unsafe {
            libusb1_sys::libusb_ref_device(ptr.as_ptr());
            Some(Device::from_libusb(ptr))
        }
    }
    pub fn iter(&self) -> DeviceListIter<'_> {
        DeviceListIter { list: self, pos: 0 }
    }
}
impl Drop for DeviceList {
    fn drop(&mut self) {
        unsafe { libusb1_sys::libusb_free_device_list(self.ptr.as_ptr(), 1) }
    }
}
pub struct DeviceListIter<'a> {
    list: &'a DeviceList,
    pos: usize,
}
impl<'a> core::iter::Iterator for DeviceListIter<'a> {
    type Item = Device;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.list.len() {
            let out = self.list.get(self.pos);
            self.pos += 1;
            if out.is_some() {
                return out;
            }
        }
        None
    }
}
