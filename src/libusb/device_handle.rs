use crate::libusb::error;
use crate::libusb::interfaces::ClaimedInterfaces;
use crate::transport::{Transferred, UsbError};
use core::convert::TryInto;

/// An opened device. Interfaces still claimed when the handle is dropped are released before
/// `libusb_close`.
#[derive(Debug)]
pub struct DeviceHandle {
    handle: core::ptr::NonNull<libusb1_sys::libusb_device_handle>,
    interfaces: ClaimedInterfaces,
}
unsafe impl Send for DeviceHandle {}
impl Drop for DeviceHandle {
    fn drop(&mut self) {
        unsafe {
            while let Some(i) = self.interfaces.pop() {
                libusb1_sys::libusb_release_interface(self.handle.as_ptr(), i.into());
            }
            libusb1_sys::libusb_close(self.handle.as_ptr())
        }
    }
}

impl DeviceHandle {
    /// # Safety
    /// Assumes the pointer came from `libusb_open` and is owned by the new value.
    pub const unsafe fn from_libusb(
        ptr: core::ptr::NonNull<libusb1_sys::libusb_device_handle>,
    ) -> DeviceHandle {
        DeviceHandle {
            handle: ptr,
            interfaces: ClaimedInterfaces::DEFAULT,
        }
    }

    pub fn set_auto_detach_kernel_driver(&self, enabled: bool) -> Result<(), UsbError> {
        try_unsafe!(libusb1_sys::libusb_set_auto_detach_kernel_driver(
            self.handle.as_ptr(),
            enabled.into()
        ));
        Ok(())
    }

    pub fn bulk_write(
        &self,
        endpoint: u8,
        data: &[u8],
        timeout: core::time::Duration,
    ) -> Result<Transferred, UsbError> {
        if endpoint & libusb1_sys::constants::LIBUSB_ENDPOINT_DIR_MASK
            != libusb1_sys::constants::LIBUSB_ENDPOINT_OUT
        {
            return Err(UsbError::InvalidParam);
        }
        // libusb only reads from the buffer on OUT transfers.
        self.bulk_transfer(endpoint, data.as_ptr() as *mut u8, data.len(), timeout)
    }

    pub fn bulk_read(
        &self,
        endpoint: u8,
        data: &mut [u8],
        timeout: core::time::Duration,
    ) -> Result<Transferred, UsbError> {
        if endpoint & libusb1_sys::constants::LIBUSB_ENDPOINT_DIR_MASK
            != libusb1_sys::constants::LIBUSB_ENDPOINT_IN
        {
            return Err(UsbError::InvalidParam);
        }
        self.bulk_transfer(endpoint, data.as_mut_ptr(), data.len(), timeout)
    }

    fn bulk_transfer(
        &self,
        endpoint: u8,
        data: *mut u8,
        len: usize,
        timeout: core::time::Duration,
    ) -> Result<Transferred, UsbError> {
        let len: i32 = len.try_into().map_err(|_| UsbError::InvalidParam)?;
        let timeout: u32 = timeout.as_millis().try_into().unwrap_or(u32::MAX);
        let mut transferred = 0;
        let res = unsafe {
            libusb1_sys::libusb_bulk_transfer(
                self.handle.as_ptr(),
                endpoint,
                data,
                len,
                &mut transferred as *mut i32,
                timeout,
            )
        };
        let transferred = usize::try_from(transferred).unwrap_or(0);
        match res {
            0 => Ok(Transferred::complete(transferred)),
            err if err == libusb1_sys::constants::LIBUSB_ERROR_INTERRUPTED
                || err == libusb1_sys::constants::LIBUSB_ERROR_TIMEOUT =>
            {
                if transferred > 0 {
                    Ok(Transferred {
                        status: err,
                        len: transferred,
                    })
                } else {
                    Err(error::from_libusb(err))
                }
            }
            err => Err(error::from_libusb(err)),
        }
    }

    pub fn claim_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        if self.interfaces.is_claimed(interface) {
            return Ok(());
        }
        try_unsafe!(libusb1_sys::libusb_claim_interface(
            self.handle.as_ptr(),
            interface.into()
        ));
        self.interfaces.claim(interface);
        Ok(())
    }
    pub fn release_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        if !self.interfaces.is_claimed(interface) {
            return Ok(());
        }
        try_unsafe!(libusb1_sys::libusb_release_interface(
            self.handle.as_ptr(),
            interface.into()
        ));
        self.interfaces.release(interface);
        Ok(())
    }
    pub fn close(self) {
        drop(self)
    }
}
