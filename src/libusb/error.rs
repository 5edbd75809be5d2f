use crate::transport::UsbError;

/// libusb's own short name for an error (e.g. `LIBUSB_ERROR_TIMEOUT`).
pub fn libusb_name(err: UsbError) -> &'static str {
    unsafe {
        let ptr = libusb1_sys::libusb_error_name(err.code());
        std::ffi::CStr::from_ptr(ptr)
            .to_str()
            .unwrap_or("LIBUSB_ERROR_OTHER")
    }
}

pub fn from_libusb(err: i32) -> UsbError {
    match err {
        libusb1_sys::constants::LIBUSB_ERROR_IO => UsbError::Io,
        libusb1_sys::constants::LIBUSB_ERROR_INVALID_PARAM => UsbError::InvalidParam,
        libusb1_sys::constants::LIBUSB_ERROR_ACCESS => UsbError::Access,
        libusb1_sys::constants::LIBUSB_ERROR_NO_DEVICE => UsbError::NoDevice,
        libusb1_sys::constants::LIBUSB_ERROR_NOT_FOUND => UsbError::NotFound,
        libusb1_sys::constants::LIBUSB_ERROR_BUSY => UsbError::Busy,
        libusb1_sys::constants::LIBUSB_ERROR_TIMEOUT => UsbError::Timeout,
        libusb1_sys::constants::LIBUSB_ERROR_OVERFLOW => UsbError::Overflow,
        libusb1_sys::constants::LIBUSB_ERROR_PIPE => UsbError::Pipe,
        libusb1_sys::constants::LIBUSB_ERROR_INTERRUPTED => UsbError::Interrupted,
        libusb1_sys::constants::LIBUSB_ERROR_NO_MEM => UsbError::NoMem,
        libusb1_sys::constants::LIBUSB_ERROR_NOT_SUPPORTED => UsbError::NotSupported,
        libusb1_sys::constants::LIBUSB_ERROR_OTHER => UsbError::Other,
        _ => UsbError::Other,
    }
}
macro_rules! try_unsafe {
    ($x:expr) => {
        match unsafe { $x } {
            0 => (),
            err => return Err($crate::libusb::error::from_libusb(err)),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::from_libusb;
    use crate::transport::UsbError;

    #[test]
    fn maps_known_codes() {
        assert_eq!(from_libusb(-7), UsbError::Timeout);
        assert_eq!(from_libusb(-4), UsbError::NoDevice);
        assert_eq!(from_libusb(-1234), UsbError::Other);
    }
}
