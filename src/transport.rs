//! The USB collaborator the CCID flow is driven through.
//!
//! [`Transport`] covers exactly what a session needs: a device list snapshot, descriptor
//! retrieval, open/close, interface claim/release and blocking bulk transfers. The libusb
//! backend lives in [`crate::libusb`]; tests use the in-memory mock.
use crate::descriptor::{ConfigDescriptor, DeviceDescriptor};
use core::fmt;
use core::time::Duration;

#[cfg(test)]
pub(crate) mod mock;

/// USB transport errors. Discriminants are the libusb error codes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum UsbError {
    /// Input/output error.
    Io = -1,

    /// Invalid parameter.
    InvalidParam = -2,

    /// Access denied (insufficient permissions).
    Access = -3,

    /// No such device (it may have been disconnected).
    NoDevice = -4,

    /// Entity not found.
    NotFound = -5,

    /// Resource busy.
    Busy = -6,

    /// Operation timed out.
    Timeout = -7,

    /// Overflow.
    Overflow = -8,

    /// Pipe error.
    Pipe = -9,

    /// System call interrupted (perhaps due to signal).
    Interrupted = -10,

    /// Insufficient memory.
    NoMem = -11,

    /// Operation not supported or unimplemented on this platform.
    NotSupported = -12,

    /// Other error.
    Other = -99,
}
impl UsbError {
    /// Signed status code as libusb reports it.
    pub const fn code(self) -> i32 {
        self as i32
    }
    pub fn is_timeout(self) -> bool {
        self == UsbError::Timeout
    }
    pub fn as_str(self) -> &'static str {
        match self {
            UsbError::Io => "Input/Output Error",
            UsbError::InvalidParam => "Invalid parameter",
            UsbError::Access => "Access denied (insufficient permissions)",
            UsbError::NoDevice => "No such device (it may have been disconnected)",
            UsbError::NotFound => "Entity not found",
            UsbError::Busy => "Resource busy",
            UsbError::Timeout => "Operation timed out",
            UsbError::Overflow => "Overflow",
            UsbError::Pipe => "Pipe error",
            UsbError::Interrupted => "System call interrupted (perhaps due to signal)",
            UsbError::NoMem => "Insufficient memory",
            UsbError::NotSupported => "Operation not supported or unimplemented on this platform",
            UsbError::Other => "Other error",
        }
    }
}
impl fmt::Display for UsbError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

impl std::error::Error for UsbError {}

/// What a bulk transfer moved, with the libusb status it finished on.
///
/// `status` is 0 for a completed transfer. libusb can also end a transfer with
/// `LIBUSB_ERROR_TIMEOUT` or `LIBUSB_ERROR_INTERRUPTED` after some bytes already moved; those
/// come back here with the negative code kept in `status`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Transferred {
    pub status: i32,
    pub len: usize,
}
impl Transferred {
    pub const fn complete(len: usize) -> Transferred {
        Transferred { status: 0, len }
    }
    pub const fn partial(status: UsbError, len: usize) -> Transferred {
        Transferred {
            status: status.code(),
            len,
        }
    }
    pub const fn is_complete(&self) -> bool {
        self.status == 0
    }
}

/// Blocking USB transport.
///
/// `Device` is an enumerated (unopened) device; `Handle` is an opened one. Dropping the `Vec`
/// returned by [`Transport::devices`] releases the snapshot.
pub trait Transport {
    type Device;
    type Handle;

    fn devices(&self) -> Result<Vec<Self::Device>, UsbError>;
    fn device_descriptor(&self, device: &Self::Device) -> Result<DeviceDescriptor, UsbError>;
    fn active_config_descriptor(&self, device: &Self::Device)
        -> Result<ConfigDescriptor, UsbError>;

    fn open(&self, device: &Self::Device) -> Result<Self::Handle, UsbError>;
    fn close(&self, handle: Self::Handle);

    fn claim_interface(&self, handle: &mut Self::Handle, interface: u8) -> Result<(), UsbError>;
    fn release_interface(&self, handle: &mut Self::Handle, interface: u8)
        -> Result<(), UsbError>;

    /// Write `data` to an OUT endpoint.
    fn bulk_write(
        &self,
        handle: &Self::Handle,
        endpoint: u8,
        data: &[u8],
        timeout: Duration,
    ) -> Result<Transferred, UsbError>;

    /// Read into `data` from an IN endpoint. Short reads are not errors; `len` is what was
    /// actually filled.
    fn bulk_read(
        &self,
        handle: &Self::Handle,
        endpoint: u8,
        data: &mut [u8],
        timeout: Duration,
    ) -> Result<Transferred, UsbError>;
}

#[cfg(test)]
mod tests {
    use super::{Transferred, UsbError};

    #[test]
    fn codes_match_libusb() {
        assert_eq!(UsbError::Timeout.code(), -7);
        assert_eq!(UsbError::Pipe.code(), -9);
        assert_eq!(UsbError::Other.code(), -99);
        assert!(UsbError::Timeout.is_timeout());
        assert!(!UsbError::Io.is_timeout());
    }

    #[test]
    fn display_includes_code() {
        assert_eq!(UsbError::Busy.to_string(), "Resource busy (-6)");
    }

    #[test]
    fn partial_transfer_keeps_status() {
        let partial = Transferred::partial(UsbError::Timeout, 12);
        assert_eq!(partial.status, -7);
        assert_eq!(partial.len, 12);
        assert!(!partial.is_complete());
        assert!(Transferred::complete(0).is_complete());
    }
}
