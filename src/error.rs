use crate::ccid::CodecError;
use crate::session::SessionState;
use crate::transport::UsbError;
use core::fmt;
use thiserror::Error;

/// One half of a command/response pair inside a session.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Step {
    PowerOn,
    AtrRead,
    ApduSend,
    ApduReply,
    PowerOff,
    PowerOffReply,
}
impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::PowerOn => "power on",
            Step::AtrRead => "ATR read",
            Step::ApduSend => "APDU send",
            Step::ApduReply => "APDU reply",
            Step::PowerOff => "power off",
            Step::PowerOffReply => "power off reply",
        }
    }
}
impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("failed to initialize libusb: {0}")]
    Init(#[source] UsbError),

    #[error("failed to get the device list: {0}")]
    DeviceListFailed(#[source] UsbError),

    #[error("failed to get device descriptor: {0}")]
    DescriptorReadFailed(#[source] UsbError),

    #[error("unable to open the USB device: {0}")]
    OpenFailed(#[source] UsbError),

    #[error("unable to claim interface {interface}: {source}")]
    ClaimFailed { interface: u8, source: UsbError },

    #[error("unable to release interface {interface}: {source}")]
    ReleaseFailed { interface: u8, source: UsbError },

    #[error("no CCID or vendor-specific interface in the active configuration")]
    NoSuitableInterface,

    #[error("interface {interface} lacks a bulk-in or bulk-out endpoint")]
    IncompleteEndpoints { interface: u8 },

    #[error("{step} timed out")]
    TransferTimeout { step: Step },

    #[error("{step} failed: {source}")]
    TransferError { step: Step, source: UsbError },

    #[error("{step}: response sequence {received} does not match command sequence {expected}")]
    SequenceMismatch {
        step: Step,
        expected: u8,
        received: u8,
    },

    #[error("session step needs state {expected:?} but the session is {actual:?}")]
    OutOfOrder {
        expected: SessionState,
        actual: SessionState,
    },

    #[error("malformed CCID message: {0}")]
    Codec(#[from] CodecError),
}
impl Error {
    /// Classify a failed bulk transfer.
    pub fn transfer(step: Step, err: UsbError) -> Error {
        if err.is_timeout() {
            Error::TransferTimeout { step }
        } else {
            Error::TransferError { step, source: err }
        }
    }
}
