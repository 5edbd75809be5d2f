//! Find a CCID smart-card reader on the USB bus and run one power-on / APDU / power-off cycle
//! against it over the bulk endpoints.
pub mod ccid;
pub mod config;
pub mod descriptor;
pub mod device;
pub mod endpoints;
pub mod error;
#[cfg(feature = "libusb")]
pub mod libusb;
pub mod selector;
pub mod session;
pub mod transport;

pub use error::{Error, Result};
