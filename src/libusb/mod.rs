//! Safe owned wrappers around `libusb1-sys`, plus the [`Transport`](crate::transport::Transport)
//! implementation built on them.
#[macro_use]
pub mod error;
pub mod backend;
pub mod config_descriptor;
pub mod context;
pub mod device;
pub mod device_descriptor;
pub mod device_handle;
pub mod endpoint_descriptor;
pub mod interface_descriptor;
pub mod interfaces;
