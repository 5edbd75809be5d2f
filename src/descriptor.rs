//! Owned descriptor values.
//!
//! Transports convert whatever native descriptors they read into these plain values, so the
//! endpoint classifier never touches FFI memory and tests can build descriptors by hand.
use crate::device::DeviceIdentifier;
use core::fmt;

/// Bit 7 of an endpoint address; set for IN (device-to-host) endpoints.
pub const ENDPOINT_DIR_IN: u8 = 0x80;
const TRANSFER_TYPE_MASK: u8 = 0x03;

/// What enumeration reports about a device.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct DeviceDescriptor {
    pub identifier: DeviceIdentifier,
    pub bus_number: u8,
    pub address: u8,
}
impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (bus {}, device {})",
            self.identifier, self.bus_number, self.address
        )
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum TransferType {
    Control,
    Isochronous,
    Bulk,
    Interrupt,
}
impl TransferType {
    /// Decode the transfer type from an endpoint's `bmAttributes`.
    pub const fn from_attributes(attributes: u8) -> TransferType {
        match attributes & TRANSFER_TYPE_MASK {
            0 => TransferType::Control,
            1 => TransferType::Isochronous,
            2 => TransferType::Bulk,
            _ => TransferType::Interrupt,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Direction {
    /// Device to host.
    In,
    /// Host to device.
    Out,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct EndpointDescriptor {
    pub address: u8,
    pub transfer_type: TransferType,
}
impl EndpointDescriptor {
    pub const fn new(address: u8, transfer_type: TransferType) -> EndpointDescriptor {
        EndpointDescriptor {
            address,
            transfer_type,
        }
    }
    pub const fn direction(&self) -> Direction {
        if self.address & ENDPOINT_DIR_IN != 0 {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

/// One alternate setting of an interface.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct InterfaceDescriptor {
    pub interface_number: u8,
    pub setting_number: u8,
    pub class_code: u8,
    pub endpoints: Vec<EndpointDescriptor>,
}

/// An interface and its alternate settings, in descriptor order.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Interface {
    pub alt_settings: Vec<InterfaceDescriptor>,
}
impl Interface {
    pub fn first_setting(&self) -> Option<&InterfaceDescriptor> {
        self.alt_settings.first()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ConfigDescriptor {
    pub number: u8,
    pub interfaces: Vec<Interface>,
}
