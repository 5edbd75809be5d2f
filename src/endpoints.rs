//! Locating the CCID interface and its endpoints in a configuration descriptor.
use crate::descriptor::{ConfigDescriptor, Direction, TransferType};
use crate::error::Error;

/// Smart Card device class.
pub const CCID_CLASS: u8 = 0x0B;
/// Vendor specific class. Some readers speak CCID but never declare the class.
pub const VENDOR_SPECIFIC_CLASS: u8 = 0xFF;

pub fn is_ccid_compatible(class_code: u8) -> bool {
    class_code == CCID_CLASS || class_code == VENDOR_SPECIFIC_CLASS
}

/// Endpoint addresses of a CCID interface.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Endpoints {
    pub bulk_in: u8,
    pub bulk_out: u8,
    /// Slot change notifications. Unused by the synchronous flow.
    pub interrupt: Option<u8>,
}

/// The interface a session drives, as chosen by [`classify`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct CcidInterface {
    pub interface_number: u8,
    pub endpoints: Endpoints,
}

/// Find the first CCID-compatible interface and sort its endpoints.
///
/// Only the first alternate setting of each interface is considered. The first interrupt
/// endpoint wins; bulk endpoints are split by the direction bit of their address.
pub fn classify(config: &ConfigDescriptor) -> Result<CcidInterface, Error> {
    let setting = config
        .interfaces
        .iter()
        .filter_map(|interface| interface.first_setting())
        .find(|setting| is_ccid_compatible(setting.class_code))
        .ok_or(Error::NoSuitableInterface)?;

    let mut bulk_in = None;
    let mut bulk_out = None;
    let mut interrupt = None;
    for endpoint in &setting.endpoints {
        match (endpoint.transfer_type, endpoint.direction()) {
            (TransferType::Interrupt, _) => {
                interrupt.get_or_insert(endpoint.address);
            }
            (TransferType::Bulk, Direction::In) => bulk_in = Some(endpoint.address),
            (TransferType::Bulk, Direction::Out) => bulk_out = Some(endpoint.address),
            _ => (),
        }
    }

    match (bulk_in, bulk_out) {
        (Some(bulk_in), Some(bulk_out)) => Ok(CcidInterface {
            interface_number: setting.interface_number,
            endpoints: Endpoints {
                bulk_in,
                bulk_out,
                interrupt,
            },
        }),
        _ => Err(Error::IncompleteEndpoints {
            interface: setting.interface_number,
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::descriptor::{EndpointDescriptor, Interface, InterfaceDescriptor};

    pub(crate) fn interface(
        number: u8,
        class_code: u8,
        endpoints: &[(u8, TransferType)],
    ) -> Interface {
        Interface {
            alt_settings: vec![InterfaceDescriptor {
                interface_number: number,
                setting_number: 0,
                class_code,
                endpoints: endpoints
                    .iter()
                    .map(|&(address, kind)| EndpointDescriptor::new(address, kind))
                    .collect(),
            }],
        }
    }

    /// A typical single-slot reader: interrupt 0x83, bulk 0x81 / 0x02.
    pub(crate) fn reader_config() -> ConfigDescriptor {
        ConfigDescriptor {
            number: 1,
            interfaces: vec![interface(
                0,
                CCID_CLASS,
                &[
                    (0x81, TransferType::Bulk),
                    (0x02, TransferType::Bulk),
                    (0x83, TransferType::Interrupt),
                ],
            )],
        }
    }

    #[test]
    fn finds_all_three_endpoints() {
        let found = classify(&reader_config()).unwrap();
        assert_eq!(found.interface_number, 0);
        assert_eq!(
            found.endpoints,
            Endpoints {
                bulk_in: 0x81,
                bulk_out: 0x02,
                interrupt: Some(0x83),
            }
        );
    }

    #[test]
    fn no_ccid_interface() {
        let config = ConfigDescriptor {
            number: 1,
            interfaces: vec![
                interface(0, 0x03, &[(0x81, TransferType::Interrupt)]),
                interface(
                    1,
                    0x08,
                    &[(0x82, TransferType::Bulk), (0x01, TransferType::Bulk)],
                ),
            ],
        };
        assert_eq!(classify(&config), Err(Error::NoSuitableInterface));
        assert_eq!(
            classify(&ConfigDescriptor::default()),
            Err(Error::NoSuitableInterface)
        );
    }

    #[test]
    fn missing_bulk_out() {
        let config = ConfigDescriptor {
            number: 1,
            interfaces: vec![interface(
                0,
                CCID_CLASS,
                &[(0x81, TransferType::Bulk), (0x83, TransferType::Interrupt)],
            )],
        };
        assert_eq!(
            classify(&config),
            Err(Error::IncompleteEndpoints { interface: 0 })
        );
    }

    #[test]
    fn vendor_class_is_accepted_and_first_match_wins() {
        let config = ConfigDescriptor {
            number: 1,
            interfaces: vec![
                interface(0, 0x03, &[(0x84, TransferType::Interrupt)]),
                interface(
                    1,
                    VENDOR_SPECIFIC_CLASS,
                    &[(0x85, TransferType::Bulk), (0x06, TransferType::Bulk)],
                ),
                interface(
                    2,
                    CCID_CLASS,
                    &[(0x81, TransferType::Bulk), (0x02, TransferType::Bulk)],
                ),
            ],
        };
        let found = classify(&config).unwrap();
        assert_eq!(found.interface_number, 1);
        assert_eq!(found.endpoints.bulk_in, 0x85);
        assert_eq!(found.endpoints.bulk_out, 0x06);
        assert_eq!(found.endpoints.interrupt, None);
    }

    #[test]
    fn first_interrupt_endpoint_wins() {
        let config = ConfigDescriptor {
            number: 1,
            interfaces: vec![interface(
                0,
                CCID_CLASS,
                &[
                    (0x83, TransferType::Interrupt),
                    (0x84, TransferType::Interrupt),
                    (0x81, TransferType::Bulk),
                    (0x02, TransferType::Bulk),
                    (0x00, TransferType::Control),
                ],
            )],
        };
        assert_eq!(classify(&config).unwrap().endpoints.interrupt, Some(0x83));
    }

    #[test]
    fn only_first_alt_setting_is_inspected() {
        let mut iface = interface(0, 0x03, &[]);
        iface.alt_settings.push(InterfaceDescriptor {
            interface_number: 0,
            setting_number: 1,
            class_code: CCID_CLASS,
            endpoints: vec![
                EndpointDescriptor::new(0x81, TransferType::Bulk),
                EndpointDescriptor::new(0x02, TransferType::Bulk),
            ],
        });
        let config = ConfigDescriptor {
            number: 1,
            interfaces: vec![iface],
        };
        assert_eq!(classify(&config), Err(Error::NoSuitableInterface));
    }
}
