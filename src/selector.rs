//! Walking the device list and running a session on every reader from the target vendor.
use crate::config::{DescriptorPolicy, ScanConfig};
use crate::descriptor::DeviceDescriptor;
use crate::error::{Error, Result};
use crate::session::{self, SessionReport};
use crate::transport::Transport;
use log::{info, warn};

/// What happened on one matching device. A failed session does not stop the scan.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DeviceReport {
    pub descriptor: DeviceDescriptor,
    pub session: Result<SessionReport>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ScanOutcome {
    Matched(Vec<DeviceReport>),
    /// Nothing on the bus carried the target ids. Informational, not an error.
    NoMatchingDevice,
}
impl ScanOutcome {
    pub fn reports(&self) -> &[DeviceReport] {
        match self {
            ScanOutcome::Matched(reports) => reports,
            ScanOutcome::NoMatchingDevice => &[],
        }
    }
}

pub fn is_target(config: &ScanConfig, descriptor: &DeviceDescriptor) -> bool {
    let id = descriptor.identifier;
    id.vendor_id == config.vendor_id
        && config
            .product_id
            .map_or(true, |product_id| id.product_id == product_id)
}

/// Scan the bus once. Devices are handled strictly one after another; the list snapshot is
/// dropped when the scan returns.
pub fn scan<T: Transport>(transport: &T, config: &ScanConfig) -> Result<ScanOutcome> {
    let devices = transport.devices().map_err(Error::DeviceListFailed)?;
    let mut reports = Vec::new();
    for device in &devices {
        let descriptor = match transport.device_descriptor(device) {
            Ok(descriptor) => descriptor,
            Err(e) => match config.descriptor_policy {
                DescriptorPolicy::AbortScan => return Err(Error::DescriptorReadFailed(e)),
                DescriptorPolicy::SkipDevice => {
                    warn!("skipping device, failed to get device descriptor: {}", e);
                    continue;
                }
            },
        };
        info!("{}", descriptor);
        if !is_target(config, &descriptor) {
            continue;
        }

        info!("Found reader {}", descriptor.identifier);
        let session = session::run(transport, device, &config.session);
        if let Err(e) = &session {
            warn!("session on {} failed: {}", descriptor, e);
        }
        reports.push(DeviceReport {
            descriptor,
            session,
        });
    }

    if reports.is_empty() {
        info!("No device with vendor id {} found", config.vendor_id);
        Ok(ScanOutcome::NoMatchingDevice)
    } else {
        Ok(ScanOutcome::Matched(reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ProductID;
    use crate::transport::mock::{Call, MockDevice, MockTransport};
    use crate::transport::UsbError;

    #[test]
    fn runs_session_only_on_target_vendor() {
        let transport = MockTransport::new(vec![
            MockDevice::reader(0x1234, 0x0001, 2),
            MockDevice::reader(0x0A89, 0x0030, 3),
        ]);
        transport.push_happy_replies(0, &[0x3B, 0x00], &[0x90, 0x00]);

        let outcome = scan(&transport, &ScanConfig::default()).unwrap();
        let reports = outcome.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].descriptor.address, 3);
        assert!(reports[0].session.is_ok());
        assert_ne!(outcome, ScanOutcome::NoMatchingDevice);

        assert_eq!(transport.count(|c| matches!(c, Call::Open(_))), 1);
        assert_eq!(transport.count(|c| *c == Call::Open(1)), 1);
        assert_eq!(transport.count(|c| *c == Call::Open(0)), 0);
    }

    #[test]
    fn empty_bus() {
        let transport = MockTransport::new(vec![]);
        let outcome = scan(&transport, &ScanConfig::default()).unwrap();
        assert_eq!(outcome, ScanOutcome::NoMatchingDevice);
        assert_eq!(transport.calls(), vec![Call::Devices]);
    }

    #[test]
    fn no_match_is_not_an_error() {
        let transport = MockTransport::new(vec![MockDevice::reader(0x1234, 0x0001, 2)]);
        let outcome = scan(&transport, &ScanConfig::default()).unwrap();
        assert_eq!(outcome, ScanOutcome::NoMatchingDevice);
        assert_eq!(transport.count(|c| matches!(c, Call::Open(_))), 0);
    }

    #[test]
    fn descriptor_failure_aborts_scan_by_default() {
        let mut broken = MockDevice::reader(0x1234, 0x0001, 2);
        broken.descriptor = Err(UsbError::Io);
        let transport = MockTransport::new(vec![broken, MockDevice::reader(0x0A89, 0x0030, 3)]);
        let result = scan(&transport, &ScanConfig::default());
        assert_eq!(result, Err(Error::DescriptorReadFailed(UsbError::Io)));
        assert_eq!(transport.count(|c| matches!(c, Call::Open(_))), 0);
    }

    #[test]
    fn descriptor_failure_can_skip_device() {
        let mut broken = MockDevice::reader(0x1234, 0x0001, 2);
        broken.descriptor = Err(UsbError::Io);
        let transport = MockTransport::new(vec![broken, MockDevice::reader(0x0A89, 0x0030, 3)]);
        let config = ScanConfig {
            descriptor_policy: DescriptorPolicy::SkipDevice,
            ..ScanConfig::default()
        };
        let outcome = scan(&transport, &config).unwrap();
        assert_eq!(outcome.reports().len(), 1);
        assert_eq!(transport.count(|c| *c == Call::Open(1)), 1);
    }

    #[test]
    fn failed_session_does_not_stop_scan() {
        let mut locked = MockDevice::reader(0x0A89, 0x0030, 2);
        locked.open = Err(UsbError::Access);
        let transport = MockTransport::new(vec![locked, MockDevice::reader(0x0A89, 0x0030, 3)]);
        let outcome = scan(&transport, &ScanConfig::default()).unwrap();
        let reports = outcome.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].session, Err(Error::OpenFailed(UsbError::Access)));
        assert!(reports[1].session.is_ok());
    }

    #[test]
    fn list_failure() {
        let mut transport = MockTransport::new(vec![]);
        transport.list_error = Some(UsbError::NoMem);
        assert_eq!(
            scan(&transport, &ScanConfig::default()),
            Err(Error::DeviceListFailed(UsbError::NoMem))
        );
    }

    #[test]
    fn product_filter() {
        let transport = MockTransport::new(vec![
            MockDevice::reader(0x0A89, 0x0020, 2),
            MockDevice::reader(0x0A89, 0x0030, 3),
        ]);
        let config = ScanConfig {
            product_id: Some(ProductID(0x0030)),
            ..ScanConfig::default()
        };
        let outcome = scan(&transport, &config).unwrap();
        assert_eq!(outcome.reports().len(), 1);
        assert_eq!(outcome.reports()[0].descriptor.address, 3);
    }
}
