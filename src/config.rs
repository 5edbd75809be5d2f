//! Knobs for a scan and for each session it starts.
use crate::device::{ProductID, VendorID};
use core::time::Duration;

/// Rutoken's vendor id.
pub const DEFAULT_VENDOR_ID: VendorID = VendorID(0x0A89);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const MAX_ATR_LEN: usize = 33;
pub const MAX_REPLY_LEN: usize = 256;
/// SELECT by file identifier, MF (3F00).
pub const SELECT_MF: [u8; 7] = [0x00, 0xA4, 0x00, 0x00, 0x02, 0x3F, 0x00];

/// What to do when a device's descriptor cannot be read during a scan.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Default)]
pub enum DescriptorPolicy {
    /// Fail the whole scan.
    #[default]
    AbortScan,
    /// Log and move on to the next device.
    SkipDevice,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SessionConfig {
    /// Interface to claim. `None` claims the interface the classifier picked.
    pub claim_interface: Option<u8>,
    pub slot: u8,
    pub timeout: Duration,
    pub apdu: Vec<u8>,
    pub max_atr_len: usize,
    pub max_reply_len: usize,
    /// Reject replies whose `bSeq` differs from the command's.
    pub verify_sequence: bool,
}
impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            claim_interface: Some(0),
            slot: 0,
            timeout: DEFAULT_TIMEOUT,
            apdu: SELECT_MF.to_vec(),
            max_atr_len: MAX_ATR_LEN,
            max_reply_len: MAX_REPLY_LEN,
            verify_sequence: true,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ScanConfig {
    pub vendor_id: VendorID,
    pub product_id: Option<ProductID>,
    pub descriptor_policy: DescriptorPolicy,
    pub session: SessionConfig,
}
impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: None,
            descriptor_policy: DescriptorPolicy::default(),
            session: SessionConfig::default(),
        }
    }
}
