//! CCID bulk message framing.
//!
//! Every bulk message starts with the same 10 byte header:
//!
//! ```text
//! Offset  Size  Field
//! 0       1     bMessageType
//! 1       4     dwLength (little-endian), length of the data that follows
//! 5       1     bSlot
//! 6       1     bSeq
//! 7       3     message specific parameters
//! 10      N     abData
//! ```
//!
//! For replies the parameters are `bStatus`, `bError` and a message specific byte.
use core::convert::TryFrom;
use core::fmt;
use thiserror::Error;

pub const HEADER_LEN: usize = 10;

/// `bPowerSelect` value asking the reader for 5.0V.
pub const POWER_SELECT_5V: u8 = 0x01;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// PC_to_RDR_IccPowerOn
    PowerOn = 0x62,
    /// PC_to_RDR_IccPowerOff
    PowerOff = 0x63,
    /// PC_to_RDR_XfrBlock
    XfrBlock = 0x6F,
    /// RDR_to_PC_DataBlock
    DataBlock = 0x80,
    /// RDR_to_PC_SlotStatus
    SlotStatus = 0x81,
}
impl From<MessageType> for u8 {
    fn from(message_type: MessageType) -> Self {
        message_type as u8
    }
}
impl TryFrom<u8> for MessageType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x62 => Ok(MessageType::PowerOn),
            0x63 => Ok(MessageType::PowerOff),
            0x6F => Ok(MessageType::XfrBlock),
            0x80 => Ok(MessageType::DataBlock),
            0x81 => Ok(MessageType::SlotStatus),
            other => Err(CodecError::UnknownMessageType(other)),
        }
    }
}

#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum CodecError {
    #[error("buffer holds {0} bytes, a CCID header needs 10")]
    ShortBuffer(usize),
    #[error("header announces {expected} payload bytes but only {actual} follow")]
    TruncatedPayload { expected: usize, actual: usize },
    #[error("unknown CCID message type 0x{0:02X}")]
    UnknownMessageType(u8),
}

/// ICC presence as reported in the low bits of `bStatus`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum IccStatus {
    PresentActive,
    PresentInactive,
    NotPresent,
    Reserved,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct CcidHeader {
    pub message_type: MessageType,
    pub data_length: u32,
    pub slot: u8,
    pub sequence: u8,
    pub param1: u8,
    pub param2: u8,
    pub param3: u8,
}
impl CcidHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let len = self.data_length.to_le_bytes();
        [
            self.message_type.into(),
            len[0],
            len[1],
            len[2],
            len[3],
            self.slot,
            self.sequence,
            self.param1,
            self.param2,
            self.param3,
        ]
    }
    pub fn from_bytes(bytes: &[u8]) -> Result<CcidHeader, CodecError> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::ShortBuffer(bytes.len()));
        }
        Ok(CcidHeader {
            message_type: MessageType::try_from(bytes[0])?,
            data_length: u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]),
            slot: bytes[5],
            sequence: bytes[6],
            param1: bytes[7],
            param2: bytes[8],
            param3: bytes[9],
        })
    }

    /// `bStatus` bits 0-1 of a reply.
    pub fn icc_status(&self) -> IccStatus {
        match self.param1 & 0x03 {
            0 => IccStatus::PresentActive,
            1 => IccStatus::PresentInactive,
            2 => IccStatus::NotPresent,
            _ => IccStatus::Reserved,
        }
    }
    /// `bStatus` bits 6-7 of a reply: 0 processed, 1 failed, 2 time extension requested.
    pub fn command_status(&self) -> u8 {
        (self.param1 >> 6) & 0x03
    }
    pub fn command_failed(&self) -> bool {
        self.command_status() == 1
    }
    /// `bError` of a reply; only meaningful when the command failed.
    pub fn error_code(&self) -> u8 {
        self.param2
    }
}

/// Serialize a header plus `payload`. `dwLength` is always the payload length.
pub fn encode(
    message_type: MessageType,
    slot: u8,
    sequence: u8,
    params: [u8; 3],
    payload: &[u8],
) -> Vec<u8> {
    let header = CcidHeader {
        message_type,
        data_length: payload.len() as u32,
        slot,
        sequence,
        param1: params[0],
        param2: params[1],
        param3: params[2],
    };
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(payload);
    out
}

/// Split a received message into its header and the `dwLength` bytes of payload. Bytes past the
/// payload are ignored.
pub fn decode(buffer: &[u8]) -> Result<(CcidHeader, &[u8]), CodecError> {
    let header = CcidHeader::from_bytes(buffer)?;
    let body = &buffer[HEADER_LEN..];
    let expected = header.data_length as usize;
    if body.len() < expected {
        return Err(CodecError::TruncatedPayload {
            expected,
            actual: body.len(),
        });
    }
    Ok((header, &body[..expected]))
}

/// Formats bytes as space separated upper-case hex, the way readers' traces usually look.
pub struct HexDump<'a>(pub &'a [u8]);
impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

pub fn power_on(slot: u8, sequence: u8) -> Vec<u8> {
    encode(
        MessageType::PowerOn,
        slot,
        sequence,
        [POWER_SELECT_5V, 0, 0],
        &[],
    )
}

pub fn power_off(slot: u8, sequence: u8) -> Vec<u8> {
    encode(MessageType::PowerOff, slot, sequence, [0; 3], &[])
}

pub fn xfr_block(slot: u8, sequence: u8, apdu: &[u8]) -> Vec<u8> {
    encode(MessageType::XfrBlock, slot, sequence, [0; 3], apdu)
}
