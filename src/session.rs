//! One power-on / APDU / power-off cycle against a single reader.
//!
//! A [`Session`] walks
//! `Closed → Opened → InterfaceClaimed → PoweredOn → ApduExchanged → PoweredOff →
//! InterfaceReleased → Closed`. Every step is one bulk OUT command followed by one bulk IN read,
//! each bounded by the configured timeout. Any failure parks the session in
//! [`SessionState::Failed`]; [`run`] then still releases the interface and closes the handle.
use crate::ccid::{self, CcidHeader, CodecError, HexDump};
use crate::config::SessionConfig;
use crate::endpoints::{self, CcidInterface};
use crate::error::{Error, Result, Step};
use crate::transport::{Transferred, Transport, UsbError};
use log::{debug, info, warn};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum SessionState {
    Closed,
    Opened,
    InterfaceClaimed,
    PoweredOn,
    ApduExchanged,
    PoweredOff,
    InterfaceReleased,
    Failed,
}

/// The outcome of one command/response pair.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Exchange {
    /// Bytes the OUT transfer accepted.
    pub written: usize,
    /// libusb status of the OUT transfer; 0 when it completed.
    pub write_status: i32,
    /// libusb status of the IN transfer; 0 when it completed, negative when a timeout or an
    /// interrupt cut it short after some bytes had already arrived.
    pub status: i32,
    /// Exactly the bytes the IN transfer filled, CCID header included.
    pub data: Vec<u8>,
}
impl Exchange {
    pub fn decode(&self) -> core::result::Result<(CcidHeader, &[u8]), CodecError> {
        ccid::decode(&self.data)
    }
    /// The reply's `abData`, or the raw bytes when they do not form a CCID message.
    pub fn payload(&self) -> &[u8] {
        match self.decode() {
            Ok((_, payload)) => payload,
            Err(_) => &self.data,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SessionReport {
    pub interface: CcidInterface,
    pub claimed_interface: u8,
    pub atr: Exchange,
    pub reply: Exchange,
    pub power_off: Exchange,
    /// A failed release does not fail the session.
    pub release: Result<()>,
}

pub struct Session<'t, T: Transport> {
    transport: &'t T,
    config: &'t SessionConfig,
    handle: Option<T::Handle>,
    ccid: Option<CcidInterface>,
    claimed: Option<u8>,
    state: SessionState,
    sequence: u8,
}

impl<'t, T: Transport> Session<'t, T> {
    pub fn new(transport: &'t T, config: &'t SessionConfig) -> Session<'t, T> {
        Session {
            transport,
            config,
            handle: None,
            ccid: None,
            claimed: None,
            state: SessionState::Closed,
            sequence: 0,
        }
    }
    pub fn state(&self) -> SessionState {
        self.state
    }
    /// The interface and endpoints found when the device was opened.
    pub fn interface(&self) -> Option<CcidInterface> {
        self.ccid
    }
    /// Sequence number the next command will carry.
    pub fn next_sequence_number(&self) -> u8 {
        self.sequence
    }

    fn next_sequence(&mut self) -> u8 {
        let seq = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        seq
    }
    fn require_state(&self, expected: SessionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::OutOfOrder {
                expected,
                actual: self.state,
            })
        }
    }
    fn fail(&mut self, err: Error) -> Error {
        warn!("session failed: {}", err);
        self.state = SessionState::Failed;
        err
    }

    /// Open the device and locate its CCID endpoints.
    pub fn open(&mut self, device: &T::Device) -> Result<CcidInterface> {
        self.require_state(SessionState::Closed)?;
        info!("Opening USB device");
        let handle = self
            .transport
            .open(device)
            .map_err(|e| self.fail(Error::OpenFailed(e)))?;
        self.handle = Some(handle);
        self.state = SessionState::Opened;

        debug!("Getting active config descriptor");
        let config = match self.transport.active_config_descriptor(device) {
            Ok(config) => config,
            Err(e) => return Err(self.fail(Error::DescriptorReadFailed(e))),
        };
        let ccid = endpoints::classify(&config).map_err(|e| self.fail(e))?;
        info!(
            "CCID interface {}: bulk in 0x{:02X}, bulk out 0x{:02X}, interrupt {:?}",
            ccid.interface_number,
            ccid.endpoints.bulk_in,
            ccid.endpoints.bulk_out,
            ccid.endpoints.interrupt
        );
        self.ccid = Some(ccid);
        Ok(ccid)
    }

    pub fn claim(&mut self) -> Result<u8> {
        self.require_state(SessionState::Opened)?;
        let interface = match (self.config.claim_interface, self.ccid) {
            (Some(interface), _) => interface,
            (None, Some(ccid)) => ccid.interface_number,
            (None, None) => return Err(self.fail(Error::NoSuitableInterface)),
        };
        info!("Claiming interface {}", interface);
        let result = match self.handle.as_mut() {
            Some(handle) => self.transport.claim_interface(handle, interface),
            None => Err(UsbError::NoDevice),
        };
        if let Err(source) = result {
            return Err(self.fail(Error::ClaimFailed { interface, source }));
        }
        self.claimed = Some(interface);
        self.state = SessionState::InterfaceClaimed;
        Ok(interface)
    }

    /// Power the card and read its ATR.
    pub fn power_on(&mut self) -> Result<Exchange> {
        self.require_state(SessionState::InterfaceClaimed)?;
        info!("Power on CCID device");
        let seq = self.next_sequence();
        let command = ccid::power_on(self.config.slot, seq);
        let atr = self.transact(
            Step::PowerOn,
            Step::AtrRead,
            seq,
            &command,
            self.config.max_atr_len,
        )?;
        info!("ATR: {}", HexDump(&atr.data));
        self.state = SessionState::PoweredOn;
        Ok(atr)
    }

    /// Send `apdu` in an XfrBlock and read the card's answer.
    pub fn exchange_apdu(&mut self, apdu: &[u8]) -> Result<Exchange> {
        self.require_state(SessionState::PoweredOn)?;
        let seq = self.next_sequence();
        let command = ccid::xfr_block(self.config.slot, seq, apdu);
        info!("Writing data: {}", HexDump(&command));
        let reply = self.transact(
            Step::ApduSend,
            Step::ApduReply,
            seq,
            &command,
            self.config.max_reply_len,
        )?;
        info!(
            "Received {} bytes with data: {}",
            reply.data.len(),
            HexDump(&reply.data)
        );
        self.state = SessionState::ApduExchanged;
        Ok(reply)
    }

    pub fn power_off(&mut self) -> Result<Exchange> {
        self.require_state(SessionState::ApduExchanged)?;
        info!("Power off CCID device");
        let seq = self.next_sequence();
        let command = ccid::power_off(self.config.slot, seq);
        let reply = self.transact(
            Step::PowerOff,
            Step::PowerOffReply,
            seq,
            &command,
            self.config.max_reply_len,
        )?;
        self.state = SessionState::PoweredOff;
        Ok(reply)
    }

    /// Release the claimed interface. The session moves on even if libusb refuses.
    pub fn release(&mut self) -> Result<()> {
        self.require_state(SessionState::PoweredOff)?;
        let result = self.release_claimed();
        self.state = SessionState::InterfaceReleased;
        result
    }

    /// Close the handle if one is open. Safe to call in any state and more than once.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!("Closing the USB device");
            self.transport.close(handle);
        }
        if self.state != SessionState::Failed {
            self.state = SessionState::Closed;
        }
    }

    fn release_claimed(&mut self) -> Result<()> {
        let interface = match self.claimed.take() {
            Some(interface) => interface,
            None => return Ok(()),
        };
        info!("Releasing interface {}", interface);
        let result = match self.handle.as_mut() {
            Some(handle) => self.transport.release_interface(handle, interface),
            None => Ok(()),
        };
        result.map_err(|source| {
            warn!("unable to release interface {}: {}", interface, source);
            Error::ReleaseFailed { interface, source }
        })
    }

    /// Best-effort teardown after a failure.
    fn cleanup(&mut self) {
        // Errors are already logged by release_claimed.
        let _ = self.release_claimed();
        self.close();
    }

    fn transact(
        &mut self,
        send: Step,
        receive: Step,
        seq: u8,
        command: &[u8],
        capacity: usize,
    ) -> Result<Exchange> {
        let written = match self.bulk_write(command) {
            Ok(written) => written,
            Err(e) => return Err(self.fail(Error::transfer(send, e))),
        };
        debug!(
            "{}: sent {} of {} bytes, status {}",
            send,
            written.len,
            command.len(),
            written.status
        );
        if written.len < command.len() {
            warn!(
                "{}: short write, {} of {} bytes",
                send,
                written.len,
                command.len()
            );
        }

        let mut buffer = vec![0_u8; capacity];
        let read = match self.bulk_read(&mut buffer) {
            Ok(read) => read,
            Err(e) => return Err(self.fail(Error::transfer(receive, e))),
        };
        buffer.truncate(read.len);
        debug!(
            "{}: received {} bytes, status {}: {}",
            receive,
            read.len,
            read.status,
            HexDump(&buffer)
        );

        match ccid::decode(&buffer) {
            Ok((header, _)) => {
                if self.config.verify_sequence && header.sequence != seq {
                    return Err(self.fail(Error::SequenceMismatch {
                        step: receive,
                        expected: seq,
                        received: header.sequence,
                    }));
                }
                if header.command_failed() {
                    warn!(
                        "{}: reader reports command failure, bStatus 0x{:02X} bError 0x{:02X}",
                        receive,
                        header.param1,
                        header.error_code()
                    );
                }
            }
            // Short replies are kept as they are.
            Err(e) => debug!("{}: reply is not a full CCID message: {}", receive, e),
        }

        Ok(Exchange {
            written: written.len,
            write_status: written.status,
            status: read.status,
            data: buffer,
        })
    }
    fn bulk_write(&self, data: &[u8]) -> core::result::Result<Transferred, UsbError> {
        match (self.handle.as_ref(), self.ccid) {
            (Some(handle), Some(ccid)) => {
                self.transport
                    .bulk_write(handle, ccid.endpoints.bulk_out, data, self.config.timeout)
            }
            _ => Err(UsbError::NoDevice),
        }
    }
    fn bulk_read(&self, data: &mut [u8]) -> core::result::Result<Transferred, UsbError> {
        match (self.handle.as_ref(), self.ccid) {
            (Some(handle), Some(ccid)) => {
                self.transport
                    .bulk_read(handle, ccid.endpoints.bulk_in, data, self.config.timeout)
            }
            _ => Err(UsbError::NoDevice),
        }
    }
}

impl<T: Transport> Drop for Session<'_, T> {
    fn drop(&mut self) {
        self.cleanup()
    }
}

/// Drive a full session on `device`. On failure the interface is released and the handle closed
/// before the error is returned.
pub fn run<T: Transport>(
    transport: &T,
    device: &T::Device,
    config: &SessionConfig,
) -> Result<SessionReport> {
    let mut session = Session::new(transport, config);
    let result = drive(&mut session, device, config);
    if result.is_err() {
        session.cleanup();
    }
    result
}

fn drive<T: Transport>(
    session: &mut Session<'_, T>,
    device: &T::Device,
    config: &SessionConfig,
) -> Result<SessionReport> {
    let interface = session.open(device)?;
    let claimed_interface = session.claim()?;
    let atr = session.power_on()?;
    let reply = session.exchange_apdu(&config.apdu)?;
    let power_off = session.power_off()?;
    let release = session.release();
    session.close();
    Ok(SessionReport {
        interface,
        claimed_interface,
        atr,
        reply,
        power_off,
        release,
    })
}
