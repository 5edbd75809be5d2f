//! Scripted in-memory transport for tests.
use super::{Transferred, Transport, UsbError};
use crate::ccid::{self, MessageType};
use crate::descriptor::{ConfigDescriptor, DeviceDescriptor};
use crate::device::DeviceIdentifier;
use core::cell::RefCell;
use core::time::Duration;
use std::collections::VecDeque;

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Call {
    Devices,
    DeviceDescriptor(usize),
    ActiveConfig(usize),
    Open(usize),
    Close(usize),
    Claim(usize, u8),
    Release(usize, u8),
    BulkWrite {
        device: usize,
        endpoint: u8,
        data: Vec<u8>,
        timeout: Duration,
    },
    BulkRead {
        device: usize,
        endpoint: u8,
        capacity: usize,
        timeout: Duration,
    },
}

#[derive(Clone, Debug)]
pub struct MockDevice {
    pub descriptor: Result<DeviceDescriptor, UsbError>,
    pub config: Result<ConfigDescriptor, UsbError>,
    pub open: Result<(), UsbError>,
    pub claim: Result<(), UsbError>,
    pub release: Result<(), UsbError>,
}
impl MockDevice {
    pub fn reader(vendor_id: u16, product_id: u16, address: u8) -> MockDevice {
        MockDevice {
            descriptor: Ok(DeviceDescriptor {
                identifier: DeviceIdentifier::new(vendor_id, product_id),
                bus_number: 1,
                address,
            }),
            config: Ok(crate::endpoints::tests::reader_config()),
            open: Ok(()),
            claim: Ok(()),
            release: Ok(()),
        }
    }
}

#[derive(Debug)]
pub struct MockHandle {
    device: usize,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    pub devices: Vec<MockDevice>,
    /// Outcomes of successive bulk writes. `Ok(None)` and an empty queue write everything.
    pub writes: RefCell<VecDeque<Result<Option<Transferred>, UsbError>>>,
    /// Successive bulk read results as `(status, bytes)`; an empty queue reads zero bytes.
    pub reads: RefCell<VecDeque<Result<(i32, Vec<u8>), UsbError>>>,
    pub calls: RefCell<Vec<Call>>,
    pub list_error: Option<UsbError>,
}
impl MockTransport {
    pub fn new(devices: Vec<MockDevice>) -> MockTransport {
        MockTransport {
            devices,
            ..MockTransport::default()
        }
    }
    pub fn push_read(&self, result: Result<Vec<u8>, UsbError>) {
        self.reads
            .borrow_mut()
            .push_back(result.map(|bytes| (0, bytes)))
    }
    /// A read cut short by `status` after `bytes` arrived.
    pub fn push_partial_read(&self, status: UsbError, bytes: Vec<u8>) {
        self.reads
            .borrow_mut()
            .push_back(Ok((status.code(), bytes)))
    }
    pub fn push_reply(&self, message_type: MessageType, sequence: u8, payload: &[u8]) {
        self.push_read(Ok(ccid::encode(message_type, 0, sequence, [0; 3], payload)))
    }
    pub fn push_write(&self, result: Result<(), UsbError>) {
        self.writes.borrow_mut().push_back(result.map(|()| None))
    }
    /// A write cut short by `status` after `len` bytes went out.
    pub fn push_partial_write(&self, status: UsbError, len: usize) {
        self.writes
            .borrow_mut()
            .push_back(Ok(Some(Transferred::partial(status, len))))
    }
    /// Script the three replies of a clean session whose commands use sequences `first..`.
    pub fn push_happy_replies(&self, first: u8, atr: &[u8], reply: &[u8]) {
        self.push_reply(MessageType::DataBlock, first, atr);
        self.push_reply(MessageType::DataBlock, first.wrapping_add(1), reply);
        self.push_reply(MessageType::SlotStatus, first.wrapping_add(2), &[]);
    }
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::BulkWrite { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call)
    }
}

impl Transport for MockTransport {
    type Device = usize;
    type Handle = MockHandle;

    fn devices(&self) -> Result<Vec<usize>, UsbError> {
        self.record(Call::Devices);
        match self.list_error {
            Some(err) => Err(err),
            None => Ok((0..self.devices.len()).collect()),
        }
    }
    fn device_descriptor(&self, device: &usize) -> Result<DeviceDescriptor, UsbError> {
        self.record(Call::DeviceDescriptor(*device));
        self.devices[*device].descriptor
    }
    fn active_config_descriptor(&self, device: &usize) -> Result<ConfigDescriptor, UsbError> {
        self.record(Call::ActiveConfig(*device));
        self.devices[*device].config.clone()
    }
    fn open(&self, device: &usize) -> Result<MockHandle, UsbError> {
        self.record(Call::Open(*device));
        self.devices[*device]
            .open
            .map(|()| MockHandle { device: *device })
    }
    fn close(&self, handle: MockHandle) {
        self.record(Call::Close(handle.device))
    }
    fn claim_interface(&self, handle: &mut MockHandle, interface: u8) -> Result<(), UsbError> {
        self.record(Call::Claim(handle.device, interface));
        self.devices[handle.device].claim
    }
    fn release_interface(&self, handle: &mut MockHandle, interface: u8) -> Result<(), UsbError> {
        self.record(Call::Release(handle.device, interface));
        self.devices[handle.device].release
    }
    fn bulk_write(
        &self,
        handle: &MockHandle,
        endpoint: u8,
        data: &[u8],
        timeout: Duration,
    ) -> Result<Transferred, UsbError> {
        self.record(Call::BulkWrite {
            device: handle.device,
            endpoint,
            data: data.to_vec(),
            timeout,
        });
        match self.writes.borrow_mut().pop_front() {
            Some(Err(err)) => Err(err),
            Some(Ok(Some(partial))) => Ok(partial),
            Some(Ok(None)) | None => Ok(Transferred::complete(data.len())),
        }
    }
    fn bulk_read(
        &self,
        handle: &MockHandle,
        endpoint: u8,
        data: &mut [u8],
        timeout: Duration,
    ) -> Result<Transferred, UsbError> {
        self.record(Call::BulkRead {
            device: handle.device,
            endpoint,
            capacity: data.len(),
            timeout,
        });
        match self.reads.borrow_mut().pop_front() {
            Some(Ok((status, bytes))) => {
                let len = bytes.len().min(data.len());
                data[..len].copy_from_slice(&bytes[..len]);
                Ok(Transferred { status, len })
            }
            Some(Err(err)) => Err(err),
            None => Ok(Transferred::complete(0)),
        }
    }
}
