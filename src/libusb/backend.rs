use crate::descriptor::{
    ConfigDescriptor, DeviceDescriptor, EndpointDescriptor, Interface, InterfaceDescriptor,
};
use crate::libusb::config_descriptor;
use crate::libusb::context::Context;
use crate::libusb::device::Device;
use crate::libusb::device_handle::DeviceHandle;
use crate::libusb::error::libusb_name;
use crate::libusb::interface_descriptor;
use crate::transport::{Transferred, Transport, UsbError};
use core::time::Duration;
use log::debug;

impl From<interface_descriptor::InterfaceDescriptor<'_>> for InterfaceDescriptor {
    fn from(d: interface_descriptor::InterfaceDescriptor<'_>) -> Self {
        InterfaceDescriptor {
            interface_number: d.interface_number(),
            setting_number: d.setting_number(),
            class_code: d.class_code(),
            endpoints: d
                .endpoint_descriptors()
                .iter()
                .map(|e| EndpointDescriptor::new(e.address(), e.transfer_type()))
                .collect(),
        }
    }
}

impl From<&config_descriptor::ConfigDescriptor> for ConfigDescriptor {
    fn from(config: &config_descriptor::ConfigDescriptor) -> Self {
        ConfigDescriptor {
            number: config.number(),
            interfaces: config
                .interfaces()
                .iter()
                .map(|interface| Interface {
                    alt_settings: interface
                        .descriptors()
                        .iter()
                        .map(InterfaceDescriptor::from)
                        .collect(),
                })
                .collect(),
        }
    }
}

fn logged(what: &str, err: UsbError) -> UsbError {
    debug!("{} failed: {}", what, libusb_name(err));
    err
}

impl Transport for Context {
    type Device = Device;
    type Handle = DeviceHandle;

    fn devices(&self) -> Result<Vec<Device>, UsbError> {
        let list = self
            .device_list()
            .map_err(|e| logged("libusb_get_device_list", e))?;
        Ok(list.iter().collect())
    }

    fn device_descriptor(&self, device: &Device) -> Result<DeviceDescriptor, UsbError> {
        let descriptor = device
            .device_descriptor()
            .map_err(|e| logged("libusb_get_device_descriptor", e))?;
        Ok(DeviceDescriptor {
            identifier: descriptor.device_identifier(),
            bus_number: device.bus_number(),
            address: device.device_address(),
        })
    }

    fn active_config_descriptor(&self, device: &Device) -> Result<ConfigDescriptor, UsbError> {
        // The native descriptor is freed as soon as it has been copied.
        let native = device
            .active_config_descriptor()
            .map_err(|e| logged("libusb_get_active_config_descriptor", e))?;
        Ok(ConfigDescriptor::from(&native))
    }

    fn open(&self, device: &Device) -> Result<DeviceHandle, UsbError> {
        let handle = device.open().map_err(|e| logged("libusb_open", e))?;
        // Lets the claim succeed while a kernel driver is bound; unsupported off Linux.
        if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
            debug!("auto detach of kernel driver unavailable: {}", e);
        }
        Ok(handle)
    }

    fn close(&self, handle: DeviceHandle) {
        handle.close()
    }

    fn claim_interface(&self, handle: &mut DeviceHandle, interface: u8) -> Result<(), UsbError> {
        handle
            .claim_interface(interface)
            .map_err(|e| logged("libusb_claim_interface", e))
    }

    fn release_interface(&self, handle: &mut DeviceHandle, interface: u8) -> Result<(), UsbError> {
        handle
            .release_interface(interface)
            .map_err(|e| logged("libusb_release_interface", e))
    }

    fn bulk_write(
        &self,
        handle: &DeviceHandle,
        endpoint: u8,
        data: &[u8],
        timeout: Duration,
    ) -> Result<Transferred, UsbError> {
        handle
            .bulk_write(endpoint, data, timeout)
            .map_err(|e| logged("libusb_bulk_transfer (out)", e))
    }

    fn bulk_read(
        &self,
        handle: &DeviceHandle,
        endpoint: u8,
        data: &mut [u8],
        timeout: Duration,
    ) -> Result<Transferred, UsbError> {
        handle
            .bulk_read(endpoint, data, timeout)
            .map_err(|e| logged("libusb_bulk_transfer (in)", e))
    }
}
