use crate::device::{DeviceIdentifier, ProductID, VendorID};

pub struct DeviceDescriptor(pub libusb1_sys::libusb_device_descriptor);
impl DeviceDescriptor {
    pub fn vendor_id(&self) -> VendorID {
        VendorID(self.0.idVendor)
    }
    pub fn product_id(&self) -> ProductID {
        ProductID(self.0.idProduct)
    }
    pub fn device_identifier(&self) -> DeviceIdentifier {
        DeviceIdentifier {
            vendor_id: self.vendor_id(),
            product_id: self.product_id(),
        }
    }
}
impl From<libusb1_sys::libusb_device_descriptor> for DeviceDescriptor {
    fn from(d: libusb1_sys::libusb_device_descriptor) -> Self {
        DeviceDescriptor(d)
    }
}

impl core::fmt::Debug for DeviceDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceDescriptor")
            .field("bcdUSB", &self.0.bcdUSB)
            .field("bDeviceClass", &self.0.bDeviceClass)
            .field("idVendor", &self.0.idVendor)
            .field("idProduct", &self.0.idProduct)
            .field("bcdDevice", &self.0.bcdDevice)
            .field("bNumConfigurations", &self.0.bNumConfigurations)
            .finish()
    }
}
