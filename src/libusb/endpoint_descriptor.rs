use crate::descriptor::TransferType;

#[derive(Copy, Clone)]
pub struct EndpointDescriptors<'a>(pub &'a [libusb1_sys::libusb_endpoint_descriptor]);
impl<'a> EndpointDescriptors<'a> {
    pub fn iter(&self) -> impl Iterator<Item = EndpointDescriptor<'a>> {
        self.0.iter().map(EndpointDescriptor)
    }
}

#[derive(Copy, Clone)]
pub struct EndpointDescriptor<'a>(pub &'a libusb1_sys::libusb_endpoint_descriptor);
impl<'a> EndpointDescriptor<'a> {
    /// Endpoint address, direction bit included.
    pub fn address(&self) -> u8 {
        self.0.bEndpointAddress
    }
    pub fn transfer_type(&self) -> TransferType {
        TransferType::from_attributes(self.0.bmAttributes)
    }
}
