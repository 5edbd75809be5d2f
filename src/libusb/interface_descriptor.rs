use crate::libusb::endpoint_descriptor::EndpointDescriptors;

/// Build a slice from a libusb array, tolerating the null pointer libusb uses for empty arrays.
///
/// # Safety
/// If `ptr` is non-null it must point to `len` initialized values living at least as long as `'a`.
pub(crate) unsafe fn raw_slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        core::slice::from_raw_parts(ptr, len)
    }
}

#[derive(Copy, Clone)]
pub struct Interfaces<'a>(pub &'a [libusb1_sys::libusb_interface]);
impl<'a> Interfaces<'a> {
    pub fn iter(&self) -> impl Iterator<Item = Interface<'a>> {
        self.0.iter().map(Interface)
    }
}

/// One interface: the list of its alternate settings.
pub struct Interface<'a>(pub &'a libusb1_sys::libusb_interface);
impl<'a> Interface<'a> {
    pub fn descriptors(&self) -> InterfaceDescriptors<'a> {
        let len = usize::try_from(self.0.num_altsetting).unwrap_or(0);
        InterfaceDescriptors(unsafe { raw_slice(self.0.altsetting, len) })
    }
}

#[derive(Copy, Clone)]
pub struct InterfaceDescriptors<'a>(pub &'a [libusb1_sys::libusb_interface_descriptor]);
impl<'a> InterfaceDescriptors<'a> {
    pub fn iter(&self) -> impl Iterator<Item = InterfaceDescriptor<'a>> {
        self.0.iter().map(InterfaceDescriptor)
    }
}
#[derive(Copy, Clone)]
pub struct InterfaceDescriptor<'a>(pub &'a libusb1_sys::libusb_interface_descriptor);

impl<'a> InterfaceDescriptor<'a> {
    /// Returns the interface's number.
    pub fn interface_number(&self) -> u8 {
        self.0.bInterfaceNumber
    }

    /// Returns the alternate setting number.
    pub fn setting_number(&self) -> u8 {
        self.0.bAlternateSetting
    }

    /// Returns the interface's class code.
    pub fn class_code(&self) -> u8 {
        self.0.bInterfaceClass
    }

    /// Returns an iterator over the interface's endpoint descriptors.
    pub fn endpoint_descriptors(&self) -> EndpointDescriptors<'a> {
        let endpoints = unsafe { raw_slice(self.0.endpoint, self.0.bNumEndpoints.into()) };
        EndpointDescriptors(endpoints)
    }
}
