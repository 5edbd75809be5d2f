use crate::libusb::interface_descriptor::{raw_slice, Interfaces};

/// Native configuration descriptor, freed on drop.
pub struct ConfigDescriptor(core::ptr::NonNull<libusb1_sys::libusb_config_descriptor>);
impl ConfigDescriptor {
    /// # Safety
    /// Assumes the pointer came from `libusb_get_*_config_descriptor` and is owned by the new value.
    pub unsafe fn from_libusb(
        ptr: core::ptr::NonNull<libusb1_sys::libusb_config_descriptor>,
    ) -> ConfigDescriptor {
        ConfigDescriptor(ptr)
    }
    pub fn number(&self) -> u8 {
        self.inner_ref().bConfigurationValue
    }

    pub fn interfaces(&self) -> Interfaces<'_> {
        let descriptor = self.inner_ref();
        Interfaces(unsafe { raw_slice(descriptor.interface, descriptor.bNumInterfaces.into()) })
    }
    pub fn inner_ref(&self) -> &libusb1_sys::libusb_config_descriptor {
        unsafe { self.0.as_ref() }
    }
}
impl Drop for ConfigDescriptor {
    fn drop(&mut self) {
        unsafe { libusb1_sys::libusb_free_config_descriptor(self.0.as_ptr()) }
    }
}

impl core::fmt::Debug for ConfigDescriptor {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error> {
        let mut debug = fmt.debug_struct("ConfigDescriptor");

        let descriptor = self.inner_ref();

        debug.field("wTotalLength", &descriptor.wTotalLength);
        debug.field("bNumInterfaces", &descriptor.bNumInterfaces);
        debug.field("bConfigurationValue", &descriptor.bConfigurationValue);
        debug.field("bmAttributes", &descriptor.bmAttributes);

        debug.finish()
    }
}
