pub const INTERFACES_MAX: u8 = 0xFF;
pub const INTERFACES_BYTE_LEN: usize = (INTERFACES_MAX as usize + 1) / 8;

/// Bitset of the interface numbers a handle currently holds.
#[derive(Debug, Default, Hash)]
pub struct ClaimedInterfaces([u8; INTERFACES_BYTE_LEN]);
impl ClaimedInterfaces {
    pub const DEFAULT: ClaimedInterfaces = ClaimedInterfaces([0_u8; INTERFACES_BYTE_LEN]);
    pub const fn byte_index(interface: u8) -> u8 {
        interface / 8
    }
    pub const fn bit_index(interface: u8) -> u8 {
        interface % 8
    }
    pub fn claim(&mut self, interface: u8) {
        self.0[Self::byte_index(interface) as usize] |= 1 << Self::bit_index(interface)
    }
    pub fn is_claimed(&self, interface: u8) -> bool {
        self.0[Self::byte_index(interface) as usize] & (1 << Self::bit_index(interface)) != 0
    }
    pub fn release(&mut self, interface: u8) {
        self.0[Self::byte_index(interface) as usize] &= !(1 << Self::bit_index(interface))
    }
    /// Unmark and return the lowest claimed interface.
    pub fn pop(&mut self) -> Option<u8> {
        let (byte, bits) = self.0.iter().enumerate().find(|&(_, &b)| b != 0)?;
        let interface = (byte * 8) as u8 + bits.trailing_zeros() as u8;
        self.release(interface);
        Some(interface)
    }
}
