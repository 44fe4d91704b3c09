/// Value an erased NVM cell reads back as.
pub const UNPROGRAMMED: u8 = 0xFF;

/// Non-volatile cell holding the device's own bus address.
pub trait AddressStore {
    fn read_address(&mut self) -> u8;
    /// Writes the cell. Callers skip the write when the value is unchanged.
    fn write_address(&mut self, address: u8);
}

/// Returns true for addresses this device may answer on: odd, and
/// neither of the unprogrammed patterns.
pub const fn is_valid_address(address: u8) -> bool {
    address & 1 == 1 && address != UNPROGRAMMED
}

/// Picks the address to answer on at boot.
pub const fn resolve_address(stored: u8, default: u8) -> u8 {
    if is_valid_address(stored) {
        stored
    } else {
        default
    }
}

/// RAM-backed store for boards without NVM; forgets on restart.
#[derive(Debug, Clone, Copy)]
pub struct VolatileStore(u8);

impl VolatileStore {
    pub const fn new() -> Self {
        Self(UNPROGRAMMED)
    }
}

impl Default for VolatileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressStore for VolatileStore {
    fn read_address(&mut self) -> u8 {
        self.0
    }

    fn write_address(&mut self, address: u8) {
        self.0 = address;
    }
}
