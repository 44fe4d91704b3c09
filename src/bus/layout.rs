//! Byte layouts of the two reserved register files.

use crate::bus::{
    config,
    slice::{RegMut, RegRef},
};

/// Offsets inside the control page (page 0).
pub mod control {
    pub const STATUS: usize = 0;
    /// Shared transmit-command byte for driver pages without their own.
    pub const TX_COMMAND: usize = 1;
    pub const COMMAND: usize = 2;
    pub const PARAMS: usize = 3;
    pub const PARAM_COUNT: usize = 4;
    pub const LEN: usize = PARAMS + PARAM_COUNT;
}

/// Capability bits advertised in the device-info page.
pub mod capability {
    pub const LED: u8 = 1 << 0;
    pub const KEYPAD: u8 = 1 << 1;
}

/// Contents of the read-only device-info page (page 1).
///
/// Layout: manufacturer (u16 LE) | product (u16 LE) | version (u8) | capabilities (u8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub manufacturer: u16,
    pub product: u16,
    pub version: u8,
    pub capabilities: u8,
}

impl DeviceInfo {
    pub const LEN: usize = 6;

    pub const fn new(manufacturer: u16, product: u16, version: u8) -> Self {
        Self {
            manufacturer,
            product,
            version,
            capabilities: config::DEFAULT_CAPABILITIES,
        }
    }

    pub const fn with_capabilities(mut self, capabilities: u8) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        let mut regs = RegMut::new(&mut buf);
        regs.write_u16_le_at(0, self.manufacturer);
        regs.write_u16_le_at(2, self.product);
        regs.write_u8_at(4, self.version);
        regs.write_u8_at(5, self.capabilities);
        buf
    }

    /// # Panics
    /// Panics if `regs` is shorter than [`DeviceInfo::LEN`].
    pub fn decode(regs: RegRef<'_>) -> Self {
        Self {
            manufacturer: regs.read_u16_le_at(0),
            product: regs.read_u16_le_at(2),
            version: regs.read_u8_at(4),
            capabilities: regs.read_u8_at(5),
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::new(
            config::DEFAULT_MANUFACTURER,
            config::DEFAULT_PRODUCT,
            config::FIRMWARE_VERSION,
        )
    }
}
