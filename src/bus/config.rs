//! Build-time defaults for a device speaking this bus protocol.

/// Bus address used while the NVM cell holds no valid address.
pub const DEFAULT_DEVICE_ADDRESS: u8 = 0x53;

pub const DEFAULT_MANUFACTURER: u16 = 0xBAAA;
pub const DEFAULT_PRODUCT: u16 = 0x2812;
pub const FIRMWARE_VERSION: u8 = 0x01;

/// No optional driver pages advertised.
pub const DEFAULT_CAPABILITIES: u8 = 0;

/// First command code routed to the dispatch table; codes below it are
/// reserved for the core.
pub const FIRST_EXTENSION_COMMAND: u8 = 8;
