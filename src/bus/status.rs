//! Status byte encoding shared between the bus engine and the worker.
//!
//! ```text
//!  7   6   5   4   3   2   1   0
//! ┌───────────────┬───────┬───┬───┐
//! │     code      │   -   │ E │ B │
//! └───────────────┴───────┴───┴───┘
//! ```
//!
//! `B` mirrors "command in progress", `E` is the sticky bus-error flag set
//! when a command is posted while another is still in flight. The
//! controller clears `E` by writing the status byte.

/// Result code reported in the high nibble of the status byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success = 0,
    InProgress = 1,
    ErrorBusy = 2,
    ErrorAccess = 3,
    ErrorCommand = 4,
    ErrorArgument = 5,
}

impl StatusCode {
    /// Decodes a code nibble, returning `None` for unassigned values.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(StatusCode::Success),
            1 => Some(StatusCode::InProgress),
            2 => Some(StatusCode::ErrorBusy),
            3 => Some(StatusCode::ErrorAccess),
            4 => Some(StatusCode::ErrorCommand),
            5 => Some(StatusCode::ErrorArgument),
            _ => None,
        }
    }

    /// True for every code that ends a command's lifecycle.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, StatusCode::InProgress)
    }
}

/// Status byte as it appears at offset 0 of the control page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    pub const BUSY: u8 = 1 << 0;
    pub const BUS_ERROR: u8 = 1 << 1;
    pub const CODE_SHIFT: u8 = 4;
    pub const CODE_MASK: u8 = 0xF0;

    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Decoded code nibble, `None` if the controller wrote garbage into it.
    pub const fn code(self) -> Option<StatusCode> {
        StatusCode::from_bits((self.0 & Self::CODE_MASK) >> Self::CODE_SHIFT)
    }

    pub const fn is_busy(self) -> bool {
        self.0 & Self::BUSY != 0
    }

    pub const fn has_bus_error(self) -> bool {
        self.0 & Self::BUS_ERROR != 0
    }

    /// Replaces the code nibble and refreshes the busy bit, keeping the
    /// bus-error flag.
    pub const fn with_code(self, code: StatusCode) -> Self {
        let mut byte = self.0 & !(Self::CODE_MASK | Self::BUSY);
        byte |= (code as u8) << Self::CODE_SHIFT;
        if matches!(code, StatusCode::InProgress) {
            byte |= Self::BUSY;
        }
        Self(byte)
    }

    pub const fn with_bus_error(self) -> Self {
        Self(self.0 | Self::BUS_ERROR)
    }
}
