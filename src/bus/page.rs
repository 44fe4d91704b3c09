use crate::bus::BusError;

/// Whether the bus controller may write a register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Where the bus engine looks for a command byte after a write to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandField {
    /// The control page's shared transmit-command byte.
    Shared,
    /// A byte inside the page itself.
    At(u8),
}

/// Index of a register file on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageId(pub u8);

impl PageId {
    pub const CONTROL: PageId = PageId(0);
    pub const DEVICE_INFO: PageId = PageId(1);
    /// First index handed to driver-owned pages.
    pub const FIRST_DRIVER: PageId = PageId(2);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A driver-owned byte buffer exposed on the bus.
///
/// The buffer is borrowed for the lifetime of the bus; after registration
/// the driver reaches it through the worker view only.
#[derive(Debug)]
pub struct RegisterFile<'a> {
    pub(crate) data: &'a mut [u8],
    pub(crate) access: Access,
    pub(crate) command: CommandField,
}

impl<'a> RegisterFile<'a> {
    pub fn read_write(data: &'a mut [u8]) -> Self {
        Self {
            data,
            access: Access::ReadWrite,
            command: CommandField::Shared,
        }
    }

    pub fn read_only(data: &'a mut [u8]) -> Self {
        Self {
            data,
            access: Access::ReadOnly,
            command: CommandField::Shared,
        }
    }

    /// Declares the page's own command byte at `offset`.
    pub fn with_command_at(mut self, offset: u8) -> Self {
        self.command = CommandField::At(offset);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn command_field(&self) -> CommandField {
        self.command
    }

    /// Checks the constraints a page must meet before it goes on the bus.
    pub(crate) fn validate(&self) -> Result<(), BusError> {
        if self.data.is_empty() {
            return Err(BusError::ZeroLength);
        }
        if self.data.len() > u8::MAX as usize {
            return Err(BusError::PageTooLong);
        }
        if let CommandField::At(offset) = self.command {
            if offset as usize >= self.data.len() {
                return Err(BusError::CommandFieldOutOfBounds);
            }
            if self.access == Access::ReadOnly {
                return Err(BusError::CommandFieldReadOnly);
            }
        }
        Ok(())
    }
}
