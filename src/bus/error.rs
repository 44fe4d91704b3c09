/// Errors raised while configuring the bus or touching a register file
/// from firmware code.
///
/// Failures seen by the external bus controller never surface here; they
/// are reported through NACKs and the status byte instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Register file declared with zero length.
    ZeroLength,
    /// Register file longer than a single-byte offset can address.
    PageTooLong,
    /// No free slot left for another driver page.
    RegistryFull,
    /// Page index does not name a registered register file.
    UnknownPage,
    /// Declared command field lies outside the register file.
    CommandFieldOutOfBounds,
    /// Command field declared on a page the controller cannot write.
    CommandFieldReadOnly,
    /// Command dispatch table capacity exceeded.
    TableFull,
    /// Offset or length exceeds the register file bounds.
    OutOfBounds,
    /// Page is fixed at build time and cannot be written by firmware.
    ReadOnlyPage,
}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BusError::ZeroLength => write!(f, "register file declared with zero length"),
            BusError::PageTooLong => write!(f, "register file exceeds 255 bytes"),
            BusError::RegistryFull => write!(f, "register file registry is full"),
            BusError::UnknownPage => write!(f, "page is not registered"),
            BusError::CommandFieldOutOfBounds => {
                write!(f, "command field lies outside the register file")
            }
            BusError::CommandFieldReadOnly => {
                write!(f, "command field declared on a read-only register file")
            }
            BusError::TableFull => write!(f, "command dispatch table is full"),
            BusError::OutOfBounds => write!(f, "offset or length exceeds register file bounds"),
            BusError::ReadOnlyPage => write!(f, "page is fixed and cannot be written"),
        }
    }
}
