//! Command vocabulary, the shared command context, and the extension
//! dispatch table.

use heapless::Vec;
use log::trace;

use crate::bus::{
    BusError,
    layout::control,
    page::PageId,
    slice::RegMut,
    status::StatusCode,
};

/// Command bookkeeping shared by the bus engine and the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContext {
    pub(crate) command: u8,
    pub(crate) last_command: u8,
    pub(crate) last_page: PageId,
}

impl CommandContext {
    pub const fn new() -> Self {
        Self {
            command: 0,
            last_command: 0,
            last_page: PageId::CONTROL,
        }
    }

    /// Code currently executing, 0 when idle.
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Most recently completed code.
    pub fn last_command(&self) -> u8 {
        self.last_command
    }

    /// Page whose write triggered the current or last command.
    pub fn last_page(&self) -> PageId {
        self.last_page
    }

    pub fn in_flight(&self) -> bool {
        self.command != 0
    }
}

impl Default for CommandContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands implemented by the core. Codes up to 7 are reserved.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    SetPage = 1,
    SetDeviceAddress = 2,
    Reset = 3,
}

impl CoreCommand {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(CoreCommand::SetPage),
            2 => Some(CoreCommand::SetDeviceAddress),
            3 => Some(CoreCommand::Reset),
            _ => None,
        }
    }
}

/// A command picked up by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRequest {
    pub code: u8,
    /// Control-page parameter bytes as they were at pickup.
    pub params: [u8; control::PARAM_COUNT],
    pub page: PageId,
}

/// Bus services available to command handlers while they run.
pub trait BusAccess {
    /// Runs `f` over a register file inside a critical section.
    fn with_page(&self, page: PageId, f: &mut dyn FnMut(RegMut<'_>)) -> Result<(), BusError>;

    /// Publishes a status code for the command in flight.
    fn update_status(&self, code: StatusCode);
}

/// An extension command handler.
///
/// Returning [`StatusCode::InProgress`] keeps the command in flight until
/// the handler reports completion through [`BusAccess::update_status`].
pub trait CommandHandler {
    fn handle(&self, request: &CommandRequest, bus: &dyn BusAccess) -> StatusCode;
}

impl<F> CommandHandler for F
where
    F: Fn(&CommandRequest, &dyn BusAccess) -> StatusCode,
{
    fn handle(&self, request: &CommandRequest, bus: &dyn BusAccess) -> StatusCode {
        self(request, bus)
    }
}

struct Entry<'t> {
    mask: u8,
    matches: u8,
    handler: &'t dyn CommandHandler,
}

/// Linear table of `(handler, mask, match)` entries for codes 8 and up.
pub struct CommandTable<'t, const C: usize> {
    entries: Vec<Entry<'t>, C>,
}

impl<'t, const C: usize> core::fmt::Debug for CommandTable<'t, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandTable")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<'t, const C: usize> CommandTable<'t, C> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a handler run for every code where `code & mask == matches`.
    pub fn register(
        &mut self,
        mask: u8,
        matches: u8,
        handler: &'t dyn CommandHandler,
    ) -> Result<(), BusError> {
        self.entries
            .push(Entry {
                mask,
                matches,
                handler,
            })
            .map_err(|_| BusError::TableFull)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invokes every matching handler in registration order.
    ///
    /// The last handler's status wins. Returns `None` if nothing matched.
    pub fn dispatch(&self, request: &CommandRequest, bus: &dyn BusAccess) -> Option<StatusCode> {
        let mut status = None;
        for entry in self
            .entries
            .iter()
            .filter(|e| request.code & e.mask == e.matches)
        {
            trace!("dispatch {:#04x} to entry {:#04x}/{:#04x}", request.code, entry.mask, entry.matches);
            status = Some(entry.handler.handle(request, bus));
        }
        status
    }
}

impl<'t, const C: usize> Default for CommandTable<'t, C> {
    fn default() -> Self {
        Self::new()
    }
}
