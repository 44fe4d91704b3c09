use log::{debug, warn};

use crate::bus::{
    BusError,
    command::{BusAccess, CommandHandler, CommandRequest, CommandTable, CoreCommand},
    config::FIRST_EXTENSION_COMMAND,
    handle::WorkerBus,
    page::PageId,
    persist::{AddressStore, is_valid_address, resolve_address},
    status::StatusCode,
    system::{SignalSink, SystemControl},
};

/// Main-loop side of the bus: picks up posted commands and runs them
/// outside interrupt context.
///
/// # Const Generics
/// - `P`: Driver page capacity of the storage
/// - `C`: Capacity of the extension command table
///
/// # Type Parameters
/// - `S`: Signal sink of the storage
/// - `N`: NVM cell holding the bus address
/// - `X`: Restart primitive
pub struct CommandWorker<'s, 'a, 't, const P: usize, const C: usize, S, N, X>
where
    S: SignalSink,
    N: AddressStore,
    X: SystemControl,
{
    bus: WorkerBus<'s, 'a, P, S>,
    commands: CommandTable<'t, C>,
    store: N,
    system: X,
}

impl<'s, 'a, 't, const P: usize, const C: usize, S, N, X> core::fmt::Debug
    for CommandWorker<'s, 'a, 't, P, C, S, N, X>
where
    S: SignalSink,
    N: AddressStore,
    X: SystemControl,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandWorker")
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}

impl<'s, 'a, 't, const P: usize, const C: usize, S, N, X> CommandWorker<'s, 'a, 't, P, C, S, N, X>
where
    S: SignalSink,
    N: AddressStore,
    X: SystemControl,
{
    pub fn new(bus: WorkerBus<'s, 'a, P, S>, store: N, system: X) -> Self {
        Self {
            bus,
            commands: CommandTable::new(),
            store,
            system,
        }
    }

    /// Routes extension codes with `code & mask == matches` to `handler`.
    pub fn register(
        &mut self,
        mask: u8,
        matches: u8,
        handler: &'t dyn CommandHandler,
    ) -> Result<(), BusError> {
        self.commands.register(mask, matches, handler)
    }

    pub fn bus(&self) -> WorkerBus<'s, 'a, P, S> {
        self.bus
    }

    pub fn store(&self) -> &N {
        &self.store
    }

    /// Address the TWI peripheral should answer on after boot.
    pub fn boot_address(&mut self) -> u8 {
        resolve_address(self.store.read_address(), self.bus.default_address())
    }

    /// Runs the posted command, if any, and publishes its status.
    ///
    /// Call once per main-loop iteration. Returns the status the command
    /// ended with, or `None` when nothing was pending.
    pub fn poll(&mut self) -> Option<StatusCode> {
        let request = self.bus.with_view(|view| {
            let request = view.take_pending()?;
            view.update_status(StatusCode::InProgress);
            Some(request)
        })?;

        debug!(
            "command {:#04x} from page {}, params {:?}",
            request.code, request.page.0, request.params
        );
        let status = self.execute(&request);
        self.bus.update_status(status);
        debug!("command {:#04x} -> {:?}", request.code, status);
        Some(status)
    }

    fn execute(&mut self, request: &CommandRequest) -> StatusCode {
        match CoreCommand::from_code(request.code) {
            Some(CoreCommand::SetPage) => self.set_page(PageId(request.params[0])),
            Some(CoreCommand::SetDeviceAddress) => self.set_device_address(request.params[0]),
            Some(CoreCommand::Reset) => {
                debug!("restarting");
                self.system.restart()
            }
            None if request.code < FIRST_EXTENSION_COMMAND => {
                warn!("reserved command {:#04x}", request.code);
                StatusCode::ErrorCommand
            }
            None => self
                .commands
                .dispatch(request, &self.bus)
                .unwrap_or_else(|| {
                    warn!("no handler for command {:#04x}", request.code);
                    StatusCode::ErrorCommand
                }),
        }
    }

    fn set_page(&mut self, page: PageId) -> StatusCode {
        if self.bus.with_view(|view| view.select_page(page)) {
            StatusCode::Success
        } else {
            StatusCode::ErrorArgument
        }
    }

    fn set_device_address(&mut self, address: u8) -> StatusCode {
        if !is_valid_address(address) {
            return StatusCode::ErrorArgument;
        }
        if self.store.read_address() != address {
            debug!("storing bus address {:#04x}", address);
            self.store.write_address(address);
        }
        StatusCode::Success
    }
}
