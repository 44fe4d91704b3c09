use log::{trace, warn};

use crate::bus::{
    command::{CommandContext, CommandRequest},
    helpers::{AddressTarget, next_offset, split_address},
    layout::control,
    page::{Access, PageId},
    protocol::{BusState, Response, Session, StopOutcome},
    registry::Registry,
    status::{Status, StatusCode},
};

/// Byte clocked out when there is nothing valid to read.
pub const IDLE_BYTE: u8 = 0xFF;

/// All mutable bus state: register files, protocol cursor and command
/// bookkeeping.
///
/// Methods named after bus events are called from interrupt context;
/// the rest are for the worker. Callers provide exclusion.
pub struct BusEngine<'a, const P: usize> {
    pub(crate) registry: Registry<'a, P>,
    pub(crate) session: Session,
    pub(crate) context: CommandContext,
}

impl<'a, const P: usize> core::fmt::Debug for BusEngine<'a, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BusEngine")
            .field("session", &self.session)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<'a, const P: usize> BusEngine<'a, P> {
    pub(crate) fn new(registry: Registry<'a, P>) -> Self {
        Self {
            registry,
            session: Session::new(),
            context: CommandContext::new(),
        }
    }

    pub fn registry(&self) -> &Registry<'a, P> {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    pub fn status(&self) -> Status {
        Status::from_byte(self.registry.control()[control::STATUS])
    }

    fn set_status(&mut self, status: Status) {
        self.registry.control_mut()[control::STATUS] = status.to_byte();
    }

    /// The controller addressed this device (start or repeated start).
    pub fn address_match(&mut self) -> Response {
        match self.session.state {
            BusState::IoFinish => {
                trace!("address refused, command {:#04x} pending", self.context.command);
                return Response::Nack;
            }
            BusState::Idle => self.session.begin_transaction(),
            _ => {}
        }
        self.session.state = BusState::AddressOrRead;
        Response::Ack
    }

    /// The controller clocks a byte out of the device.
    pub fn controller_read(&mut self) -> u8 {
        match self.session.state {
            BusState::AddressOrRead
            | BusState::ReadOnly
            | BusState::ReadWriteFirstByte
            | BusState::ReadWrite => {}
            _ => return IDLE_BYTE,
        }

        let offset = self.session.offset;
        let Some(bytes) = self.registry.bytes(self.session.active_page) else {
            return IDLE_BYTE;
        };
        let byte = bytes.get(offset).copied().unwrap_or(IDLE_BYTE);
        self.session.offset = next_offset(offset, bytes.len());
        byte
    }

    /// The controller clocks a byte into the device.
    pub fn controller_write(&mut self, byte: u8) -> Response {
        match self.session.state {
            BusState::AddressOrRead => self.select_address(byte),
            BusState::ReadWriteFirstByte => {
                self.session.mark_written(self.session.active_page);
                self.session.state = BusState::ReadWrite;
                self.store(byte);
                Response::Ack
            }
            BusState::ReadWrite => {
                self.store(byte);
                Response::Ack
            }
            _ => Response::Nack,
        }
    }

    fn select_address(&mut self, byte: u8) -> Response {
        let (page, offset) = match split_address(byte) {
            AddressTarget::Control(offset) => (PageId::CONTROL, offset as usize),
            AddressTarget::Sticky(offset) => (self.session.page, offset as usize),
        };
        self.session.active_page = page;

        let len = self.registry.page_len(page).unwrap_or(0);
        if offset >= len {
            trace!("offset {} outside page {} (len {})", offset, page.0, len);
            self.session.offset = 0;
            self.session.state = BusState::Error;
            return Response::Nack;
        }

        self.session.offset = offset;
        self.session.state = match self.registry.access(page) {
            Some(Access::ReadWrite) => BusState::ReadWriteFirstByte,
            _ => BusState::ReadOnly,
        };
        Response::Ack
    }

    fn store(&mut self, byte: u8) {
        let page = self.session.active_page;
        let offset = self.session.offset;
        self.registry.store(page, offset, byte);
        let len = self.registry.page_len(page).unwrap_or(1);
        self.session.offset = next_offset(offset, len);
    }

    /// The controller released the bus.
    ///
    /// Posts the command byte of the first page written in the transaction
    /// if it is non-zero. Command bytes of pages written after a repeated
    /// start are cleared without running.
    pub fn stop(&mut self) -> StopOutcome {
        if self.session.state == BusState::IoFinish {
            return StopOutcome::Idle;
        }

        let written = self.session.written_pages;
        let first = self.session.written_page;
        self.session.begin_transaction();
        let Some(page) = first else {
            self.session.state = BusState::Idle;
            return StopOutcome::Idle;
        };

        for index in &written {
            if index == page.index() {
                continue;
            }
            let stale = self.registry.take_command(PageId(index as u8));
            if stale != 0 {
                trace!("dropped command {:#04x} on page {}", stale, index);
            }
        }

        match self.registry.take_command(page) {
            0 => {
                self.session.state = BusState::Idle;
                StopOutcome::Idle
            }
            code => self.post(page, code),
        }
    }

    fn post(&mut self, page: PageId, code: u8) -> StopOutcome {
        if self.context.in_flight() {
            warn!(
                "command {:#04x} rejected, {:#04x} still in flight",
                code, self.context.command
            );
            let status = self.status().with_bus_error();
            self.set_status(status);
            self.session.state = BusState::Idle;
            return StopOutcome::Rejected(code);
        }

        self.context.command = code;
        self.context.last_page = page;
        let status = self.status().with_code(StatusCode::InProgress);
        self.set_status(status);
        self.session.state = BusState::IoFinish;
        StopOutcome::Posted(code)
    }

    /// Releases the bus and hands the latched command to the worker.
    pub fn take_pending(&mut self) -> Option<CommandRequest> {
        if self.session.state != BusState::IoFinish {
            return None;
        }
        self.session.state = BusState::Idle;

        let mut params = [0u8; control::PARAM_COUNT];
        params.copy_from_slice(&self.registry.control()[control::PARAMS..control::LEN]);
        Some(CommandRequest {
            code: self.context.command,
            params,
            page: self.context.last_page,
        })
    }

    /// Merges `code` into the status byte.
    ///
    /// A terminal code completes the command in flight.
    pub fn update_status(&mut self, code: StatusCode) {
        let status = self.status().with_code(code);
        self.set_status(status);
        if code.is_terminal() && self.context.in_flight() {
            self.context.last_command = self.context.command;
            self.context.command = 0;
        }
    }

    /// Changes the sticky page. Only driver pages and device info qualify.
    pub fn select_page(&mut self, page: PageId) -> bool {
        if page == PageId::CONTROL || !self.registry.contains(page) {
            return false;
        }
        self.session.page = page;
        true
    }
}
