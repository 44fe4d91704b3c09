use bitmaps::Bitmap;

use crate::bus::page::PageId;

/// States of the peripheral-side bus protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    Idle,
    /// Addressed by the controller; the next written byte is an address.
    AddressOrRead,
    ReadOnly,
    /// Writable page selected, no payload byte seen yet.
    ReadWriteFirstByte,
    ReadWrite,
    /// A posted command waits for the worker. Address phases are refused.
    IoFinish,
    /// Bad address this transaction; every write is refused until a restart.
    Error,
}

/// How the engine answers the byte or address phase just seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ack,
    Nack,
}

/// What a stop condition did with the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing to run.
    Idle,
    /// Command latched for the worker.
    Posted(u8),
    /// Command dropped because another one is still in flight.
    Rejected(u8),
}

/// Cursor state of the bus, owned by the interrupt side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub(crate) state: BusState,
    /// Sticky page; changed only by the set-page command.
    pub(crate) page: PageId,
    /// Page addressed by the current transaction.
    pub(crate) active_page: PageId,
    pub(crate) offset: usize,
    /// First page that received payload since the transaction started.
    /// Its command byte is the one posted at stop.
    pub(crate) written_page: Option<PageId>,
    /// Every page that received payload, the first one included.
    pub(crate) written_pages: Bitmap<256>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: BusState::Idle,
            page: PageId::DEVICE_INFO,
            active_page: PageId::CONTROL,
            offset: 0,
            written_page: None,
            written_pages: Bitmap::new(),
        }
    }

    pub(crate) fn begin_transaction(&mut self) {
        self.written_page = None;
        self.written_pages = Bitmap::new();
    }

    pub(crate) fn mark_written(&mut self, page: PageId) {
        self.written_page.get_or_insert(page);
        self.written_pages.set(page.index(), true);
    }

    pub fn state(&self) -> BusState {
        self.state
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn active_page(&self) -> PageId {
        self.active_page
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
