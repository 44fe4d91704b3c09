use crate::bus::{
    BusError,
    command::{CommandContext, CommandRequest},
    engine::BusEngine,
    helpers::page_span,
    page::PageId,
    protocol::Session,
    slice::{RegMut, RegRef},
    status::{Status, StatusCode},
};

/// Worker-side view of the bus.
///
/// Gives command handlers and drivers access to register files and the
/// command context. Writes made here are not reported as written by the
/// controller.
pub struct WorkerView<'v, 'a, const P: usize> {
    engine: &'v mut BusEngine<'a, P>,
}

impl<'v, 'a, const P: usize> core::fmt::Debug for WorkerView<'v, 'a, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkerView").finish_non_exhaustive()
    }
}

impl<'v, 'a, const P: usize> WorkerView<'v, 'a, P> {
    pub(crate) fn new(engine: &'v mut BusEngine<'a, P>) -> Self {
        Self { engine }
    }

    /// Frees the bus and returns the posted command, if any.
    pub fn take_pending(&mut self) -> Option<CommandRequest> {
        self.engine.take_pending()
    }

    pub fn update_status(&mut self, code: StatusCode) {
        self.engine.update_status(code)
    }

    pub fn status(&self) -> Status {
        self.engine.status()
    }

    pub fn context(&self) -> &CommandContext {
        self.engine.context()
    }

    pub fn session(&self) -> &Session {
        self.engine.session()
    }

    pub fn page_count(&self) -> u8 {
        self.engine.registry().count()
    }

    pub fn select_page(&mut self, page: PageId) -> bool {
        self.engine.select_page(page)
    }

    pub fn with_page<R>(&self, page: PageId, f: impl FnOnce(RegRef<'_>) -> R) -> Result<R, BusError> {
        self.engine
            .registry()
            .bytes(page)
            .map(|bytes| f(RegRef::new(bytes)))
            .ok_or(BusError::UnknownPage)
    }

    pub fn with_page_mut<R>(
        &mut self,
        page: PageId,
        f: impl FnOnce(RegMut<'_>) -> R,
    ) -> Result<R, BusError> {
        self.engine
            .registry
            .bytes_mut(page)
            .map(|bytes| f(RegMut::new(bytes)))
    }

    /// Like [`Self::with_page_mut`], restricted to `len` bytes at `offset`.
    pub fn with_range_mut<R>(
        &mut self,
        page: PageId,
        offset: usize,
        len: usize,
        f: impl FnOnce(RegMut<'_>) -> R,
    ) -> Result<R, BusError> {
        let bytes = self
            .engine
            .registry
            .bytes_mut(page)?;
        let (start, end) = page_span(bytes.len(), offset, len)?;
        Ok(f(RegMut::new(&mut bytes[start..end])))
    }

    pub fn is_written(&self, page: PageId, offset: usize) -> bool {
        self.engine.registry().is_written(page, offset)
    }

    pub fn any_written(&self, page: PageId) -> bool {
        self.engine.registry().any_written(page)
    }

    pub fn iter_written(&self, page: PageId, f: impl FnMut(usize, u8)) {
        self.engine.registry().iter_written(page, f)
    }

    pub fn clear_written(&mut self, page: PageId) {
        self.engine.registry.clear_written(page)
    }
}
