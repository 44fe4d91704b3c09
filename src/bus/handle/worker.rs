#![allow(unsafe_code)]

use crate::bus::{
    BusError,
    command::BusAccess,
    page::PageId,
    slice::RegMut,
    status::StatusCode,
    storage::BusStorage,
    system::SignalSink,
    view::WorkerView,
};

/// Handle used by the main loop and command handlers.
pub struct WorkerBus<'s, 'a, const P: usize, S: SignalSink> {
    storage: &'s BusStorage<'a, P, S>,
}

impl<'s, 'a, const P: usize, S: SignalSink> Clone for WorkerBus<'s, 'a, P, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'s, 'a, const P: usize, S: SignalSink> Copy for WorkerBus<'s, 'a, P, S> {}

impl<'s, 'a, const P: usize, S: SignalSink> core::fmt::Debug for WorkerBus<'s, 'a, P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkerBus").finish_non_exhaustive()
    }
}

impl<'s, 'a, const P: usize, S: SignalSink> WorkerBus<'s, 'a, P, S> {
    pub(crate) fn new(storage: &'s BusStorage<'a, P, S>) -> Self {
        Self { storage }
    }

    pub fn with_view<R>(&self, f: impl FnOnce(&mut WorkerView<'_, 'a, P>) -> R) -> R {
        critical_section::with(|_| unsafe { self.with_view_unchecked(f) })
    }

    /// # Safety
    /// Requires exclusive access to the bus engine. Only sound while the
    /// TWI interrupt is masked, e.g. before it is enabled at boot.
    pub unsafe fn with_view_unchecked<R>(&self, f: impl FnOnce(&mut WorkerView<'_, 'a, P>) -> R) -> R {
        let engine = unsafe { &mut *self.storage.engine.get() };
        let mut view = WorkerView::new(engine);
        f(&mut view)
    }

    pub fn default_address(&self) -> u8 {
        self.storage.default_address()
    }
}

impl<'s, 'a, const P: usize, S: SignalSink> BusAccess for WorkerBus<'s, 'a, P, S> {
    fn with_page(&self, page: PageId, f: &mut dyn FnMut(RegMut<'_>)) -> Result<(), BusError> {
        self.with_view(|view| view.with_page_mut(page, |regs| f(regs)))
    }

    fn update_status(&self, code: StatusCode) {
        self.with_view(|view| view.update_status(code))
    }
}
