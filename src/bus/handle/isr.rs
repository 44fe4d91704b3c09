#![allow(unsafe_code)]

use crate::bus::{storage::BusStorage, system::SignalSink, view::IsrView};

/// Handle used by the TWI interrupt.
pub struct IsrBus<'s, 'a, const P: usize, S: SignalSink> {
    storage: &'s BusStorage<'a, P, S>,
}

impl<'s, 'a, const P: usize, S: SignalSink> Clone for IsrBus<'s, 'a, P, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'s, 'a, const P: usize, S: SignalSink> Copy for IsrBus<'s, 'a, P, S> {}

impl<'s, 'a, const P: usize, S: SignalSink> core::fmt::Debug for IsrBus<'s, 'a, P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IsrBus").finish_non_exhaustive()
    }
}

impl<'s, 'a, const P: usize, S: SignalSink> IsrBus<'s, 'a, P, S> {
    pub(crate) fn new(storage: &'s BusStorage<'a, P, S>) -> Self {
        Self { storage }
    }

    pub fn with_view<R>(&self, f: impl FnOnce(&mut IsrView<'_, 'a, P, S>) -> R) -> R {
        critical_section::with(|_| unsafe { self.with_view_unchecked(f) })
    }

    /// # Safety
    /// Requires exclusive access to the bus engine. The TWI interrupt
    /// satisfies this when no other interrupt touching the bus can preempt
    /// it and the worker only reaches the engine inside critical sections.
    pub unsafe fn with_view_unchecked<R>(
        &self,
        f: impl FnOnce(&mut IsrView<'_, 'a, P, S>) -> R,
    ) -> R {
        let engine = unsafe { &mut *self.storage.engine.get() };
        let mut view = IsrView::new(engine, &self.storage.signal);
        f(&mut view)
    }
}
