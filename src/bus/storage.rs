#![allow(unsafe_code)]

use core::cell::UnsafeCell;

use crate::bus::{
    BusError,
    engine::BusEngine,
    handle::{IsrBus, WorkerBus},
    layout::DeviceInfo,
    page::{PageId, RegisterFile},
    registry::Registry,
    system::SignalSink,
};

/// Owns the bus engine and hands out the interrupt and worker handles.
///
/// # Const Generics
/// - `P`: Capacity for driver-owned register files
///
/// # Type Parameters
/// - `S`: Sink receiving wake signals from interrupt context
pub struct BusStorage<'a, const P: usize, S: SignalSink> {
    pub(crate) engine: UnsafeCell<BusEngine<'a, P>>,
    pub(crate) signal: S,
    default_address: u8,
}

// SAFETY: the engine is only reached through `with_view`, which holds a
// critical section, or through `with_view_unchecked`, whose caller
// guarantees exclusion.
unsafe impl<'a, const P: usize, S: SignalSink + Sync> Sync for BusStorage<'a, P, S> {}

impl<'a, const P: usize, S: SignalSink> BusStorage<'a, P, S> {
    pub(crate) fn new(info: DeviceInfo, default_address: u8, signal: S) -> Self {
        Self {
            engine: UnsafeCell::new(BusEngine::new(Registry::new(&info))),
            signal,
            default_address,
        }
    }

    /// Appends a driver register file, returning its page index.
    ///
    /// Takes `&mut self`, so every page is in place before a handle
    /// exists.
    pub fn register(&mut self, file: RegisterFile<'a>) -> Result<PageId, BusError> {
        self.engine.get_mut().registry.register(file)
    }

    pub fn isr_bus(&self) -> IsrBus<'_, 'a, P, S> {
        IsrBus::new(self)
    }

    pub fn worker_bus(&self) -> WorkerBus<'_, 'a, P, S> {
        WorkerBus::new(self)
    }

    /// Address to answer on while NVM holds none.
    pub fn default_address(&self) -> u8 {
        self.default_address
    }

    pub fn signal(&self) -> &S {
        &self.signal
    }
}
