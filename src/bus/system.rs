//! Hooks into the surrounding firmware: wake signals and restart.

use core::cell::Cell;

use critical_section::Mutex;

/// Signals raised by the bus toward the scheduler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Signals(u8);

impl Signals {
    pub const NONE: Signals = Signals(0);
    /// Keep the core awake, a transaction is in progress.
    pub const WAKE_LOCK: Signals = Signals(1 << 0);
    /// The worker has something to pick up.
    pub const WORKER_PENDING: Signals = Signals(1 << 1);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Signals) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for Signals {
    type Output = Signals;

    fn bitor(self, rhs: Signals) -> Signals {
        Signals(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for Signals {
    fn bitor_assign(&mut self, rhs: Signals) {
        self.0 |= rhs.0;
    }
}

/// Receives signals from interrupt context. Must not block.
pub trait SignalSink {
    fn raise(&self, signals: Signals);
}

/// Sink that drops every signal, for polling-only main loops.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSignal;

impl SignalSink for NoSignal {
    fn raise(&self, _signals: Signals) {}
}

/// Accumulates raised signals until the main loop drains them.
pub struct PendingSignals(Mutex<Cell<Signals>>);

impl core::fmt::Debug for PendingSignals {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingSignals").finish_non_exhaustive()
    }
}

impl Default for PendingSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingSignals {
    pub const fn new() -> Self {
        Self(Mutex::new(Cell::new(Signals::NONE)))
    }

    /// Returns and clears everything raised since the last call.
    pub fn take(&self) -> Signals {
        critical_section::with(|cs| self.0.borrow(cs).replace(Signals::NONE))
    }
}

impl SignalSink for PendingSignals {
    fn raise(&self, signals: Signals) {
        critical_section::with(|cs| {
            let cell = self.0.borrow(cs);
            cell.set(cell.get() | signals);
        });
    }
}

/// Restart primitive for the reset command.
pub trait SystemControl {
    fn restart(&mut self) -> !;
}
