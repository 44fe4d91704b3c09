//! Addressable-LED register file driven over the bus.
//!
//! Page layout:
//!
//! ```text
//! 0     command     own command byte, 0x10 update / 0x11 clear
//! 1     flags       bit 1 set while the strip is transmitting
//! 2     count       LEDs to drive, clamped to MAX_LEDS
//! 3..   colors      G, R, B per LED
//! ```
//!
//! The strip hardware sits behind [`LedStrip`]. The buffer is also
//! writable by the bus interrupt, so colours can change under a running
//! update; the next update picks up whatever the controller left.

use core::cell::Cell;

use log::debug;

use crate::bus::{BusAccess, CommandHandler, CommandRequest, PageId, RegMut, StatusCode};

pub const COMMAND: usize = 0;
pub const FLAGS: usize = 1;
pub const COUNT: usize = 2;
pub const COLORS: usize = 3;
pub const MAX_LEDS: usize = 4;
pub const PAGE_LEN: usize = COLORS + 3 * MAX_LEDS;

pub const FLAG_BUSY: u8 = 1 << 1;

pub const CMD_UPDATE: u8 = 0x10;
pub const CMD_CLEAR: u8 = 0x11;
/// Dispatch-table entry routing the LED command block here.
pub const COMMAND_MASK: u8 = 0xF0;
pub const COMMAND_MATCH: u8 = 0x10;

/// One LED in wire order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub g: u8,
    pub r: u8,
    pub b: u8,
}

/// Serial LED transmitter.
pub trait LedStrip {
    fn set(&self, index: usize, color: Color);
    /// Starts shifting the staged colours out.
    fn update(&self);
    fn is_busy(&self) -> bool;
}

/// Command handler owning the LED page.
pub struct LedDriver<L: LedStrip> {
    page: PageId,
    strip: L,
    in_flight: Cell<bool>,
}

impl<L: LedStrip> core::fmt::Debug for LedDriver<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LedDriver")
            .field("page", &self.page)
            .field("in_flight", &self.in_flight.get())
            .finish_non_exhaustive()
    }
}

impl<L: LedStrip> LedDriver<L> {
    pub fn new(page: PageId, strip: L) -> Self {
        Self {
            page,
            strip,
            in_flight: Cell::new(false),
        }
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn strip(&self) -> &L {
        &self.strip
    }

    fn update(&self, bus: &dyn BusAccess) -> StatusCode {
        if self.strip.is_busy() {
            return StatusCode::ErrorBusy;
        }

        let strip = &self.strip;
        let loaded = bus.with_page(self.page, &mut |mut regs: RegMut<'_>| {
            let count = (regs.read_u8_at(COUNT) as usize).min(MAX_LEDS);
            for i in 0..count {
                let at = COLORS + 3 * i;
                strip.set(
                    i,
                    Color {
                        g: regs.read_u8_at(at),
                        r: regs.read_u8_at(at + 1),
                        b: regs.read_u8_at(at + 2),
                    },
                );
            }
            let flags = regs.read_u8_at(FLAGS);
            regs.write_u8_at(FLAGS, flags | FLAG_BUSY);
        });
        if loaded.is_err() {
            return StatusCode::ErrorAccess;
        }

        self.strip.update();
        self.in_flight.set(true);
        StatusCode::InProgress
    }

    fn clear(&self, bus: &dyn BusAccess) -> StatusCode {
        if self.strip.is_busy() {
            return StatusCode::ErrorBusy;
        }
        match bus.with_page(self.page, &mut |mut regs: RegMut<'_>| {
            regs.fill_at(COLORS, 3 * MAX_LEDS, 0)
        }) {
            Ok(()) => StatusCode::Success,
            Err(_) => StatusCode::ErrorAccess,
        }
    }

    /// Reports completion of a running update. Call from the main loop or
    /// on the strip's done signal.
    ///
    /// Returns true if an update finished.
    pub fn poll_done(&self, bus: &dyn BusAccess) -> bool {
        if !self.in_flight.get() || self.strip.is_busy() {
            return false;
        }
        self.in_flight.set(false);
        let status = match bus.with_page(self.page, &mut |mut regs: RegMut<'_>| {
            let flags = regs.read_u8_at(FLAGS);
            regs.write_u8_at(FLAGS, flags & !FLAG_BUSY);
        }) {
            Ok(()) => StatusCode::Success,
            Err(_) => StatusCode::ErrorAccess,
        };
        debug!("led update done: {:?}", status);
        bus.update_status(status);
        true
    }
}

impl<L: LedStrip> CommandHandler for LedDriver<L> {
    fn handle(&self, request: &CommandRequest, bus: &dyn BusAccess) -> StatusCode {
        match request.code {
            CMD_UPDATE => self.update(bus),
            CMD_CLEAR => self.clear(bus),
            _ => StatusCode::ErrorCommand,
        }
    }
}
