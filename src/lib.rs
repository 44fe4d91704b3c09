//! A `no_std`, no-alloc I2C/TWI peripheral register-file bus.
//!
//! The device answers on a single bus address and exposes a set of
//! byte-addressed register files ("pages"). Writing a command byte into a
//! page posts a command, which a background worker executes outside
//! interrupt context before reporting a status back over the bus.
//!
//! # Features
//!
//! - **Zero heap allocation** - Pages are borrowed driver buffers
//! - **One command in flight** - The bus refuses new transactions until
//!   the worker picks up the posted command
//! - **Extensible commands** - Drivers claim command codes by mask/match
//! - **Written-byte tracking** - Drivers see which registers the
//!   controller touched
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐          ┌──────────────────────────┐
//! │   TWI interrupt      │          │   Main loop (worker)     │
//! │                      │          │                          │
//! │  service()           │ command  │  poll()                  │
//! │  (address/data/stop) │─────────▶│  take_pending()          │
//! │  NACK while pending  │  latch   │  run core / table cmd    │
//! │                      │          │                          │
//! │  status byte read    │◀─────────│  update_status()         │
//! │                      │  status  │                          │
//! └──────────────────────┘          └──────────────────────────┘
//! ```
//!
//! - **Page 0** is the control block: status, shared tx-command, command, four parameters
//! - **Page 1** is read-only device info
//! - **Pages 2..** belong to drivers, in registration order
//!
//! An address byte with any of its high four bits set reaches the control
//! page at the low-nibble offset; otherwise it is an offset into the
//! sticky page chosen by the set-page command.
//!
//! # Example
//!
//! ```rust,no_run
//! use regbus::prelude::*;
//!
//! struct Reboot;
//!
//! impl SystemControl for Reboot {
//!     fn restart(&mut self) -> ! {
//!         loop {}
//!     }
//! }
//!
//! # struct Twi;
//! # impl TwiPeripheral for Twi {
//! #     fn status(&mut self) -> u8 { 0 }
//! #     fn read_data(&mut self) -> u8 { 0 }
//! #     fn write_data(&mut self, _: u8) {}
//! #     fn command(&mut self, _: u8) {}
//! # }
//! let mut keypad = [0u8; 8];
//!
//! let mut storage = BusStorageBuilder::new()
//!     .driver_pages::<1>()
//!     .default_device_info()
//!     .builtin_address()
//!     .signal(PendingSignals::new())
//!     .build();
//! let keypad_page = storage.register(RegisterFile::read_only(&mut keypad)).unwrap();
//!
//! let mut worker: CommandWorker<'_, '_, '_, 1, 4, _, _, _> =
//!     CommandWorker::new(storage.worker_bus(), VolatileStore::new(), Reboot);
//! let _address = worker.boot_address();
//!
//! // TWI interrupt
//! let mut twi = Twi;
//! unsafe {
//!     storage.isr_bus().with_view_unchecked(|view| view.service(&mut twi));
//! }
//!
//! // Main loop
//! if storage.signal().take().contains(Signals::WORKER_PENDING) {
//!     worker.poll();
//! }
//! storage.worker_bus().with_view(|view| {
//!     view.with_page_mut(keypad_page, |mut regs| regs.write_u8_at(0, 0x01)).unwrap();
//! });
//! ```

#![deny(unsafe_code)]
#![no_std]

pub mod bus;
pub mod led;

pub mod prelude {
    pub use crate::bus::prelude::*;
}
