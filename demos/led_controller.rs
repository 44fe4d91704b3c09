//! LED controller example: a bus controller driving the LED page
//!
//! This example demonstrates:
//! - Building bus storage and registering a driver page
//! - Feeding TWI events to the interrupt view
//! - Running posted commands from the main loop
//! - Completing an asynchronous command from a driver

use std::cell::Cell;

use regbus::{
    bus::{helpers::control_address, layout::control, twi::sstatus},
    led::{self, Color, LedDriver, LedStrip},
    prelude::*,
};

/// Peripheral registers as the interrupt sees them.
#[derive(Default)]
struct DemoTwi {
    sstatus: u8,
    sdata: u8,
    sctrlb: u8,
}

impl TwiPeripheral for DemoTwi {
    fn status(&mut self) -> u8 {
        self.sstatus
    }
    fn read_data(&mut self) -> u8 {
        self.sdata
    }
    fn write_data(&mut self, byte: u8) {
        self.sdata = byte;
    }
    fn command(&mut self, sctrlb: u8) {
        self.sctrlb = sctrlb;
    }
}

/// Strip that "transmits" instantly after one poll.
#[derive(Default)]
struct PrintStrip {
    busy: Cell<bool>,
}

impl LedStrip for PrintStrip {
    fn set(&self, index: usize, color: Color) {
        println!("  led[{index}] = g{:02x} r{:02x} b{:02x}", color.g, color.r, color.b);
    }
    fn update(&self) {
        self.busy.set(true);
    }
    fn is_busy(&self) -> bool {
        self.busy.replace(false)
    }
}

struct Halt;

impl SystemControl for Halt {
    fn restart(&mut self) -> ! {
        std::process::exit(0)
    }
}

/// Raises one interrupt and returns what the device wrote to SCTRLB.
fn interrupt<S: SignalSink>(storage: &BusStorage<'_, 1, S>, twi: &mut DemoTwi, status: u8) -> u8 {
    twi.sstatus = status;
    storage.isr_bus().with_view(|view| view.service(&mut *twi));
    twi.sctrlb
}

fn write<S: SignalSink>(storage: &BusStorage<'_, 1, S>, twi: &mut DemoTwi, bytes: &[u8]) {
    interrupt(storage, twi, sstatus::APIF | sstatus::AP);
    for &byte in bytes {
        twi.sdata = byte;
        interrupt(storage, twi, sstatus::DIF);
    }
    interrupt(storage, twi, sstatus::APIF);
}

fn read_status<S: SignalSink>(storage: &BusStorage<'_, 1, S>, twi: &mut DemoTwi) -> Status {
    interrupt(storage, twi, sstatus::APIF | sstatus::AP);
    twi.sdata = control_address(control::STATUS as u8);
    interrupt(storage, twi, sstatus::DIF);
    interrupt(storage, twi, sstatus::APIF | sstatus::AP | sstatus::DIR);
    interrupt(storage, twi, sstatus::DIF | sstatus::DIR);
    let byte = twi.sdata;
    interrupt(storage, twi, sstatus::APIF);
    Status::from_byte(byte)
}

pub fn main() {
    let mut leds = [0u8; led::PAGE_LEN];

    let mut storage = BusStorageBuilder::new()
        .driver_pages::<1>()
        .default_device_info()
        .builtin_address()
        .signal(PendingSignals::new())
        .build();
    let page = storage
        .register(RegisterFile::read_write(&mut leds).with_command_at(led::COMMAND as u8))
        .unwrap();

    let driver = LedDriver::new(page, PrintStrip::default());
    let mut worker: CommandWorker<'_, '_, '_, 1, 2, _, _, _> =
        CommandWorker::new(storage.worker_bus(), VolatileStore::new(), Halt);
    worker
        .register(led::COMMAND_MASK, led::COMMAND_MATCH, &driver)
        .unwrap();
    println!("answering on {:#04x}", worker.boot_address());

    let mut twi = DemoTwi::default();
    let command = control_address(control::COMMAND as u8);

    // Select the LED page, then load two colours and request an update
    let transactions: [&[u8]; 2] = [
        &[command, 0x01, page.0],
        &[0x00, led::CMD_UPDATE, 0x00, 2, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00],
    ];

    for bytes in transactions {
        write(&storage, &mut twi, bytes);

        // A few main-loop iterations: run the command, then let the strip finish
        for _ in 0..3 {
            if storage.signal().take().contains(Signals::WORKER_PENDING) {
                if let Some(status) = worker.poll() {
                    println!("command {:#04x} -> {:?}", bytes[1], status);
                }
            }
            if driver.poll_done(&worker.bus()) {
                println!("update finished");
            }
        }
        println!("status byte {:#04x}", read_status(&storage, &mut twi).to_byte());
    }
}
