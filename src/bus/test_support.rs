//! Test support utilities - only compiled in test builds.

use core::cell::Cell;

use crate::bus::{
    BusStorageBuilder, DeviceInfo, PageId, RegisterFile,
    engine::BusEngine,
    helpers::control_address,
    persist::AddressStore,
    registry::Registry,
    status::Status,
    storage::BusStorage,
    system::{SignalSink, Signals, SystemControl},
    twi::{TwiPeripheral, TwiResponse, sstatus},
    worker::CommandWorker,
};

/// First driver page in every fixture.
pub const DRIVER_PAGE: PageId = PageId(2);

/// Standard test configuration: two driver pages, recording signals.
pub type TestStorage<'a> = BusStorage<'a, 2, RecordingSignal>;
pub type TestWorker<'s, 'a, 't> =
    CommandWorker<'s, 'a, 't, 2, 4, RecordingSignal, CountingStore, PanicRestart>;

pub fn test_storage<'a>() -> TestStorage<'a> {
    BusStorageBuilder::new()
        .driver_pages::<2>()
        .default_device_info()
        .builtin_address()
        .signal(RecordingSignal::default())
        .build()
}

pub fn test_worker<'s, 'a, 't>(storage: &'s TestStorage<'a>) -> TestWorker<'s, 'a, 't> {
    CommandWorker::new(storage.worker_bus(), CountingStore::new(0xFF), PanicRestart)
}

/// Bare engine with one read-write driver page at [`DRIVER_PAGE`].
pub fn test_engine(buf: &mut [u8]) -> BusEngine<'_, 1> {
    let mut registry = Registry::new(&DeviceInfo::default());
    registry.register(RegisterFile::read_write(buf)).unwrap();
    BusEngine::new(registry)
}

/// Signal sink remembering everything raised since the last `take`.
#[derive(Default)]
pub struct RecordingSignal(Cell<Signals>);

impl RecordingSignal {
    pub fn take(&self) -> Signals {
        self.0.replace(Signals::NONE)
    }
}

impl SignalSink for RecordingSignal {
    fn raise(&self, signals: Signals) {
        self.0.set(self.0.get() | signals);
    }
}

/// Address store counting NVM writes.
pub struct CountingStore {
    pub value: u8,
    pub writes: usize,
}

impl CountingStore {
    pub fn new(value: u8) -> Self {
        Self { value, writes: 0 }
    }
}

impl AddressStore for CountingStore {
    fn read_address(&mut self) -> u8 {
        self.value
    }

    fn write_address(&mut self, address: u8) {
        self.value = address;
        self.writes += 1;
    }
}

/// Restart primitive that unwinds the test instead.
pub struct PanicRestart;

impl SystemControl for PanicRestart {
    fn restart(&mut self) -> ! {
        panic!("restart requested")
    }
}

/// Register file of the peripheral-mode TWI block.
#[derive(Debug, Default)]
pub struct SimTwi {
    pub sstatus: u8,
    pub sdata: u8,
    pub sctrlb: u8,
}

impl TwiPeripheral for SimTwi {
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

/// Where a controller transaction was refused; 0 is the address phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nacked {
    pub at: usize,
}

/// Bus controller driving the interrupt handler through [`SimTwi`].
#[derive(Debug, Default)]
pub struct SimController {
    pub twi: SimTwi,
}

impl SimController {
    pub fn new() -> Self {
        Self::default()
    }

    fn raise<const P: usize, S: SignalSink>(
        &mut self,
        storage: &BusStorage<'_, P, S>,
        sstatus: u8,
    ) -> u8 {
        self.twi.sstatus = sstatus;
        self.twi.sctrlb = 0;
        storage
            .isr_bus()
            .with_view(|view| view.service(&mut self.twi));
        self.twi.sctrlb
    }

    pub fn start<const P: usize, S: SignalSink>(
        &mut self,
        storage: &BusStorage<'_, P, S>,
        read: bool,
    ) -> Result<(), Nacked> {
        let dir = if read { sstatus::DIR } else { 0 };
        let answer = self.raise(storage, sstatus::APIF | sstatus::AP | dir);
        if answer == TwiResponse::Nack.sctrlb() {
            return Err(Nacked { at: 0 });
        }
        Ok(())
    }

    /// Sends one byte; returns true if it was acknowledged.
    pub fn send<const P: usize, S: SignalSink>(
        &mut self,
        storage: &BusStorage<'_, P, S>,
        byte: u8,
    ) -> bool {
        self.twi.sdata = byte;
        self.raise(storage, sstatus::DIF) == TwiResponse::Ack.sctrlb()
    }

    pub fn recv<const P: usize, S: SignalSink>(&mut self, storage: &BusStorage<'_, P, S>) -> u8 {
        self.raise(storage, sstatus::DIF | sstatus::DIR);
        self.twi.sdata
    }

    pub fn stop<const P: usize, S: SignalSink>(&mut self, storage: &BusStorage<'_, P, S>) {
        let answer = self.raise(storage, sstatus::APIF);
        assert_eq!(answer, TwiResponse::Complete.sctrlb());
    }

    fn send_all<const P: usize, S: SignalSink>(
        &mut self,
        storage: &BusStorage<'_, P, S>,
        bytes: &[u8],
    ) -> Result<(), Nacked> {
        for (i, &byte) in bytes.iter().enumerate() {
            if !self.send(storage, byte) {
                self.stop(storage);
                return Err(Nacked { at: i + 1 });
            }
        }
        Ok(())
    }

    pub fn write<const P: usize, S: SignalSink>(
        &mut self,
        storage: &BusStorage<'_, P, S>,
        bytes: &[u8],
    ) -> Result<(), Nacked> {
        self.start(storage, false)?;
        self.send_all(storage, bytes)?;
        self.stop(storage);
        Ok(())
    }

    /// Reads from the current cursor without addressing first.
    pub fn read<const P: usize, S: SignalSink>(
        &mut self,
        storage: &BusStorage<'_, P, S>,
        buf: &mut [u8],
    ) -> Result<(), Nacked> {
        self.start(storage, true)?;
        for byte in buf.iter_mut() {
            *byte = self.recv(storage);
        }
        self.stop(storage);
        Ok(())
    }

    /// Writes `bytes`, then reads `buf` after a repeated start.
    pub fn write_read<const P: usize, S: SignalSink>(
        &mut self,
        storage: &BusStorage<'_, P, S>,
        bytes: &[u8],
        buf: &mut [u8],
    ) -> Result<(), Nacked> {
        self.start(storage, false)?;
        self.send_all(storage, bytes)?;
        if self.start(storage, true).is_err() {
            self.stop(storage);
            return Err(Nacked { at: bytes.len() + 1 });
        }
        for byte in buf.iter_mut() {
            *byte = self.recv(storage);
        }
        self.stop(storage);
        Ok(())
    }

    pub fn read_status<const P: usize, S: SignalSink>(
        &mut self,
        storage: &BusStorage<'_, P, S>,
    ) -> Result<Status, Nacked> {
        let mut buf = [0u8; 1];
        self.write_read(storage, &[control_address(0)], &mut buf)?;
        Ok(Status::from_byte(buf[0]))
    }
}
