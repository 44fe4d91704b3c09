use log::trace;

use crate::bus::{
    engine::BusEngine,
    protocol::{BusState, Response, StopOutcome},
    status::StatusCode,
    system::{SignalSink, Signals},
    twi::{TwiEvent, TwiPeripheral, TwiResponse},
};

/// Interrupt-side view of the bus.
///
/// Turns decoded TWI events into protocol transitions and raises the
/// scheduler signals that go with them.
pub struct IsrView<'v, 'a, const P: usize, S: SignalSink> {
    engine: &'v mut BusEngine<'a, P>,
    signal: &'v S,
}

impl<'v, 'a, const P: usize, S: SignalSink> core::fmt::Debug for IsrView<'v, 'a, P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IsrView").finish_non_exhaustive()
    }
}

impl<'v, 'a, const P: usize, S: SignalSink> IsrView<'v, 'a, P, S> {
    pub(crate) fn new(engine: &'v mut BusEngine<'a, P>, signal: &'v S) -> Self {
        Self { engine, signal }
    }

    pub fn state(&self) -> BusState {
        self.engine.session().state()
    }

    pub fn on_address_match(&mut self) -> Response {
        self.engine.address_match()
    }

    pub fn on_stop(&mut self) -> StopOutcome {
        let outcome = self.engine.stop();
        self.signal.raise(Signals::WAKE_LOCK | Signals::WORKER_PENDING);
        outcome
    }

    pub fn on_controller_read(&mut self) -> u8 {
        self.signal.raise(Signals::WAKE_LOCK);
        self.engine.controller_read()
    }

    pub fn on_controller_write(&mut self, byte: u8) -> Response {
        self.signal.raise(Signals::WAKE_LOCK);
        self.engine.controller_write(byte)
    }

    /// Applies one event. Returns the `SCTRLB` answer and, for reads, the
    /// byte to load into `SDATA`.
    pub fn handle(&mut self, event: TwiEvent) -> (TwiResponse, Option<u8>) {
        match event {
            TwiEvent::AddressMatch => (self.on_address_match().into(), None),
            TwiEvent::Stop => {
                self.on_stop();
                (TwiResponse::Complete, None)
            }
            TwiEvent::ControllerRead => (TwiResponse::Ack, Some(self.on_controller_read())),
            TwiEvent::ControllerWrite(byte) => (self.on_controller_write(byte).into(), None),
        }
    }

    /// Complete interrupt body: decode, transition, answer the peripheral.
    pub fn service(&mut self, twi: &mut impl TwiPeripheral) {
        let status = twi.status();
        let Some(event) = TwiEvent::decode(status, || twi.read_data()) else {
            trace!("spurious twi interrupt, sstatus {:#04x}", status);
            return;
        };

        let (response, data) = self.handle(event);
        if let Some(byte) = data {
            twi.write_data(byte);
        }
        twi.command(response.sctrlb());
    }

    /// Status update from interrupt context, e.g. a driver's done interrupt.
    pub fn update_status(&mut self, code: StatusCode) {
        self.engine.update_status(code)
    }
}
