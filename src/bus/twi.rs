//! Register-level model of a peripheral-mode TWI engine.
//!
//! Bit positions follow the TWIS block found on tinyAVR 0/1-series and
//! megaAVR 0-series parts.

use crate::bus::protocol::Response;

/// TWIS status register (`SSTATUS`) bits.
pub mod sstatus {
    /// Data interrupt flag.
    pub const DIF: u8 = 1 << 7;
    /// Address or stop interrupt flag.
    pub const APIF: u8 = 1 << 6;
    pub const CLKHOLD: u8 = 1 << 5;
    /// Controller NACKed the last byte we sent.
    pub const RXACK: u8 = 1 << 4;
    pub const COLL: u8 = 1 << 3;
    pub const BUSERR: u8 = 1 << 2;
    /// Set when the controller is reading.
    pub const DIR: u8 = 1 << 1;
    /// With `APIF`: set for an address match, clear for a stop.
    pub const AP: u8 = 1 << 0;
}

/// TWIS control register B (`SCTRLB`) commands.
pub mod sctrlb {
    pub const ACKACT_NACK: u8 = 1 << 2;
    pub const SCMD_COMPTRANS: u8 = 0x02;
    pub const SCMD_RESPONSE: u8 = 0x03;
}

/// A bus event decoded from one interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwiEvent {
    AddressMatch,
    Stop,
    /// Controller expects a byte from us.
    ControllerRead,
    /// Controller sent a byte.
    ControllerWrite(u8),
}

impl TwiEvent {
    /// Decodes `SSTATUS`. `sdata` is only consumed for controller writes.
    ///
    /// Collisions and bus errors decode as a stop so the transaction is
    /// closed out. Returns `None` if no flag is raised.
    pub fn decode(status: u8, sdata: impl FnOnce() -> u8) -> Option<Self> {
        if status & (sstatus::COLL | sstatus::BUSERR) != 0 {
            return Some(TwiEvent::Stop);
        }
        if status & sstatus::APIF != 0 {
            return Some(if status & sstatus::AP != 0 {
                TwiEvent::AddressMatch
            } else {
                TwiEvent::Stop
            });
        }
        if status & sstatus::DIF != 0 {
            return Some(if status & sstatus::DIR != 0 {
                TwiEvent::ControllerRead
            } else {
                TwiEvent::ControllerWrite(sdata())
            });
        }
        None
    }
}

/// Answer written to `SCTRLB` to release the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwiResponse {
    Ack,
    Nack,
    /// Finish the transaction and wait for the next start.
    Complete,
}

impl TwiResponse {
    pub const fn sctrlb(self) -> u8 {
        match self {
            TwiResponse::Ack => sctrlb::SCMD_RESPONSE,
            TwiResponse::Nack => sctrlb::ACKACT_NACK | sctrlb::SCMD_RESPONSE,
            TwiResponse::Complete => sctrlb::SCMD_COMPTRANS,
        }
    }
}

impl From<Response> for TwiResponse {
    fn from(response: Response) -> Self {
        match response {
            Response::Ack => TwiResponse::Ack,
            Response::Nack => TwiResponse::Nack,
        }
    }
}

/// Access to the peripheral's registers.
pub trait TwiPeripheral {
    fn status(&mut self) -> u8;
    fn read_data(&mut self) -> u8;
    fn write_data(&mut self, byte: u8);
    /// Writes `SCTRLB`.
    fn command(&mut self, sctrlb: u8);
}
