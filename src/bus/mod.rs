pub mod builder;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod helpers;
pub mod layout;
pub mod page;
pub mod persist;
pub mod protocol;
pub mod registry;
pub mod slice;
pub mod status;
pub mod storage;
pub mod system;
pub mod twi;
pub mod view;
pub mod worker;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
pub(crate) mod test_support;

pub use builder::BusStorageBuilder;
pub use command::{
    BusAccess, CommandContext, CommandHandler, CommandRequest, CommandTable, CoreCommand,
};
pub use engine::BusEngine;
pub use error::BusError;
pub use handle::{IsrBus, WorkerBus};
pub use layout::DeviceInfo;
pub use page::{Access, CommandField, PageId, RegisterFile};
pub use persist::{AddressStore, VolatileStore};
pub use protocol::{BusState, Response, StopOutcome};
pub use registry::Registry;
pub use slice::{RegMut, RegRef};
pub use status::{Status, StatusCode};
pub use storage::BusStorage;
pub use system::{NoSignal, PendingSignals, SignalSink, Signals, SystemControl};
pub use twi::{TwiEvent, TwiPeripheral, TwiResponse};
pub use view::{IsrView, WorkerView};
pub use worker::CommandWorker;

pub mod prelude {
    pub use super::{
        AddressStore, BusAccess, BusError, BusStorage, BusStorageBuilder, CommandHandler,
        CommandRequest, CommandWorker, DeviceInfo, IsrBus, IsrView, NoSignal, PageId,
        PendingSignals, RegMut, RegRef, RegisterFile, SignalSink, Signals, Status, StatusCode,
        SystemControl, TwiPeripheral, VolatileStore, WorkerBus, WorkerView,
    };
}
