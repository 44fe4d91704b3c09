mod isr;
mod worker;

pub use isr::IsrBus;
pub use worker::WorkerBus;
