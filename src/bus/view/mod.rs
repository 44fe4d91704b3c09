mod isr;
mod worker;

pub use isr::IsrView;
pub use worker::WorkerView;
