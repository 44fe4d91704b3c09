mod macros;
mod ro;
mod rw;

pub use ro::RegRef;
pub use rw::RegMut;
