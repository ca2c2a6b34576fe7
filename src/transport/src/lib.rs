pub mod crc;
pub mod frame;
pub mod grsim;
pub mod rsim;
pub mod serial;

pub use crc::*;
pub use frame::*;
pub use grsim::*;
pub use rsim::*;
pub use serial::*;
