pub mod receiver;
pub mod ring;
pub mod sink;

pub use receiver::*;
pub use ring::*;
pub use sink::*;
