pub mod position;
pub mod referee;
pub mod robot_info;
pub mod velocity;

pub use position::*;
pub use referee::*;
pub use robot_info::*;
pub use velocity::*;
