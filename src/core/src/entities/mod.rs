pub mod ball;
pub mod command;
pub mod game;
pub mod proximity;
pub mod robot;
pub mod vector;
pub mod vision;

pub use ball::*;
pub use command::*;
pub use game::*;
pub use proximity::*;
pub use robot::*;
pub use vector::*;
pub use vision::*;
