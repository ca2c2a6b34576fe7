pub mod controller;
pub mod dynamic_window;
pub mod exit;
pub mod geometry;
pub mod obstacles;

pub use controller::*;
pub use dynamic_window::*;
pub use exit::*;
pub use geometry::*;
pub use obstacles::*;

/// Physical robot radius in metres.
pub const ROBOT_RADIUS: f32 = 0.09;
pub const ROBOT_DIAMETER: f32 = 2.0 * ROBOT_RADIUS;
