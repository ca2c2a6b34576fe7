//! Raw per-camera records handed over by the vision decoder. Units follow
//! the standard SSL convention: metres, radians, seconds; origin at the
//! field centre, +x toward the right goal, +y toward the top.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRobotData {
    pub id: u8,
    pub x: f32,
    pub y: f32,
    pub orientation: f32,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBallData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawVisionData {
    pub timestamp_capture: f64,
    pub yellow_robots: Vec<RawRobotData>,
    pub blue_robots: Vec<RawRobotData>,
    pub balls: Vec<RawBallData>,
    pub camera_id: u8,
}

impl RawVisionData {
    pub fn empty(camera_id: u8, timestamp_capture: f64) -> Self {
        RawVisionData {
            timestamp_capture,
            yellow_robots: Vec::new(),
            blue_robots: Vec::new(),
            balls: Vec::new(),
            camera_id,
        }
    }
}
