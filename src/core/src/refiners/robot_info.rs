use crate::entities::{GameFrame, RobotResponse};
use log::warn;

/// Applies `has_ball` feedback from the transport onto the matching
/// friendly robots.
pub struct RobotInfoRefiner;

impl RobotInfoRefiner {
    pub fn new() -> Self {
        RobotInfoRefiner
    }

    pub fn refine(&self, mut frame: GameFrame, responses: &[RobotResponse]) -> GameFrame {
        for response in responses {
            match frame.friendly_robots.get_mut(&response.robot_id) {
                Some(robot) => robot.has_ball = response.has_ball,
                None => warn!(
                    "robot id {} in transport response not found in friendly robots",
                    response.robot_id
                ),
            }
        }
        frame
    }
}

impl Default for RobotInfoRefiner {
    fn default() -> Self {
        Self::new()
    }
}
