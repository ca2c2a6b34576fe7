use crate::entities::{
    Ball, GameFrame, RawBallData, RawRobotData, RawVisionData, Robot, normalize_angle,
};
use nalgebra::{Vector2, Vector3};
use std::collections::HashMap;
use std::f32::consts::PI;

/// Detections below this confidence are noise and dropped outright.
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.1;

/// Merges the per-camera detections of one tick into a single frame.
/// Robots seen by overlapping cameras keep their highest-confidence
/// observation; feeds that report in the team-local convention are rotated
/// into absolute field coordinates when the team plays the right side.
pub struct PositionRefiner {
    confidence_threshold: f32,
}

impl PositionRefiner {
    pub fn new() -> Self {
        PositionRefiner {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_confidence_threshold(confidence_threshold: f32) -> Self {
        PositionRefiner {
            confidence_threshold,
        }
    }

    /// Produce the next frame from the previous one plus fresh camera data.
    /// Entities no camera saw this tick keep their previous state.
    pub fn refine(
        &self,
        previous: &GameFrame,
        vision_frames: &[Option<RawVisionData>],
    ) -> GameFrame {
        let mut frame = previous.clone();
        frame.referee = None;

        let mut best_yellow: HashMap<u8, RawRobotData> = HashMap::new();
        let mut best_blue: HashMap<u8, RawRobotData> = HashMap::new();
        let mut best_ball: Option<RawBallData> = None;

        for vision in vision_frames.iter().flatten() {
            frame.timestamp = frame.timestamp.max(vision.timestamp_capture);

            for robot in &vision.yellow_robots {
                Self::keep_best_robot(&mut best_yellow, robot, self.confidence_threshold);
            }
            for robot in &vision.blue_robots {
                Self::keep_best_robot(&mut best_blue, robot, self.confidence_threshold);
            }
            for ball in &vision.balls {
                if ball.confidence < self.confidence_threshold {
                    continue;
                }
                if best_ball.map_or(true, |b| ball.confidence > b.confidence) {
                    best_ball = Some(*ball);
                }
            }
        }

        let (friendly_raw, enemy_raw) = if frame.my_team_is_yellow {
            (best_yellow, best_blue)
        } else {
            (best_blue, best_yellow)
        };

        for (id, raw) in friendly_raw {
            frame
                .friendly_robots
                .insert(id, self.to_robot(&frame, &raw, true));
        }
        for (id, raw) in enemy_raw {
            frame
                .enemy_robots
                .insert(id, self.to_robot(&frame, &raw, false));
        }
        if let Some(raw) = best_ball {
            let position = self.to_field_point3(&frame, raw.x, raw.y, raw.z);
            frame.ball = Some(Ball::at(position));
        }

        frame
    }

    fn keep_best_robot(best: &mut HashMap<u8, RawRobotData>, robot: &RawRobotData, threshold: f32) {
        if robot.confidence < threshold {
            return;
        }
        match best.get(&robot.id) {
            Some(existing) if existing.confidence >= robot.confidence => {}
            _ => {
                best.insert(robot.id, *robot);
            }
        }
    }

    fn to_robot(&self, frame: &GameFrame, raw: &RawRobotData, is_friendly: bool) -> Robot {
        let position = self.to_field_point(frame, raw.x, raw.y);
        let orientation = if frame.my_team_is_right {
            normalize_angle(raw.orientation + PI)
        } else {
            raw.orientation
        };
        Robot::at(raw.id, is_friendly, position, orientation)
    }

    fn to_field_point(&self, frame: &GameFrame, x: f32, y: f32) -> Vector2<f32> {
        if frame.my_team_is_right {
            Vector2::new(-x, -y)
        } else {
            Vector2::new(x, y)
        }
    }

    fn to_field_point3(&self, frame: &GameFrame, x: f32, y: f32, z: f32) -> Vector3<f32> {
        let p = self.to_field_point(frame, x, y);
        Vector3::new(p.x, p.y, z)
    }
}

impl Default for PositionRefiner {
    fn default() -> Self {
        Self::new()
    }
}
