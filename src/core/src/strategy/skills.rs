use crate::entities::{GameFrame, Robot, RobotCommand, VectorExtensions, normalize_angle};
use crate::planning::{MotionController, ObstacleRegion, PlannedMotion};
use nalgebra::Vector2;

/// Proportional gain turning heading error into angular velocity.
const TURN_GAIN: f32 = 3.0;
/// Heading error below which the robot counts as facing the target.
pub const FACING_TOLERANCE: f32 = 0.08;

/// Convert a world-frame velocity into a body-frame drive command, facing
/// toward `face_at` while moving.
pub fn drive_command(robot: &Robot, velocity: Vector2<f32>, face_at: Vector2<f32>) -> RobotCommand {
    let heading_error = normalize_angle(robot.position.angle_to(&face_at) - robot.orientation);

    let (sin, cos) = robot.orientation.sin_cos();
    let local_forward = cos * velocity.x + sin * velocity.y;
    let local_left = -sin * velocity.x + cos * velocity.y;

    RobotCommand::drive(local_forward, local_left, TURN_GAIN * heading_error)
}

/// One step of the go-to-point skill: plan with the dynamic window and
/// convert the result into a body-frame command.
pub fn go_to_point(
    frame: &GameFrame,
    motion: &MotionController,
    robot_id: u8,
    target: Vector2<f32>,
    temporary_obstacles: &[ObstacleRegion],
) -> Option<(RobotCommand, PlannedMotion)> {
    let robot = frame.friendly(robot_id)?;
    let planned = motion.path_to(frame, robot_id, target, temporary_obstacles);
    let face_at = frame
        .ball
        .as_ref()
        .map(|b| Vector2::new(b.position.x, b.position.y))
        .unwrap_or(target);
    Some((drive_command(robot, planned.velocity, face_at), planned))
}

/// Turn on the spot toward an orientation, without translating.
pub fn turn_on_spot(robot: &Robot, target_orientation: f32) -> RobotCommand {
    let heading_error = normalize_angle(target_orientation - robot.orientation);
    RobotCommand::drive(0.0, 0.0, TURN_GAIN * heading_error)
}

/// Kick command: actuate the kicker this tick, no driving.
pub fn kick() -> RobotCommand {
    RobotCommand::halt().kicking()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_drive_command_identity_orientation() {
        let robot = Robot::at(0, true, Vector2::zeros(), 0.0);
        let cmd = drive_command(&robot, Vector2::new(1.0, 0.0), Vector2::new(1.0, 0.0));
        assert!((cmd.local_forward_vel - 1.0).abs() < 1e-6);
        assert!(cmd.local_left_vel.abs() < 1e-6);
        assert!(cmd.angular_vel.abs() < 1e-6);
    }

    #[test]
    fn test_drive_command_rotated_body_frame() {
        // Robot facing +y; a world +x velocity is to its right.
        let robot = Robot::at(0, true, Vector2::zeros(), FRAC_PI_2);
        let cmd = drive_command(&robot, Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0));
        assert!(cmd.local_forward_vel.abs() < 1e-6);
        assert!((cmd.local_left_vel + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_turn_on_spot_direction() {
        let robot = Robot::at(0, true, Vector2::zeros(), 0.0);
        let cmd = turn_on_spot(&robot, FRAC_PI_2);
        assert!(cmd.angular_vel > 0.0);
        assert_eq!(cmd.local_forward_vel, 0.0);

        let cmd = turn_on_spot(&robot, -FRAC_PI_2);
        assert!(cmd.angular_vel < 0.0);
    }

    #[test]
    fn test_kick_sets_actuator_only() {
        let cmd = kick();
        assert!(cmd.kick);
        assert_eq!(cmd.local_forward_vel, 0.0);
    }
}
