/// Velocity and actuator command for a single robot, in the robot's local
/// body frame (metres per second, radians per second).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RobotCommand {
    pub local_forward_vel: f32,
    pub local_left_vel: f32,
    pub angular_vel: f32,
    pub kick: bool,
    pub chip: bool,
    pub dribble: bool,
}

impl RobotCommand {
    /// A full stop with all actuators off.
    pub fn halt() -> Self {
        RobotCommand::default()
    }

    pub fn drive(local_forward_vel: f32, local_left_vel: f32, angular_vel: f32) -> Self {
        RobotCommand {
            local_forward_vel,
            local_left_vel,
            angular_vel,
            ..RobotCommand::default()
        }
    }

    pub fn kicking(mut self) -> Self {
        self.kick = true;
        self
    }

    pub fn dribbling(mut self) -> Self {
        self.dribble = true;
        self
    }
}

/// Feedback sent back over the transport by a robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotResponse {
    pub robot_id: u8,
    pub has_ball: bool,
}
