use core::entities::{GameFrame, RobotCommand, RobotResponse};
use core::error::TransportError;
use core::run::CommandSink;
use log::warn;

/// A per-robot command in the simulator's global SSL frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimRobotCommand {
    pub id: u8,
    pub vel_x: f32,
    pub vel_y: f32,
    pub vel_angular: f32,
    pub kick: bool,
    pub chip: bool,
    pub dribble: bool,
}

/// Delivery channel into a simulator; the RPC/protobuf plumbing lives
/// outside the core.
pub trait SimCommandSender: Send {
    fn send(&mut self, my_team_is_yellow: bool, batch: &[SimRobotCommand])
    -> Result<(), TransportError>;
}

/// Rotate a body-frame command into the global SSL frame using the robot's
/// current orientation.
pub fn to_global_frame(command: &RobotCommand, orientation: f32, id: u8) -> SimRobotCommand {
    let (sin, cos) = orientation.sin_cos();
    SimRobotCommand {
        id,
        vel_x: cos * command.local_forward_vel - sin * command.local_left_vel,
        vel_y: sin * command.local_forward_vel + cos * command.local_left_vel,
        vel_angular: command.angular_vel,
        kick: command.kick,
        chip: command.chip,
        dribble: command.dribble,
    }
}

/// grSim adapter: direct velocity commands in the standard SSL frame.
pub struct GrSimSink<S: SimCommandSender> {
    sender: S,
    queued: Vec<(u8, RobotCommand)>,
}

impl<S: SimCommandSender> GrSimSink<S> {
    pub fn new(sender: S) -> Self {
        GrSimSink {
            sender,
            queued: Vec::new(),
        }
    }

    pub(crate) fn convert_batch(
        queued: &[(u8, RobotCommand)],
        frame: &GameFrame,
    ) -> Vec<SimRobotCommand> {
        queued
            .iter()
            .filter_map(|(id, command)| match frame.friendly(*id) {
                Some(robot) => Some(to_global_frame(command, robot.orientation, *id)),
                None => {
                    warn!("dropping command for unseen robot {id}");
                    None
                }
            })
            .collect()
    }
}

impl<S: SimCommandSender> CommandSink for GrSimSink<S> {
    fn queue(&mut self, robot_id: u8, command: RobotCommand) {
        self.queued.push((robot_id, command));
    }

    fn flush(&mut self, frame: &GameFrame) -> Result<Vec<RobotResponse>, TransportError> {
        let batch = Self::convert_batch(&self.queued, frame);
        self.queued.clear();
        self.sender.send(frame.my_team_is_yellow, &batch)?;
        // The simulator reports ball contact through vision, not feedback.
        Ok(Vec::new())
    }
}
