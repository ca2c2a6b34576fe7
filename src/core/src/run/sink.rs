use crate::entities::{GameFrame, RobotCommand, RobotResponse};
use crate::error::TransportError;

/// Outgoing boundary of the decision core. Commands are queued per robot
/// during the tick and delivered in one batched flush afterwards.
/// Implementations live in the transport crate (serial, grSim, RSim).
pub trait CommandSink: Send {
    fn queue(&mut self, robot_id: u8, command: RobotCommand);

    /// Send everything queued this tick. The frame provides orientations
    /// for sinks that convert into the global frame. Returns whatever
    /// feedback the robots sent back.
    fn flush(&mut self, frame: &GameFrame) -> Result<Vec<RobotResponse>, TransportError>;
}

/// Sink that drops everything, for headless test runs.
#[derive(Default)]
pub struct NullSink {
    pub queued: Vec<(u8, RobotCommand)>,
}

impl CommandSink for NullSink {
    fn queue(&mut self, robot_id: u8, command: RobotCommand) {
        self.queued.push((robot_id, command));
    }

    fn flush(&mut self, _frame: &GameFrame) -> Result<Vec<RobotResponse>, TransportError> {
        self.queued.clear();
        Ok(Vec::new())
    }
}
