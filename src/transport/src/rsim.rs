use crate::grsim::{SimCommandSender, SimRobotCommand, to_global_frame};
use core::entities::{GameFrame, RobotCommand, RobotResponse};
use core::error::TransportError;
use core::run::CommandSink;
use log::warn;

/// RSim adapter. The Python-backed simulator uses a mirrored y axis, so
/// lateral and angular velocities flip sign on the way out.
pub struct RSimSink<S: SimCommandSender> {
    sender: S,
    queued: Vec<(u8, RobotCommand)>,
}

impl<S: SimCommandSender> RSimSink<S> {
    pub fn new(sender: S) -> Self {
        RSimSink {
            sender,
            queued: Vec::new(),
        }
    }

    fn invert_y(mut command: SimRobotCommand) -> SimRobotCommand {
        command.vel_y = -command.vel_y;
        command.vel_angular = -command.vel_angular;
        command
    }
}

impl<S: SimCommandSender> CommandSink for RSimSink<S> {
    fn queue(&mut self, robot_id: u8, command: RobotCommand) {
        self.queued.push((robot_id, command));
    }

    fn flush(&mut self, frame: &GameFrame) -> Result<Vec<RobotResponse>, TransportError> {
        let batch: Vec<SimRobotCommand> = self
            .queued
            .iter()
            .filter_map(|(id, command)| match frame.friendly(*id) {
                Some(robot) => {
                    Some(Self::invert_y(to_global_frame(command, robot.orientation, *id)))
                }
                None => {
                    warn!("dropping command for unseen robot {id}");
                    None
                }
            })
            .collect();
        self.queued.clear();
        self.sender.send(frame.my_team_is_yellow, &batch)?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::entities::Robot;
    use nalgebra::Vector2;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSender {
        sent: Arc<Mutex<Vec<Vec<SimRobotCommand>>>>,
    }

    impl SimCommandSender for RecordingSender {
        fn send(
            &mut self,
            _my_team_is_yellow: bool,
            batch: &[SimRobotCommand],
        ) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(batch.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_y_axis_inverted() {
        let sender = RecordingSender::default();
        let sent = sender.sent.clone();
        let mut sink = RSimSink::new(sender);

        let mut frame = GameFrame::empty(0.0, true, false);
        frame
            .friendly_robots
            .insert(0, Robot::at(0, true, Vector2::zeros(), 0.0));

        // Body-frame left velocity maps to +y globally, then flips.
        sink.queue(0, RobotCommand::drive(0.0, 1.0, 0.5));
        sink.flush(&frame).unwrap();

        let sent = sent.lock().unwrap();
        let cmd = sent[0][0];
        assert!((cmd.vel_y + 1.0).abs() < 1e-6);
        assert!((cmd.vel_angular + 0.5).abs() < 1e-6);
        assert!(cmd.vel_x.abs() < 1e-6);
    }
}
