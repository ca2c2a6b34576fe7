use crate::frame::encode_batch;
use core::entities::{GameFrame, RobotCommand, RobotResponse};
use core::error::TransportError;
use core::run::CommandSink;
use log::debug;

/// Byte-level link to the radio base station. The real implementation
/// wraps a serial port; tests substitute a loopback.
pub trait SerialLink: Send {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Drain whatever response bytes have arrived since the last write.
    fn read_available(&mut self) -> Result<Vec<u8>, TransportError>;
}

/// Batches commands into the 8-byte-per-robot serial protocol and decodes
/// robot feedback. One response byte per robot:
/// `has_ball:0x80 | robot_id` in the low nibble.
pub struct SerialSink<L: SerialLink> {
    link: L,
    n_robots: usize,
    queued: Vec<(u8, RobotCommand)>,
}

impl<L: SerialLink> SerialSink<L> {
    pub fn new(link: L, n_robots: usize) -> Self {
        SerialSink {
            link,
            n_robots,
            queued: Vec::new(),
        }
    }

    fn decode_responses(bytes: &[u8]) -> Vec<RobotResponse> {
        bytes
            .iter()
            .map(|byte| RobotResponse {
                robot_id: byte & 0x0F,
                has_ball: byte & 0x80 != 0,
            })
            .collect()
    }
}

impl<L: SerialLink> CommandSink for SerialSink<L> {
    fn queue(&mut self, robot_id: u8, command: RobotCommand) {
        self.queued.push((robot_id, command));
    }

    fn flush(&mut self, _frame: &GameFrame) -> Result<Vec<RobotResponse>, TransportError> {
        let packet = encode_batch(&self.queued, self.n_robots)?;
        self.link.write_all(&packet)?;
        // The batch is consumed whether or not feedback arrives.
        self.queued.clear();

        let raw = self.link.read_available()?;
        let responses = Self::decode_responses(&raw);
        if !responses.is_empty() {
            debug!("decoded {} robot responses", responses.len());
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ROBOT_FRAME_LEN;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LoopbackLink {
        written: Arc<Mutex<Vec<Vec<u8>>>>,
        responses: Arc<Mutex<Vec<u8>>>,
    }

    impl SerialLink for LoopbackLink {
        fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            self.written.lock().unwrap().push(bytes.to_vec());
            Ok(())
        }

        fn read_available(&mut self) -> Result<Vec<u8>, TransportError> {
            Ok(std::mem::take(&mut *self.responses.lock().unwrap()))
        }
    }

    #[test]
    fn test_flush_writes_one_packet_per_tick() {
        let link = LoopbackLink::default();
        let written = link.written.clone();
        let mut sink = SerialSink::new(link, 6);

        sink.queue(0, RobotCommand::drive(0.2, 0.0, 0.0));
        sink.queue(3, RobotCommand::halt().dribbling());
        let frame = GameFrame::empty(0.0, true, false);
        sink.flush(&frame).unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].len(), 6 * ROBOT_FRAME_LEN);
        // Queue is flushed; the next tick starts empty.
        drop(written);
        sink.flush(&frame).unwrap();
    }

    #[test]
    fn test_response_decoding() {
        let link = LoopbackLink::default();
        *link.responses.lock().unwrap() = vec![0x81, 0x02];
        let mut sink = SerialSink::new(link, 6);

        let frame = GameFrame::empty(0.0, true, false);
        let responses = sink.flush(&frame).unwrap();
        assert_eq!(
            responses,
            vec![
                RobotResponse {
                    robot_id: 1,
                    has_ball: true
                },
                RobotResponse {
                    robot_id: 2,
                    has_ball: false
                },
            ]
        );
    }
}
