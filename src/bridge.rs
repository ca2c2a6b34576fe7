//! Thin I/O shims between the decision core and the outside world. The
//! real protocol decoders (SSL-Vision protobuf, grSim RPC) run in separate
//! bridge processes; these shims speak the compact datagram format the
//! bridges emit, so the core stays free of protobuf.

use core::entities::{RawBallData, RawRobotData, RawVisionData};
use core::error::TransportError;
use core::run::FrameSource;
use log::warn;
use std::fs::File;
use std::io::Write;
use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use transport::{SerialLink, SimCommandSender, SimRobotCommand};

const MAX_DATAGRAM: usize = 2048;
/// Read timeout so receiver threads notice the stop flag.
const READ_TIMEOUT: Duration = Duration::from_millis(200);

/// One camera feed from the vision bridge.
///
/// Datagram layout (little endian):
/// `camera_id u8, t_capture f64, n_yellow u8, n_blue u8, n_balls u8`,
/// then per robot `id u8, x f32, y f32, orientation f32, confidence f32`
/// (yellow first, then blue), then per ball `x f32, y f32, z f32,
/// confidence f32`.
pub struct VisionBridgeSource {
    socket: UdpSocket,
    running: Arc<AtomicBool>,
}

impl VisionBridgeSource {
    pub fn bind(addr: &str, running: Arc<AtomicBool>) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(READ_TIMEOUT))?;
        Ok(VisionBridgeSource { socket, running })
    }
}

impl FrameSource<RawVisionData> for VisionBridgeSource {
    fn next_frame(&mut self) -> Option<RawVisionData> {
        let mut buf = [0u8; MAX_DATAGRAM];
        while self.running.load(Ordering::Relaxed) {
            match self.socket.recv_from(&mut buf) {
                Ok((len, _)) => match decode_vision_datagram(&buf[..len]) {
                    Some(frame) => return Some(frame),
                    None => warn!("dropping malformed vision datagram ({len} bytes)"),
                },
                Err(err)
                    if err.kind() == std::io::ErrorKind::WouldBlock
                        || err.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(err) => {
                    warn!("vision socket error: {err}");
                    return None;
                }
            }
        }
        None
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn u8(&mut self) -> Option<u8> {
        let value = *self.data.get(self.offset)?;
        self.offset += 1;
        Some(value)
    }

    fn f32(&mut self) -> Option<f32> {
        let bytes = self.data.get(self.offset..self.offset + 4)?;
        self.offset += 4;
        Some(f32::from_le_bytes(bytes.try_into().unwrap()))
    }

    fn f64(&mut self) -> Option<f64> {
        let bytes = self.data.get(self.offset..self.offset + 8)?;
        self.offset += 8;
        Some(f64::from_le_bytes(bytes.try_into().unwrap()))
    }
}

fn decode_vision_datagram(data: &[u8]) -> Option<RawVisionData> {
    let mut reader = Reader { data, offset: 0 };

    let camera_id = reader.u8()?;
    let timestamp_capture = reader.f64()?;
    let n_yellow = reader.u8()? as usize;
    let n_blue = reader.u8()? as usize;
    let n_balls = reader.u8()? as usize;

    fn robots(count: usize, reader: &mut Reader) -> Option<Vec<RawRobotData>> {
        (0..count)
            .map(|_| {
                Some(RawRobotData {
                    id: reader.u8()?,
                    x: reader.f32()?,
                    y: reader.f32()?,
                    orientation: reader.f32()?,
                    confidence: reader.f32()?,
                })
            })
            .collect()
    }

    let yellow_robots = robots(n_yellow, &mut reader)?;
    let blue_robots = robots(n_blue, &mut reader)?;
    let balls = (0..n_balls)
        .map(|_| {
            Some(RawBallData {
                x: reader.f32()?,
                y: reader.f32()?,
                z: reader.f32()?,
                confidence: reader.f32()?,
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(RawVisionData {
        timestamp_capture,
        yellow_robots,
        blue_robots,
        balls,
        camera_id,
    })
}

/// Sends converted velocity batches to a simulator bridge as one datagram
/// per tick: `team u8, n u8`, then per robot
/// `id u8, vel_x f32, vel_y f32, vel_angular f32, flags u8`
/// with flags `kick:0x01 | chip:0x02 | dribble:0x04`.
pub struct UdpSimSender {
    socket: UdpSocket,
    target: String,
}

impl UdpSimSender {
    pub fn connect(target: &str) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(UdpSimSender {
            socket,
            target: target.to_string(),
        })
    }
}

impl SimCommandSender for UdpSimSender {
    fn send(
        &mut self,
        my_team_is_yellow: bool,
        batch: &[SimRobotCommand],
    ) -> Result<(), TransportError> {
        let mut datagram = Vec::with_capacity(2 + batch.len() * 14);
        datagram.push(my_team_is_yellow as u8);
        datagram.push(batch.len() as u8);
        for command in batch {
            datagram.push(command.id);
            datagram.extend_from_slice(&command.vel_x.to_le_bytes());
            datagram.extend_from_slice(&command.vel_y.to_le_bytes());
            datagram.extend_from_slice(&command.vel_angular.to_le_bytes());
            let mut flags = 0u8;
            if command.kick {
                flags |= 0x01;
            }
            if command.chip {
                flags |= 0x02;
            }
            if command.dribble {
                flags |= 0x04;
            }
            datagram.push(flags);
        }

        self.socket
            .send_to(&datagram, &self.target)
            .map_err(|err| TransportError::SimulatorSend {
                reason: err.to_string(),
            })?;
        Ok(())
    }
}

/// Write-only serial device. Feedback bytes travel through the base
/// station bridge, which folds them into `RobotResponse` records upstream.
pub struct DeviceLink {
    device: File,
}

impl DeviceLink {
    pub fn open(path: &str) -> Result<Self, TransportError> {
        let device = File::options()
            .write(true)
            .open(path)
            .map_err(|err| TransportError::SerialWrite {
                reason: format!("cannot open {path}: {err}"),
            })?;
        Ok(DeviceLink { device })
    }
}

impl SerialLink for DeviceLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.device
            .write_all(bytes)
            .map_err(|err| TransportError::SerialWrite {
                reason: err.to_string(),
            })
    }

    fn read_available(&mut self) -> Result<Vec<u8>, TransportError> {
        Ok(Vec::new())
    }
}
