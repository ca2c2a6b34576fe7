use crate::entities::{Ball, Robot};
use crate::error::InvariantError;
use crate::referee::RefereeData;
use log::warn;
use nalgebra::{Vector2, Vector3};
use std::collections::{HashMap, VecDeque};

/// Number of past frames retained for the velocity/acceleration windows.
/// Must stay ≥ 15 (3 windows × 5 frames).
pub const HISTORY_CAPACITY: usize = 32;

/// One validated snapshot of the world, as produced by the refiner chain.
#[derive(Debug, Clone, PartialEq)]
pub struct GameFrame {
    pub timestamp: f64,
    pub my_team_is_yellow: bool,
    pub my_team_is_right: bool,
    pub friendly_robots: HashMap<u8, Robot>,
    pub enemy_robots: HashMap<u8, Robot>,
    pub ball: Option<Ball>,
    pub referee: Option<RefereeData>,
}

impl GameFrame {
    pub fn empty(timestamp: f64, my_team_is_yellow: bool, my_team_is_right: bool) -> Self {
        GameFrame {
            timestamp,
            my_team_is_yellow,
            my_team_is_right,
            friendly_robots: HashMap::new(),
            enemy_robots: HashMap::new(),
            ball: None,
            referee: None,
        }
    }

    pub fn friendly(&self, id: u8) -> Option<&Robot> {
        self.friendly_robots.get(&id)
    }

    pub fn enemy(&self, id: u8) -> Option<&Robot> {
        self.enemy_robots.get(&id)
    }

    /// All robots on the field, both teams.
    pub fn all_robots(&self) -> impl Iterator<Item = &Robot> {
        self.friendly_robots.values().chain(self.enemy_robots.values())
    }

    /// No robot id may appear in both team maps.
    pub fn check_disjoint_ids(&self) -> Result<(), InvariantError> {
        for id in self.friendly_robots.keys() {
            if self.enemy_robots.contains_key(id) {
                return Err(InvariantError::DuplicateRobotId { id: *id });
            }
        }
        Ok(())
    }
}

/// The current frame plus a bounded ring of past frames and an optional
/// predicted frame. The strategy runner is the sole writer.
pub struct PresentFutureGame {
    pub current: GameFrame,
    history: VecDeque<GameFrame>,
    pub predicted: Option<GameFrame>,
}

impl PresentFutureGame {
    pub fn new(current: GameFrame) -> Self {
        PresentFutureGame {
            current,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            predicted: None,
        }
    }

    /// Advance to a new frame, retiring the current one into the history
    /// ring. Frames older than the current frame are dropped: receivers can
    /// deliver reordered data after a camera hiccup.
    pub fn advance(&mut self, frame: GameFrame) -> bool {
        if frame.timestamp < self.current.timestamp {
            warn!(
                "dropping out-of-order frame: ts {} < current {}",
                frame.timestamp, self.current.timestamp
            );
            return false;
        }

        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_back();
        }
        let previous = std::mem::replace(&mut self.current, frame);
        self.history.push_front(previous);
        self.predicted = None;
        true
    }

    /// Most recent retired frame, if any.
    pub fn previous(&self) -> Option<&GameFrame> {
        self.history.front()
    }

    /// Past frames, newest first.
    pub fn history(&self) -> impl Iterator<Item = &GameFrame> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Extrapolate the current frame `dt` seconds forward under constant
    /// velocity, and cache the result in `predicted`.
    pub fn predict(&mut self, dt: f32) -> &GameFrame {
        let mut frame = self.current.clone();
        frame.timestamp += dt as f64;
        for robot in frame
            .friendly_robots
            .values_mut()
            .chain(frame.enemy_robots.values_mut())
        {
            robot.position += robot.velocity * dt;
        }
        if let Some(ball) = frame.ball.as_mut() {
            ball.position += ball.velocity * dt;
        }
        self.predicted = Some(frame);
        self.predicted.as_ref().unwrap()
    }

    /// Velocity series for a friendly or enemy robot over the history ring,
    /// newest first, up to `n` samples.
    pub fn robot_velocity_history(
        &self,
        is_friendly: bool,
        id: u8,
        n: usize,
    ) -> Vec<(f64, Vector2<f32>)> {
        self.history
            .iter()
            .filter_map(|frame| {
                let robots = if is_friendly {
                    &frame.friendly_robots
                } else {
                    &frame.enemy_robots
                };
                robots.get(&id).map(|r| (frame.timestamp, r.velocity))
            })
            .take(n)
            .collect()
    }

    /// Ball velocity series over the history ring, newest first.
    pub fn ball_velocity_history(&self, n: usize) -> Vec<(f64, Vector3<f32>)> {
        self.history
            .iter()
            .filter_map(|frame| frame.ball.as_ref().map(|b| (frame.timestamp, b.velocity)))
            .take(n)
            .collect()
    }
}
