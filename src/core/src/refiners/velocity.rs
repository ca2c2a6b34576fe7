use crate::entities::{GameFrame, PresentFutureGame};
use log::warn;
use nalgebra::{Vector2, Vector3};

/// Frames averaged per window when estimating acceleration.
pub const ACCELERATION_WINDOW_SIZE: usize = 5;
/// Number of windows differentiated pairwise.
pub const ACCELERATION_N_WINDOWS: usize = 3;

/// Below this Δt a finite difference is numerically meaningless.
const MIN_DT: f64 = 1e-9;

/// Estimates velocities from the previous frame and accelerations from a
/// windowed finite difference over the velocity history. Anything that
/// cannot be estimated becomes zero with a warning; stale sensor data must
/// never take the control loop down.
pub struct VelocityRefiner;

impl VelocityRefiner {
    pub fn new() -> Self {
        VelocityRefiner
    }

    pub fn refine(&self, past: &PresentFutureGame, mut frame: GameFrame) -> GameFrame {
        let now = frame.timestamp;

        let friendly_ids: Vec<u8> = frame.friendly_robots.keys().copied().collect();
        for id in friendly_ids {
            self.refine_robot(past, &mut frame, true, id, now);
        }
        let enemy_ids: Vec<u8> = frame.enemy_robots.keys().copied().collect();
        for id in enemy_ids {
            self.refine_robot(past, &mut frame, false, id, now);
        }

        if let Some(ball) = frame.ball.as_mut() {
            let previous = past
                .current
                .ball
                .as_ref()
                .map(|b| (past.current.timestamp, b.position));
            ball.velocity = match previous {
                Some((prev_ts, prev_pos)) => {
                    let dt = now - prev_ts;
                    if dt <= MIN_DT {
                        warn!("ball velocity dt too small ({dt}), using zero");
                        Vector3::zeros()
                    } else {
                        (ball.position - prev_pos) / dt as f32
                    }
                }
                None => {
                    warn!("no historical ball position, using zero velocity");
                    Vector3::zeros()
                }
            };

            let mut series = vec![(now, ball.velocity)];
            series.extend(std::iter::once(&past.current).chain(past.history()).filter_map(
                |f| f.ball.as_ref().map(|b| (f.timestamp, b.velocity)),
            ));
            ball.acceleration = windowed_acceleration3(&series).unwrap_or_else(|| {
                warn!("insufficient ball history for acceleration, using zero");
                Vector3::zeros()
            });
        }

        frame
    }

    fn refine_robot(
        &self,
        past: &PresentFutureGame,
        frame: &mut GameFrame,
        is_friendly: bool,
        id: u8,
        now: f64,
    ) {
        let previous = {
            let robots = if is_friendly {
                &past.current.friendly_robots
            } else {
                &past.current.enemy_robots
            };
            robots.get(&id).map(|r| (past.current.timestamp, r.position))
        };

        let position = {
            let robots = if is_friendly {
                &frame.friendly_robots
            } else {
                &frame.enemy_robots
            };
            robots[&id].position
        };

        let velocity = match previous {
            Some((prev_ts, prev_pos)) => {
                let dt = now - prev_ts;
                if dt <= MIN_DT {
                    warn!("robot {id} velocity dt too small ({dt}), using zero");
                    Vector2::zeros()
                } else {
                    (position - prev_pos) / dt as f32
                }
            }
            None => {
                warn!("no historical position for robot {id}, using zero velocity");
                Vector2::zeros()
            }
        };

        let mut series = vec![(now, velocity)];
        series.extend(
            std::iter::once(&past.current)
                .chain(past.history())
                .filter_map(|f| {
                    let robots = if is_friendly {
                        &f.friendly_robots
                    } else {
                        &f.enemy_robots
                    };
                    robots.get(&id).map(|r| (f.timestamp, r.velocity))
                }),
        );
        let acceleration = windowed_acceleration2(&series).unwrap_or(Vector2::zeros());

        let robots = if is_friendly {
            &mut frame.friendly_robots
        } else {
            &mut frame.enemy_robots
        };
        let robot = robots.get_mut(&id).unwrap();
        robot.velocity = velocity;
        robot.acceleration = acceleration;
    }
}

impl Default for VelocityRefiner {
    fn default() -> Self {
        Self::new()
    }
}

/// Windowed acceleration over a newest-first velocity series: average each
/// window, differentiate the window means pairwise, and average the
/// segments whose Δt is usable. `None` when the series is too short.
fn windowed_acceleration2(series: &[(f64, Vector2<f32>)]) -> Option<Vector2<f32>> {
    let needed = ACCELERATION_WINDOW_SIZE * ACCELERATION_N_WINDOWS;
    if series.len() < needed {
        return None;
    }

    // Oldest first so segment deltas run forward in time.
    let chronological: Vec<&(f64, Vector2<f32>)> = series[..needed].iter().rev().collect();

    let mut window_times = [0.0_f64; ACCELERATION_N_WINDOWS];
    let mut window_means = [Vector2::zeros(); ACCELERATION_N_WINDOWS];
    for (w, chunk) in chronological.chunks(ACCELERATION_WINDOW_SIZE).enumerate() {
        let mut t_sum = 0.0;
        let mut v_sum = Vector2::zeros();
        for entry in chunk {
            let (t, v) = **entry;
            t_sum += t;
            v_sum += v;
        }
        window_times[w] = t_sum / chunk.len() as f64;
        window_means[w] = v_sum / chunk.len() as f32;
    }

    let mut accel_sum = Vector2::zeros();
    let mut valid = 0usize;
    for w in 1..ACCELERATION_N_WINDOWS {
        let dt = window_times[w] - window_times[w - 1];
        if dt <= MIN_DT {
            continue;
        }
        accel_sum += (window_means[w] - window_means[w - 1]) / dt as f32;
        valid += 1;
    }

    if valid == 0 {
        warn!("all acceleration segments have degenerate dt");
        return Some(Vector2::zeros());
    }
    Some(accel_sum / valid as f32)
}

fn windowed_acceleration3(series: &[(f64, Vector3<f32>)]) -> Option<Vector3<f32>> {
    let needed = ACCELERATION_WINDOW_SIZE * ACCELERATION_N_WINDOWS;
    if series.len() < needed {
        return None;
    }

    let chronological: Vec<&(f64, Vector3<f32>)> = series[..needed].iter().rev().collect();

    let mut window_times = [0.0_f64; ACCELERATION_N_WINDOWS];
    let mut window_means = [Vector3::zeros(); ACCELERATION_N_WINDOWS];
    for (w, chunk) in chronological.chunks(ACCELERATION_WINDOW_SIZE).enumerate() {
        let mut t_sum = 0.0;
        let mut v_sum = Vector3::zeros();
        for entry in chunk {
            let (t, v) = **entry;
            t_sum += t;
            v_sum += v;
        }
        window_times[w] = t_sum / chunk.len() as f64;
        window_means[w] = v_sum / chunk.len() as f32;
    }

    let mut accel_sum = Vector3::zeros();
    let mut valid = 0usize;
    for w in 1..ACCELERATION_N_WINDOWS {
        let dt = window_times[w] - window_times[w - 1];
        if dt <= MIN_DT {
            continue;
        }
        accel_sum += (window_means[w] - window_means[w - 1]) / dt as f32;
        valid += 1;
    }

    if valid == 0 {
        warn!("all acceleration segments have degenerate dt");
        return Some(Vector3::zeros());
    }
    Some(accel_sum / valid as f32)
}
