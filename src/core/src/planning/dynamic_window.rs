use crate::entities::{GameFrame, Robot, VectorExtensions};
use crate::planning::geometry::point_segment_distance;
use crate::planning::obstacles::ObstacleRegion;
use crate::planning::ROBOT_RADIUS;
use log::warn;
use nalgebra::Vector2;
use std::f32::consts::TAU;

const N_DIRECTIONS: usize = 16;

/// Result of one planning step: a velocity for this tick and how good the
/// chosen motion is. A very negative score means no progress is possible
/// and the caller should consider an exit strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedMotion {
    pub velocity: Vector2<f32>,
    pub score: f32,
}

impl PlannedMotion {
    pub fn stationary(score: f32) -> Self {
        PlannedMotion {
            velocity: Vector2::zeros(),
            score,
        }
    }
}

/// Dynamic-Window local planner. Stateless: every call plans one tick from
/// the frame it is given, so it can be shared across robots.
pub struct DynamicWindowPlanner;

impl DynamicWindowPlanner {
    pub const SIMULATED_TIMESTEP: f32 = 1.0 / 60.0;
    pub const MAX_ACCELERATION: f32 = 2.0;
    const MIN_SCALE_FACTOR: f32 = 0.05;

    pub fn new() -> Self {
        DynamicWindowPlanner
    }

    /// Plan a collision-avoiding velocity toward `target` for the given
    /// friendly robot.
    pub fn plan(
        &self,
        frame: &GameFrame,
        robot_id: u8,
        target: Vector2<f32>,
        temporary_obstacles: &[ObstacleRegion],
    ) -> PlannedMotion {
        let robot = match frame.friendly(robot_id) {
            Some(robot) => robot,
            None => {
                warn!("cannot plan for unknown friendly robot {robot_id}");
                return PlannedMotion::stationary(f32::NEG_INFINITY);
            }
        };

        let start = robot.position;
        if start.distance_to(&target) < 1.5 * ROBOT_RADIUS {
            return PlannedMotion {
                velocity: (target - start) / Self::SIMULATED_TIMESTEP,
                score: f32::INFINITY,
            };
        }

        self.local_planning(frame, robot, target, temporary_obstacles)
    }

    fn local_planning(
        &self,
        frame: &GameFrame,
        robot: &Robot,
        target: Vector2<f32>,
        temporary_obstacles: &[ObstacleRegion],
    ) -> PlannedMotion {
        let start = robot.position;
        let delta_vel = Self::SIMULATED_TIMESTEP * Self::MAX_ACCELERATION;

        let mut best_score = f32::NEG_INFINITY;
        let mut best_move = start;

        // Start at full velocity to prioritise speed, then shrink the
        // window whenever no candidate makes progress. This lets the robot
        // trade path length for clearance near obstacles.
        let mut sf = 1.0_f32;
        while best_score < 0.0 && sf > Self::MIN_SCALE_FACTOR {
            for i in 0..N_DIRECTIONS {
                let ang = i as f32 * TAU / N_DIRECTIONS as f32;
                let end = Self::motion_segment_end(start, robot.velocity, delta_vel * sf, ang);

                if temporary_obstacles
                    .iter()
                    .any(|region| region.rect.distance_to_segment(start, end) < ROBOT_RADIUS)
                {
                    continue;
                }

                let score = self.evaluate_segment(frame, robot, start, end, target);
                if score > best_score {
                    best_score = score;
                    best_move = end;
                }
            }
            sf /= 4.0;
        }

        PlannedMotion {
            velocity: (best_move - start) / Self::SIMULATED_TIMESTEP,
            score: best_score,
        }
    }

    /// Candidate end point: one timestep of the current velocity plus the
    /// allowed velocity increment along the sampled heading.
    fn motion_segment_end(
        position: Vector2<f32>,
        velocity: Vector2<f32>,
        delta_vel: f32,
        ang: f32,
    ) -> Vector2<f32> {
        position
            + velocity * Self::SIMULATED_TIMESTEP
            + Vector2::new(delta_vel * ang.cos(), delta_vel * ang.sin())
    }

    fn obstacle_penalty(x: f32) -> f32 {
        (-8.0 * (x - 0.22)).exp()
    }

    fn target_closeness(x: f32) -> f32 {
        4.0 * (-8.0 * x).exp()
    }

    /// Score one candidate segment; bigger is better.
    fn evaluate_segment(
        &self,
        frame: &GameFrame,
        robot: &Robot,
        start: Vector2<f32>,
        end: Vector2<f32>,
        target: Vector2<f32>,
    ) -> f32 {
        // Progress toward the target is rewarded.
        let target_factor = target.distance_to(&start) - target.distance_to(&end);

        let our_velocity = (end - start) / Self::SIMULATED_TIMESTEP;

        // Assume every other robot keeps its current velocity, find the
        // time of closest approach, and penalise near misses in the future.
        let mut obstacle_factor = 0.0_f32;
        for other in frame
            .all_robots()
            .filter(|other| !(other.is_friendly && other.id == robot.id))
        {
            let diff_v = our_velocity - other.velocity;
            let diff_p = start - other.position;

            let denom = diff_v.dot(&diff_v);
            if denom == 0.0 {
                continue;
            }
            let t = -diff_v.dot(&diff_p) / denom;
            if t > 0.0 {
                let closest = diff_p + diff_v * t;
                let d_sq = closest.dot(&closest);
                obstacle_factor = obstacle_factor
                    .max(Self::obstacle_penalty(d_sq) * Self::obstacle_penalty(t));
            }
        }

        // Weights tuned on the practice field.
        5.0 * target_factor - obstacle_factor
            + Self::target_closeness(point_segment_distance(target, start, end))
    }
}

impl Default for DynamicWindowPlanner {
    fn default() -> Self {
        Self::new()
    }
}
