use crate::entities::GameFrame;
use crate::planning::dynamic_window::{DynamicWindowPlanner, PlannedMotion};
use crate::planning::exit::{ClosestPointExit, ExitStrategy, is_too_close};
use crate::planning::obstacles::ObstacleRegion;
use log::debug;
use nalgebra::Vector2;

/// Front door of the planning stack: picks between the local planner and
/// the exit strategy, so callers never reason about temporary obstacles
/// themselves.
pub struct MotionController {
    planner: DynamicWindowPlanner,
    exit_strategy: ClosestPointExit,
}

impl MotionController {
    pub fn new() -> Self {
        MotionController {
            planner: DynamicWindowPlanner::new(),
            exit_strategy: ClosestPointExit,
        }
    }

    /// Velocity toward `target` for this tick. A robot caught inside (or
    /// hugging) a temporary obstacle is first routed to the nearest exit
    /// point.
    pub fn path_to(
        &self,
        frame: &GameFrame,
        robot_id: u8,
        target: Vector2<f32>,
        temporary_obstacles: &[ObstacleRegion],
    ) -> PlannedMotion {
        if let Some(robot) = frame.friendly(robot_id) {
            if is_too_close(robot.position, temporary_obstacles) {
                if let Some(exit_point) = self
                    .exit_strategy
                    .exit_point(robot.position, temporary_obstacles)
                {
                    debug!("robot {robot_id} exiting obstacle via {exit_point:?}");
                    // Plan straight at the exit point; the obstacle is not
                    // passed along, leaving cannot be blocked by it.
                    return self.planner.plan(frame, robot_id, exit_point, &[]);
                }
            }
        }

        self.planner.plan(frame, robot_id, target, temporary_obstacles)
    }
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new()
    }
}
