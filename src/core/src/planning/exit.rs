use crate::entities::VectorExtensions;
use crate::planning::obstacles::ObstacleRegion;
use nalgebra::Vector2;

/// Distance from the obstacle boundary to the exit point, so the robot ends
/// up completely outside.
pub const EXIT_POINT_BUFFER: f32 = 0.12;
/// Start exiting when the robot is inside the region or closer than this to
/// its boundary.
pub const OBSTACLE_SAFE_BUFFER: f32 = 0.05;
/// The exit point counts as reached within this distance.
pub const CLOSE_ENOUGH_TO_EXIT_POINT: f32 = 0.03;

/// Picks a target that takes a robot out of a temporary obstacle. Returns
/// `None` when no action is required. Best effort is mandatory: robots must
/// leave defense zones and stoppage circles on their own.
pub trait ExitStrategy {
    fn exit_point(
        &self,
        robot_position: Vector2<f32>,
        obstacles: &[ObstacleRegion],
    ) -> Option<Vector2<f32>>;
}

pub fn is_too_close(robot_position: Vector2<f32>, obstacles: &[ObstacleRegion]) -> bool {
    obstacles.iter().any(|region| {
        region.rect.contains(robot_position)
            || region.rect.distance_to_boundary(robot_position) < OBSTACLE_SAFE_BUFFER
    })
}

pub fn is_close_enough_to_exit_point(
    robot_position: Vector2<f32>,
    exit_point: Vector2<f32>,
) -> bool {
    robot_position.distance_to(&exit_point) < CLOSE_ENOUGH_TO_EXIT_POINT
}

/// Exit through the closest boundary point, offset outward by the buffer.
/// Obstacles are assumed not to overlap, so the robot can be inside at most
/// one of them.
pub struct ClosestPointExit;

impl ExitStrategy for ClosestPointExit {
    fn exit_point(
        &self,
        robot_position: Vector2<f32>,
        obstacles: &[ObstacleRegion],
    ) -> Option<Vector2<f32>> {
        obstacles
            .iter()
            .find(|region| is_too_close(robot_position, std::slice::from_ref(region)))
            .map(|region| {
                region
                    .rect
                    .exit_point_with_buffer(robot_position, EXIT_POINT_BUFFER)
            })
    }
}
