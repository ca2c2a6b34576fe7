use crate::behavior::{
    Action, Behavior, Blackboard, Condition, Inverter, Selector, Sequence, Status, TickContext,
};
use crate::entities::{GameFrame, RobotCommand, TeamKind, Vector3Projection, VectorExtensions};
use crate::error::ConfigError;
use crate::strategy::skills::{drive_command, go_to_point};
use crate::strategy::{Role, Strategy};
use nalgebra::Vector2;

/// Close enough to the ball to engage the dribbler.
const BALL_CONTACT_DISTANCE: f32 = 0.12;
/// The placement succeeds once the ball rests within this radius of the
/// designated position (the rules allow 0.15 m).
const PLACEMENT_TOLERANCE: f32 = 0.1;
/// Carry speed while dribbling; slow, so the ball is not lost.
const CARRY_SPEED: f32 = 0.5;

/// Single-robot ball placement: the closest robot collects the ball and
/// dribbles it to the referee's designated position, while the rest of the
/// squad stands still.
pub struct BallPlacementStrategy;

impl BallPlacementStrategy {
    pub fn new() -> Self {
        BallPlacementStrategy
    }

    fn placement_target(frame: &GameFrame) -> Option<Vector2<f32>> {
        let referee = frame.referee.as_ref()?;
        let our_placement = referee
            .command
            .kicking_team_is_yellow()
            .is_some_and(|yellow| yellow == frame.my_team_is_yellow);
        if !our_placement {
            return None;
        }
        referee
            .designated_position
            .map(|(x, y)| Vector2::new(x, y))
    }

    fn halt_all(ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        for id in ctx.game.current.friendly_robots.keys() {
            blackboard.set_command(*id, RobotCommand::halt());
        }
        Status::Running
    }

    /// Pick the placer and pin the target for the rest of the run.
    fn select_placer(ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let frame = &ctx.game.current;
        let Some(target) = Self::placement_target(frame) else {
            return Status::Failure;
        };
        let Some((key, _)) = ctx.proximity.closest_to_ball(Some(TeamKind::Friendly)) else {
            return Status::Failure;
        };

        blackboard.robot_id = Some(key.id);
        blackboard.target_coords = Some(target);
        blackboard.dribbled_distance = 0.0;
        blackboard.role_map.insert(key.id, Role::Striker);

        // Everyone else freezes while the placement runs.
        for id in frame.friendly_robots.keys() {
            if *id != key.id {
                blackboard.set_command(*id, RobotCommand::halt());
            }
        }
        Status::Success
    }

    fn approach_ball(ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let frame = &ctx.game.current;
        let (Some(robot_id), Some(ball)) = (blackboard.robot_id, frame.ball.as_ref()) else {
            return Status::Failure;
        };
        let Some(robot) = frame.friendly(robot_id) else {
            return Status::Failure;
        };

        let ball_2d = ball.position.to_2d();
        if robot.position.distance_to(&ball_2d) <= BALL_CONTACT_DISTANCE || robot.has_ball {
            return Status::Success;
        }

        match go_to_point(frame, ctx.motion, robot_id, ball_2d, &[]) {
            Some((command, _)) => {
                blackboard.set_command(robot_id, command.dribbling());
                Status::Running
            }
            None => Status::Failure,
        }
    }

    fn carry_to_target(ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let frame = &ctx.game.current;
        let (Some(robot_id), Some(target)) = (blackboard.robot_id, blackboard.target_coords)
        else {
            return Status::Failure;
        };
        let (Some(robot), Some(ball)) = (frame.friendly(robot_id), frame.ball.as_ref()) else {
            return Status::Failure;
        };

        let ball_2d = ball.position.to_2d();
        if ball_2d.distance_to(&target) <= PLACEMENT_TOLERANCE {
            return Status::Success;
        }

        // Creep toward the target with the dribbler engaged; the planner is
        // skipped on purpose, a placement run must be straight and slow.
        let to_target = target - robot.position;
        let distance = to_target.norm();
        let velocity = if distance > 1e-6 {
            to_target / distance * CARRY_SPEED.min(distance)
        } else {
            Vector2::zeros()
        };
        blackboard.dribbled_distance +=
            robot.velocity.norm() * crate::planning::DynamicWindowPlanner::SIMULATED_TIMESTEP;
        blackboard.set_command(robot_id, drive_command(robot, velocity, target).dribbling());
        Status::Running
    }

    fn release(_ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        if let Some(robot_id) = blackboard.robot_id {
            blackboard.set_command(robot_id, RobotCommand::halt());
        }
        blackboard.robot_id = None;
        blackboard.target_coords = None;
        Status::Success
    }
}

impl Default for BallPlacementStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for BallPlacementStrategy {
    fn name(&self) -> &str {
        "placement"
    }

    fn build_tree(&self) -> Box<dyn Behavior + Send> {
        Box::new(Selector::new(
            "placement_root",
            vec![
                Box::new(Sequence::new(
                    "idle",
                    vec![
                        Box::new(Inverter::new(
                            "no_placement_ordered",
                            Box::new(Condition::new("placement_ordered", |ctx, _| {
                                Self::placement_target(&ctx.game.current).is_some()
                            })),
                        )),
                        Box::new(Action::new("halt_all", Self::halt_all)),
                    ],
                )),
                Box::new(Sequence::with_memory(
                    "place_ball",
                    vec![
                        Box::new(Action::new("select_placer", Self::select_placer)),
                        Box::new(Action::new("approach_ball", Self::approach_ball)),
                        Box::new(Action::new("carry_to_target", Self::carry_to_target)),
                        Box::new(Action::new("release", Self::release)),
                    ],
                )),
            ],
        ))
    }

    fn check_expected_robots(
        &self,
        _n_friendly: usize,
        _n_enemy: usize,
    ) -> Result<(), ConfigError> {
        // Any squad size works; only one robot ever moves.
        Ok(())
    }

    fn default_action(
        &self,
        _ctx: &TickContext,
        _role: Role,
        _robot_id: u8,
    ) -> Option<RobotCommand> {
        Some(RobotCommand::halt())
    }
}
