use crate::behavior::{
    Action, Behavior, Blackboard, Condition, Selector, Sequence, Status, TickContext,
};
use crate::entities::{GameFrame, RobotCommand, TeamKind, Vector3Projection, VectorExtensions};
use crate::error::ConfigError;
use crate::strategy::skills::go_to_point;
use crate::strategy::{ATTACK_ROLES, DEFEND_ROLES, Role, Strategy, starting_formation};
use crate::behavior::Tactic;
use itertools::Itertools;
use nalgebra::Vector2;

/// Stay this far from the ball during stoppages; a little beyond the
/// keep-out circle so jitter cannot drag a robot back in.
const STOPPAGE_CLEARANCE: f32 = 0.65;

/// Built-in strategy: assigns roles, keeps the squad on its formation
/// waypoints, freezes on HALT, and backs away from the ball during
/// stoppages. Deliberately contains no shooting logic; it exists to keep a
/// team legal and positioned while skills run elsewhere.
pub struct FormationStrategy;

impl FormationStrategy {
    pub fn new() -> Self {
        FormationStrategy
    }

    fn referee_command_is_halt(frame: &GameFrame) -> bool {
        frame
            .referee
            .as_ref()
            .is_some_and(|r| r.command == crate::referee::RefereeCommand::Halt)
    }

    fn referee_command_is_stoppage(frame: &GameFrame) -> bool {
        frame
            .referee
            .as_ref()
            .is_some_and(|r| r.command.is_stoppage())
    }

    /// Sorted ids make the formation assignment stable between ticks.
    fn sorted_friendly_ids(frame: &GameFrame) -> Vec<u8> {
        frame.friendly_robots.keys().copied().sorted().collect()
    }

    fn assign_roles(ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let frame = &ctx.game.current;

        // Crude momentum read: defend while the ball is in our half.
        let ball_x = frame.ball.as_ref().map(|b| b.position.x);
        let ball_in_our_half = match ball_x {
            Some(x) => (x > 0.0) == frame.my_team_is_right,
            None => true,
        };
        let tactic = if ball_in_our_half {
            Tactic::Defend
        } else {
            Tactic::Attack
        };
        blackboard.tactic = Some(tactic);

        let table = if tactic == Tactic::Defend {
            &DEFEND_ROLES
        } else {
            &ATTACK_ROLES
        };

        blackboard.role_map.clear();
        for (slot, id) in Self::sorted_friendly_ids(frame).into_iter().enumerate() {
            let role = table.get(slot).copied().unwrap_or(Role::Unassigned);
            blackboard.role_map.insert(id, role);
        }

        // Whoever is closest to the ball presses it. The keeper never
        // leaves its line; the nearest outfield robot takes over instead.
        if let Some((key, _)) = ctx.proximity.closest_to_ball(Some(TeamKind::Friendly)) {
            let presser = if blackboard.role_of(key.id) != Role::Goalkeeper {
                Some(key.id)
            } else {
                frame.ball.as_ref().and_then(|ball| {
                    let ball_2d = ball.position.to_2d();
                    frame
                        .friendly_robots
                        .values()
                        .filter(|r| blackboard.role_of(r.id) != Role::Goalkeeper)
                        .min_by(|a, b| {
                            a.position
                                .distance_to(&ball_2d)
                                .total_cmp(&b.position.distance_to(&ball_2d))
                        })
                        .map(|r| r.id)
                })
            };
            if let Some(id) = presser {
                blackboard.role_map.insert(id, Role::Striker);
            }
        }

        Status::Success
    }

    fn formation_target(frame: &GameFrame, slot: usize, n_robots: usize) -> Option<Vector2<f32>> {
        let poses = starting_formation(frame.my_team_is_right, n_robots).ok()?;
        poses.get(slot).map(|(x, y, _)| Vector2::new(*x, *y))
    }

    fn drive_to_formation(ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let frame = &ctx.game.current;
        let ids = Self::sorted_friendly_ids(frame);
        let n_robots = ids.len();

        for (slot, id) in ids.into_iter().enumerate() {
            let Some(target) = Self::formation_target(frame, slot, n_robots) else {
                continue;
            };
            if let Some((command, _)) = go_to_point(frame, ctx.motion, id, target, &[]) {
                blackboard.set_command(id, command);
            }
        }
        Status::Running
    }

    fn keep_clear_of_ball(ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let frame = &ctx.game.current;
        let Some(ball) = frame.ball.as_ref() else {
            return Status::Failure;
        };
        let ball_2d = ball.position.to_2d();

        let ids = Self::sorted_friendly_ids(frame);
        let n_robots = ids.len();
        for (slot, id) in ids.into_iter().enumerate() {
            let Some(robot) = frame.friendly(id) else {
                continue;
            };

            let distance = robot.position.distance_to(&ball_2d);
            let target = if distance < STOPPAGE_CLEARANCE {
                // Back straight out of the keep-out circle.
                let away = robot.position - ball_2d;
                let direction = if away.norm() > 1e-6 {
                    away / away.norm()
                } else {
                    Vector2::new(-1.0, 0.0)
                };
                ball_2d + direction * STOPPAGE_CLEARANCE
            } else {
                match Self::formation_target(frame, slot, n_robots) {
                    Some(target) => target,
                    None => continue,
                }
            };

            if let Some((command, _)) = go_to_point(frame, ctx.motion, id, target, &[]) {
                blackboard.set_command(id, command);
            }
        }
        Status::Running
    }

    fn freeze_all(ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        for id in ctx.game.current.friendly_robots.keys() {
            blackboard.set_command(*id, RobotCommand::halt());
        }
        Status::Running
    }
}

impl Default for FormationStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for FormationStrategy {
    fn name(&self) -> &str {
        "formation"
    }

    fn build_tree(&self) -> Box<dyn Behavior + Send> {
        Box::new(Selector::new(
            "formation_root",
            vec![
                Box::new(Sequence::new(
                    "halted",
                    vec![
                        Box::new(Condition::new("referee_halt", |ctx, _| {
                            Self::referee_command_is_halt(&ctx.game.current)
                        })),
                        Box::new(Action::new("freeze_all", Self::freeze_all)),
                    ],
                )),
                Box::new(Sequence::new(
                    "stoppage",
                    vec![
                        Box::new(Condition::new("referee_stoppage", |ctx, _| {
                            Self::referee_command_is_stoppage(&ctx.game.current)
                        })),
                        Box::new(Action::new("assign_roles", Self::assign_roles)),
                        Box::new(Action::new("keep_clear_of_ball", Self::keep_clear_of_ball)),
                    ],
                )),
                Box::new(Sequence::new(
                    "open_play",
                    vec![
                        Box::new(Action::new("assign_roles", Self::assign_roles)),
                        Box::new(Action::new("drive_to_formation", Self::drive_to_formation)),
                    ],
                )),
            ],
        ))
    }

    fn check_expected_robots(
        &self,
        n_friendly: usize,
        _n_enemy: usize,
    ) -> Result<(), ConfigError> {
        // The formation tables cover squads up to six robots.
        starting_formation(false, n_friendly).map(|_| ())
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
