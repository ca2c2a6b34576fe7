use crate::entities::GameFrame;
use crate::referee::rules::{RefereeRule, RuleKind, RuleViolation};
use crate::referee::{RefereeCommand, RefereeGeometry};

/// Detects the ball crossing a goal line, with a cooldown that suppresses
/// the same goal being reported on consecutive frames.
pub struct GoalRule {
    cooldown_seconds: f64,
    last_goal_time: f64,
}

impl GoalRule {
    pub fn new(cooldown_seconds: f64) -> Self {
        GoalRule {
            cooldown_seconds,
            last_goal_time: f64::NEG_INFINITY,
        }
    }

    fn violation(scorer_is_yellow: bool) -> RuleViolation {
        // The conceding team takes the kickoff.
        let (message, kickoff) = if scorer_is_yellow {
            ("Goal by Yellow", RefereeCommand::PrepareKickoffBlue)
        } else {
            ("Goal by Blue", RefereeCommand::PrepareKickoffYellow)
        };
        RuleViolation {
            kind: RuleKind::Goal,
            suggested_command: RefereeCommand::Stop,
            next_command: Some(kickoff),
            status_message: message.to_string(),
            designated_position: Some((0.0, 0.0)),
        }
    }
}

impl RefereeRule for GoalRule {
    fn check(
        &mut self,
        frame: &GameFrame,
        geometry: &RefereeGeometry,
        current_command: RefereeCommand,
    ) -> Option<RuleViolation> {
        if !current_command.is_active_play() {
            return None;
        }

        let ball = frame.ball.as_ref()?;
        let current_time = frame.timestamp;
        if current_time - self.last_goal_time < self.cooldown_seconds {
            return None;
        }

        let (bx, by) = (ball.position.x, ball.position.y);
        // Which colour defends which goal, from the frame's perspective:
        // yellow defends the right goal iff the two flags agree.
        let yellow_is_right = frame.my_team_is_right == frame.my_team_is_yellow;

        if geometry.is_in_right_goal(bx, by) {
            self.last_goal_time = current_time;
            // The team defending the right side conceded.
            return Some(Self::violation(!yellow_is_right));
        }

        if geometry.is_in_left_goal(bx, by) {
            self.last_goal_time = current_time;
            return Some(Self::violation(yellow_is_right));
        }

        None
    }

    fn reset(&mut self) {
        // last_goal_time survives resets so the cooldown keeps suppressing
        // duplicates across the command transition.
    }
}
