use crate::referee::rules::{RuleKind, RuleViolation};
use crate::referee::{RefereeCommand, RefereeData, Stage, TeamInfo};
use log::info;

/// Minimum wall time between rule-driven state changes. Suppresses the same
/// violation being applied on consecutive frames.
const TRANSITION_COOLDOWN: f64 = 0.3;

/// Owns all mutable referee state: command, stage, score, cards. Produces a
/// fresh `RefereeData` snapshot every tick.
pub struct GameStateMachine {
    pub command: RefereeCommand,
    pub command_counter: u32,
    pub command_timestamp: f64,

    pub stage: Stage,
    stage_start_time: f64,
    stage_duration: f64,

    pub yellow_team: TeamInfo,
    pub blue_team: TeamInfo,

    pub next_command: Option<RefereeCommand>,
    pub designated_position: Option<(f32, f32)>,

    kickoff_team_is_yellow: bool,
    status_message: Option<String>,

    force_start_after_goal: bool,
    stop_duration_seconds: f64,
    stop_entered_time: f64,

    last_transition_time: f64,
}

impl GameStateMachine {
    pub fn new(
        half_duration_seconds: f64,
        kickoff_team_is_yellow: bool,
        n_robots_yellow: u8,
        n_robots_blue: u8,
        force_start_after_goal: bool,
        stop_duration_seconds: f64,
    ) -> Self {
        GameStateMachine {
            command: RefereeCommand::Halt,
            command_counter: 0,
            command_timestamp: 0.0,
            stage: Stage::NormalFirstHalfPre,
            stage_start_time: 0.0,
            stage_duration: half_duration_seconds,
            yellow_team: TeamInfo::new("Yellow", n_robots_yellow),
            blue_team: TeamInfo::new("Blue", n_robots_blue),
            next_command: None,
            designated_position: None,
            kickoff_team_is_yellow,
            status_message: None,
            force_start_after_goal,
            stop_duration_seconds,
            stop_entered_time: f64::NEG_INFINITY,
            last_transition_time: f64::NEG_INFINITY,
        }
    }

    /// Which colour takes the opening kickoff, from the profile.
    pub fn kickoff_team_is_yellow(&self) -> bool {
        self.kickoff_team_is_yellow
    }

    /// Process one tick: apply the violation unless within the transition
    /// cooldown, run the arcade auto-advance, emit a snapshot.
    pub fn step(&mut self, current_time: f64, violation: Option<&RuleViolation>) -> RefereeData {
        if let Some(violation) = violation {
            if self.can_transition(current_time) {
                self.apply_violation(violation, current_time);
            }
        }

        // Arcade mode: leave STOP for FORCE_START once the pause after a
        // goal has run its course, instead of waiting for the operator.
        if self.force_start_after_goal
            && self.command == RefereeCommand::Stop
            && matches!(
                self.next_command,
                Some(RefereeCommand::PrepareKickoffYellow | RefereeCommand::PrepareKickoffBlue)
            )
            && (current_time - self.stop_entered_time) >= self.stop_duration_seconds
        {
            self.command = RefereeCommand::ForceStart;
            self.command_counter += 1;
            self.command_timestamp = current_time;
            self.next_command = None;
            self.last_transition_time = current_time;
            info!("auto-advanced STOP -> FORCE_START after goal");
        }

        self.snapshot(current_time)
    }

    /// Manual operator override.
    pub fn set_command(&mut self, command: RefereeCommand, timestamp: f64) {
        self.command = command;
        self.command_counter += 1;
        self.command_timestamp = timestamp;

        // PRE stages advance to their active counterpart when play begins.
        if matches!(
            command,
            RefereeCommand::NormalStart | RefereeCommand::ForceStart
        ) {
            if let Some(active) = self.stage.active_counterpart() {
                self.advance_stage(active, timestamp);
            }
        }

        info!("referee command manually set to {:?}", command);
    }

    pub fn advance_stage(&mut self, new_stage: Stage, timestamp: f64) {
        info!("stage {:?} -> {:?}", self.stage, new_stage);
        self.stage = new_stage;
        self.stage_start_time = timestamp;
    }

    fn can_transition(&self, current_time: f64) -> bool {
        (current_time - self.last_transition_time) >= TRANSITION_COOLDOWN
    }

    fn apply_violation(&mut self, violation: &RuleViolation, current_time: f64) {
        if violation.kind == RuleKind::Goal {
            self.handle_goal(violation, current_time);
        } else {
            self.handle_foul(violation, current_time);
        }
        self.last_transition_time = current_time;
    }

    fn handle_goal(&mut self, violation: &RuleViolation, current_time: f64) {
        // The conceding team takes the kickoff, so the kickoff command
        // names the loser and the other colour scored.
        match violation.next_command {
            Some(RefereeCommand::PrepareKickoffBlue) => {
                self.yellow_team.increment_score();
                info!(
                    "goal by Yellow, score: Yellow {} - Blue {}",
                    self.yellow_team.score, self.blue_team.score
                );
            }
            Some(RefereeCommand::PrepareKickoffYellow) => {
                self.blue_team.increment_score();
                info!(
                    "goal by Blue, score: Yellow {} - Blue {}",
                    self.yellow_team.score, self.blue_team.score
                );
            }
            _ => {}
        }

        self.command = RefereeCommand::Stop;
        self.command_counter += 1;
        self.command_timestamp = current_time;
        self.next_command = violation.next_command;
        self.designated_position = Some((0.0, 0.0));
        self.stop_entered_time = current_time;
        self.status_message = Some(violation.status_message.clone());
    }

    fn handle_foul(&mut self, violation: &RuleViolation, current_time: f64) {
        self.command = violation.suggested_command;
        self.command_counter += 1;
        self.command_timestamp = current_time;
        self.next_command = violation.next_command;
        self.designated_position = violation.designated_position;
        self.status_message = Some(violation.status_message.clone());
        info!(
            "foul detected: {} -> {:?} (next: {:?})",
            violation.kind, violation.suggested_command, violation.next_command
        );
    }

    fn snapshot(&self, current_time: f64) -> RefereeData {
        let stage_time_left =
            (self.stage_duration - (current_time - self.stage_start_time)).max(0.0);
        RefereeData {
            source_id: "custom_referee".to_string(),
            time_sent: current_time,
            time_received: current_time,
            command: self.command,
            command_timestamp: self.command_timestamp,
            command_counter: self.command_counter,
            stage: self.stage,
            stage_time_left,
            blue_team: self.blue_team.clone(),
            yellow_team: self.yellow_team.clone(),
            designated_position: self.designated_position,
            blue_team_on_positive_half: None,
            next_command: self.next_command,
            action_time_remaining_us: None,
            status_message: self.status_message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> GameStateMachine {
        let mut sm = GameStateMachine::new(300.0, true, 3, 3, false, 3.0);
        sm.set_command(RefereeCommand::NormalStart, 0.0);
        sm
    }

    fn goal_violation(kickoff: RefereeCommand) -> RuleViolation {
        RuleViolation {
            kind: RuleKind::Goal,
            suggested_command: RefereeCommand::Stop,
            next_command: Some(kickoff),
            status_message: "Goal".to_string(),
            designated_position: Some((0.0, 0.0)),
        }
    }

    #[test]
    fn test_goal_increments_scorer_from_next_command() {
        let mut sm = machine();
        let data = sm.step(10.0, Some(&goal_violation(RefereeCommand::PrepareKickoffBlue)));
        assert_eq!(sm.yellow_team.score, 1);
        assert_eq!(sm.blue_team.score, 0);
        assert_eq!(data.command, RefereeCommand::Stop);
        assert_eq!(data.next_command, Some(RefereeCommand::PrepareKickoffBlue));
        assert_eq!(data.designated_position, Some((0.0, 0.0)));
    }

    #[test]
    fn test_goal_for_blue() {
        let mut sm = machine();
        sm.step(10.0, Some(&goal_violation(RefereeCommand::PrepareKickoffYellow)));
        assert_eq!(sm.blue_team.score, 1);
        assert_eq!(sm.yellow_team.score, 0);
    }

    #[test]
    fn test_transition_cooldown_suppresses_duplicate() {
        let mut sm = machine();
        let violation = goal_violation(RefereeCommand::PrepareKickoffBlue);
        sm.step(10.0, Some(&violation));
        sm.step(10.1, Some(&violation));
        assert_eq!(sm.yellow_team.score, 1);
        // Past the cooldown the next violation applies again.
        sm.step(10.5, Some(&violation));
        assert_eq!(sm.yellow_team.score, 2);
    }

    #[test]
    fn test_command_counter_monotone() {
        let mut sm = machine();
        let mut last = sm.command_counter;
        for t in [10.0, 10.1, 10.5, 11.0] {
            let data = sm.step(t, Some(&goal_violation(RefereeCommand::PrepareKickoffBlue)));
            assert!(data.command_counter >= last);
            last = data.command_counter;
        }
    }

    #[test]
    fn test_manual_start_advances_pre_stage() {
        let mut sm = GameStateMachine::new(300.0, true, 3, 3, false, 3.0);
        assert_eq!(sm.stage, Stage::NormalFirstHalfPre);
        sm.set_command(RefereeCommand::NormalStart, 5.0);
        assert_eq!(sm.stage, Stage::NormalFirstHalf);
        assert_eq!(sm.command, RefereeCommand::NormalStart);
    }

    #[test]
    fn test_stage_only_moves_forward_without_override() {
        let mut sm = machine();
        let before = sm.stage;
        for t in 0..50 {
            sm.step(t as f64, None);
            assert!(sm.stage >= before);
        }
    }

    #[test]
    fn test_foul_stores_designated_position() {
        let mut sm = machine();
        let violation = RuleViolation {
            kind: RuleKind::OutOfBounds,
            suggested_command: RefereeCommand::Stop,
            next_command: Some(RefereeCommand::DirectFreeBlue),
            status_message: "Ball out of bounds".to_string(),
            designated_position: Some((0.0, 2.9)),
        };
        let data = sm.step(10.0, Some(&violation));
        assert_eq!(data.command, RefereeCommand::Stop);
        assert_eq!(data.designated_position, Some((0.0, 2.9)));
        assert_eq!(data.next_command, Some(RefereeCommand::DirectFreeBlue));
    }

    #[test]
    fn test_arcade_auto_advance() {
        let mut sm = GameStateMachine::new(300.0, true, 3, 3, true, 2.0);
        sm.set_command(RefereeCommand::NormalStart, 0.0);
        sm.step(10.0, Some(&goal_violation(RefereeCommand::PrepareKickoffYellow)));
        assert_eq!(sm.command, RefereeCommand::Stop);

        // Before the stop duration elapses: still STOP.
        let data = sm.step(11.0, None);
        assert_eq!(data.command, RefereeCommand::Stop);

        // After stop_duration_seconds: FORCE_START without operator input.
        let data = sm.step(12.5, None);
        assert_eq!(data.command, RefereeCommand::ForceStart);
        assert_eq!(data.next_command, None);
    }

    #[test]
    fn test_strict_profile_stays_in_stop() {
        let mut sm = machine();
        sm.step(10.0, Some(&goal_violation(RefereeCommand::PrepareKickoffYellow)));
        let data = sm.step(70.0, None);
        assert_eq!(data.command, RefereeCommand::Stop);
    }

    #[test]
    fn test_stage_time_left_counts_down() {
        let mut sm = GameStateMachine::new(300.0, true, 3, 3, false, 3.0);
        sm.set_command(RefereeCommand::NormalStart, 0.0);
        let data = sm.step(100.0, None);
        assert!((data.stage_time_left - 200.0).abs() < 1e-6);
        let data = sm.step(500.0, None);
        assert_eq!(data.stage_time_left, 0.0);
    }
}
