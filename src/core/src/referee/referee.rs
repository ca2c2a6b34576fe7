use crate::entities::GameFrame;
use crate::error::ConfigError;
use crate::referee::rules::{
    DefenseAreaRule, GoalRule, KeepOutRule, OutOfBoundsRule, RefereeRule, RuleViolation,
};
use crate::referee::{
    GameStateMachine, KickoffTeam, RefereeCommand, RefereeData, RefereeGeometry, RefereeProfile,
    RulesConfig,
};
use log::debug;

/// Construct the ordered list of active rules from the profile.
/// Priority order: goal, out of bounds, defense area, keep out.
fn build_active_rules(rules: &RulesConfig) -> Vec<Box<dyn RefereeRule + Send>> {
    let mut active: Vec<Box<dyn RefereeRule + Send>> = Vec::new();

    if rules.goal_detection.enabled {
        active.push(Box::new(GoalRule::new(rules.goal_detection.cooldown_seconds)));
    }
    if rules.out_of_bounds.enabled {
        active.push(Box::new(OutOfBoundsRule::new()));
    }
    if rules.defense_area.enabled {
        active.push(Box::new(DefenseAreaRule::new(
            rules.defense_area.max_defenders,
            rules.defense_area.attacker_infringement,
        )));
    }
    if rules.keep_out.enabled {
        active.push(Box::new(KeepOutRule::new(
            rules.keep_out.radius_meters,
            rules.keep_out.violation_persistence_frames,
        )));
    }

    active
}

/// Rule-driven referee that operates on validated game frames. Works
/// uniformly across real, grSim, and RSim modes because it never touches a
/// receiver or simulator handle.
pub struct CustomReferee {
    geometry: RefereeGeometry,
    rules: Vec<Box<dyn RefereeRule + Send>>,
    state: GameStateMachine,
}

impl CustomReferee {
    pub fn new(profile: &RefereeProfile, n_robots_yellow: u8, n_robots_blue: u8) -> Self {
        CustomReferee {
            geometry: profile.geometry,
            rules: build_active_rules(&profile.rules),
            state: GameStateMachine::new(
                profile.game.half_duration_seconds,
                profile.game.kickoff_team == KickoffTeam::Yellow,
                n_robots_yellow,
                n_robots_blue,
                profile.game.force_start_after_goal,
                profile.game.stop_duration_seconds,
            ),
        }
    }

    /// Load the profile by built-in name or file path, then construct.
    pub fn from_profile_name(
        name: &str,
        n_robots_yellow: u8,
        n_robots_blue: u8,
    ) -> Result<Self, ConfigError> {
        let profile = RefereeProfile::load(name)?;
        Ok(Self::new(&profile, n_robots_yellow, n_robots_blue))
    }

    /// Evaluate all rules and advance the state machine by one tick. The
    /// first matching rule in priority order wins; the rest are skipped.
    pub fn step(&mut self, frame: &GameFrame, current_time: f64) -> RefereeData {
        let current_command = self.state.command;

        let mut violation: Option<RuleViolation> = None;
        for rule in self.rules.iter_mut() {
            if let Some(found) = rule.check(frame, &self.geometry, current_command) {
                violation = Some(found);
                break;
            }
        }

        // Every rule clears its local state once any rule fires.
        if let Some(violation) = &violation {
            debug!("rule fired: {} ({})", violation.kind, violation.status_message);
            for rule in self.rules.iter_mut() {
                rule.reset();
            }
        }

        self.state.step(current_time, violation.as_ref())
    }

    /// Manual operator override, also used by test scripting.
    pub fn set_command(&mut self, command: RefereeCommand, timestamp: f64) {
        self.state.set_command(command, timestamp);
    }

    pub fn geometry(&self) -> &RefereeGeometry {
        &self.geometry
    }

    pub fn current_command(&self) -> RefereeCommand {
        self.state.command
    }
}
