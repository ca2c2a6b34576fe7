use crate::referee::{RefereeCommand, Stage, TeamInfo};

/// One referee snapshot, emitted every tick by the custom referee or
/// received from an upstream game controller.
#[derive(Debug, Clone, PartialEq)]
pub struct RefereeData {
    pub source_id: String,
    pub time_sent: f64,
    pub time_received: f64,
    pub command: RefereeCommand,
    pub command_timestamp: f64,
    pub command_counter: u32,
    pub stage: Stage,
    pub stage_time_left: f64,
    pub blue_team: TeamInfo,
    pub yellow_team: TeamInfo,
    /// Where the ball must be placed before play resumes.
    pub designated_position: Option<(f32, f32)>,
    /// True when the blue goal sits on the positive x half.
    pub blue_team_on_positive_half: Option<bool>,
    /// Command that follows the current stoppage.
    pub next_command: Option<RefereeCommand>,
    /// Microseconds until the current action times out; may go negative.
    pub action_time_remaining_us: Option<i64>,
    /// Human-readable reason for the last transition. Excluded from
    /// `same_state` so it never triggers a spurious re-record.
    pub status_message: Option<String>,
}

impl RefereeData {
    /// Equality over the stable fields only. The refiner records a new
    /// snapshot exactly when this changes.
    pub fn same_state(&self, other: &RefereeData) -> bool {
        self.command == other.command
            && self.command_timestamp == other.command_timestamp
            && self.command_counter == other.command_counter
            && self.stage == other.stage
            && self.blue_team == other.blue_team
            && self.yellow_team == other.yellow_team
            && self.designated_position == other.designated_position
            && self.blue_team_on_positive_half == other.blue_team_on_positive_half
            && self.next_command == other.next_command
            && self.action_time_remaining_us == other.action_time_remaining_us
    }
}
