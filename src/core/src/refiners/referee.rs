use crate::entities::GameFrame;
use crate::referee::{RefereeCommand, RefereeData, Stage, TeamInfo};

/// Append-only referee history, deduplicated on the stable fields, plus the
/// per-command predicates the behaviour trees branch on.
pub struct RefereeRefiner {
    records: Vec<RefereeData>,
}

impl RefereeRefiner {
    pub fn new() -> Self {
        RefereeRefiner {
            records: Vec::new(),
        }
    }

    /// Record a snapshot unless it matches the latest one, then attach the
    /// latest snapshot to the frame.
    pub fn refine(&mut self, mut frame: GameFrame, data: Option<RefereeData>) -> GameFrame {
        if let Some(data) = data {
            self.add(data);
        }
        frame.referee = self.latest().cloned();
        frame
    }

    pub fn add(&mut self, data: RefereeData) {
        match self.records.last() {
            Some(last) if last.same_state(&data) => {}
            _ => self.records.push(data),
        }
    }

    pub fn latest(&self) -> Option<&RefereeData> {
        self.records.last()
    }

    pub fn records(&self) -> &[RefereeData] {
        &self.records
    }

    pub fn last_command(&self) -> RefereeCommand {
        self.latest().map_or(RefereeCommand::Halt, |r| r.command)
    }

    pub fn stage(&self) -> Stage {
        self.latest().map_or(Stage::NormalFirstHalfPre, |r| r.stage)
    }

    pub fn next_command(&self) -> Option<RefereeCommand> {
        self.latest().and_then(|r| r.next_command)
    }

    pub fn designated_position(&self) -> Option<(f32, f32)> {
        self.latest().and_then(|r| r.designated_position)
    }

    pub fn yellow_team(&self) -> Option<&TeamInfo> {
        self.latest().map(|r| &r.yellow_team)
    }

    pub fn blue_team(&self) -> Option<&TeamInfo> {
        self.latest().map(|r| &r.blue_team)
    }

    pub fn is_halt(&self) -> bool {
        self.last_command() == RefereeCommand::Halt
    }

    pub fn is_stop(&self) -> bool {
        self.last_command() == RefereeCommand::Stop
    }

    pub fn is_normal_start(&self) -> bool {
        self.last_command() == RefereeCommand::NormalStart
    }

    pub fn is_force_start(&self) -> bool {
        self.last_command() == RefereeCommand::ForceStart
    }

    pub fn is_prepare_kickoff_yellow(&self) -> bool {
        self.last_command() == RefereeCommand::PrepareKickoffYellow
    }

    pub fn is_prepare_kickoff_blue(&self) -> bool {
        self.last_command() == RefereeCommand::PrepareKickoffBlue
    }

    pub fn is_prepare_penalty_yellow(&self) -> bool {
        self.last_command() == RefereeCommand::PreparePenaltyYellow
    }

    pub fn is_prepare_penalty_blue(&self) -> bool {
        self.last_command() == RefereeCommand::PreparePenaltyBlue
    }

    pub fn is_direct_free_yellow(&self) -> bool {
        self.last_command() == RefereeCommand::DirectFreeYellow
    }

    pub fn is_direct_free_blue(&self) -> bool {
        self.last_command() == RefereeCommand::DirectFreeBlue
    }

    pub fn is_timeout_yellow(&self) -> bool {
        self.last_command() == RefereeCommand::TimeoutYellow
    }

    pub fn is_timeout_blue(&self) -> bool {
        self.last_command() == RefereeCommand::TimeoutBlue
    }

    pub fn is_ball_placement_yellow(&self) -> bool {
        self.last_command() == RefereeCommand::BallPlacementYellow
    }

    pub fn is_ball_placement_blue(&self) -> bool {
        self.last_command() == RefereeCommand::BallPlacementBlue
    }
}

impl Default for RefereeRefiner {
    fn default() -> Self {
        Self::new()
    }
}
