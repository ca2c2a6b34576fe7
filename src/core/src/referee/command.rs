use serde::{Deserialize, Serialize};

/// Referee commands, matching standard SSL game-controller semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefereeCommand {
    Halt,
    Stop,
    NormalStart,
    ForceStart,
    PrepareKickoffYellow,
    PrepareKickoffBlue,
    PreparePenaltyYellow,
    PreparePenaltyBlue,
    DirectFreeYellow,
    DirectFreeBlue,
    TimeoutYellow,
    TimeoutBlue,
    BallPlacementYellow,
    BallPlacementBlue,
}

impl RefereeCommand {
    /// Commands during which the ball is in active play.
    pub fn is_active_play(&self) -> bool {
        matches!(self, RefereeCommand::NormalStart | RefereeCommand::ForceStart)
    }

    /// Commands that put play on hold with a keep-out circle around the ball.
    pub fn is_stoppage(&self) -> bool {
        matches!(
            self,
            RefereeCommand::Stop
                | RefereeCommand::DirectFreeYellow
                | RefereeCommand::DirectFreeBlue
                | RefereeCommand::PrepareKickoffYellow
                | RefereeCommand::PrepareKickoffBlue
                | RefereeCommand::PreparePenaltyYellow
                | RefereeCommand::PreparePenaltyBlue
        )
    }

    /// Which colour is about to take the kick, when the command implies one.
    /// `None` for STOP (both teams must keep out) and for non-stoppage
    /// commands.
    pub fn kicking_team_is_yellow(&self) -> Option<bool> {
        match self {
            RefereeCommand::DirectFreeYellow
            | RefereeCommand::PrepareKickoffYellow
            | RefereeCommand::PreparePenaltyYellow
            | RefereeCommand::BallPlacementYellow => Some(true),
            RefereeCommand::DirectFreeBlue
            | RefereeCommand::PrepareKickoffBlue
            | RefereeCommand::PreparePenaltyBlue
            | RefereeCommand::BallPlacementBlue => Some(false),
            _ => None,
        }
    }

    pub fn direct_free(team_is_yellow: bool) -> RefereeCommand {
        if team_is_yellow {
            RefereeCommand::DirectFreeYellow
        } else {
            RefereeCommand::DirectFreeBlue
        }
    }

    pub fn prepare_kickoff(team_is_yellow: bool) -> RefereeCommand {
        if team_is_yellow {
            RefereeCommand::PrepareKickoffYellow
        } else {
            RefereeCommand::PrepareKickoffBlue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kicking_team() {
        assert_eq!(RefereeCommand::DirectFreeYellow.kicking_team_is_yellow(), Some(true));
        assert_eq!(RefereeCommand::PrepareKickoffBlue.kicking_team_is_yellow(), Some(false));
        assert_eq!(RefereeCommand::Stop.kicking_team_is_yellow(), None);
        assert_eq!(RefereeCommand::NormalStart.kicking_team_is_yellow(), None);
    }

    #[test]
    fn test_stoppage_set() {
        assert!(RefereeCommand::Stop.is_stoppage());
        assert!(RefereeCommand::DirectFreeBlue.is_stoppage());
        assert!(RefereeCommand::PreparePenaltyYellow.is_stoppage());
        assert!(!RefereeCommand::Halt.is_stoppage());
        assert!(!RefereeCommand::NormalStart.is_stoppage());
    }
}
