use serde::{Deserialize, Serialize};

/// Game stages. PRE stages hold until play is started, at which point they
/// advance to their active counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    NormalFirstHalfPre,
    NormalFirstHalf,
    NormalHalfTime,
    NormalSecondHalfPre,
    NormalSecondHalf,
    ExtraTimeBreak,
    ExtraFirstHalfPre,
    ExtraFirstHalf,
    ExtraHalfTime,
    ExtraSecondHalfPre,
    ExtraSecondHalf,
    PenaltyShootoutBreak,
    PenaltyShootout,
    PostGame,
}

impl Stage {
    /// Active counterpart of a PRE stage, `None` for every other stage.
    pub fn active_counterpart(&self) -> Option<Stage> {
        match self {
            Stage::NormalFirstHalfPre => Some(Stage::NormalFirstHalf),
            Stage::NormalSecondHalfPre => Some(Stage::NormalSecondHalf),
            Stage::ExtraFirstHalfPre => Some(Stage::ExtraFirstHalf),
            Stage::ExtraSecondHalfPre => Some(Stage::ExtraSecondHalf),
            _ => None,
        }
    }

    pub fn is_pre(&self) -> bool {
        self.active_counterpart().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_stages_advance() {
        assert_eq!(
            Stage::NormalFirstHalfPre.active_counterpart(),
            Some(Stage::NormalFirstHalf)
        );
        assert_eq!(Stage::NormalHalfTime.active_counterpart(), None);
        assert!(Stage::ExtraSecondHalfPre.is_pre());
        assert!(!Stage::PostGame.is_pre());
    }
}
