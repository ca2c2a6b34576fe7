pub mod defense_area;
pub mod goal;
pub mod keep_out;
pub mod out_of_bounds;

pub use defense_area::DefenseAreaRule;
pub use goal::GoalRule;
pub use keep_out::KeepOutRule;
pub use out_of_bounds::OutOfBoundsRule;

use crate::entities::GameFrame;
use crate::referee::{RefereeCommand, RefereeGeometry};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Goal,
    OutOfBounds,
    DefenseArea,
    KeepOut,
}

impl Display for RuleKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            RuleKind::Goal => write!(f, "goal"),
            RuleKind::OutOfBounds => write!(f, "out_of_bounds"),
            RuleKind::DefenseArea => write!(f, "defense_area"),
            RuleKind::KeepOut => write!(f, "keep_out"),
        }
    }
}

/// A detected infringement and the appropriate referee response.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleViolation {
    pub kind: RuleKind,
    pub suggested_command: RefereeCommand,
    pub next_command: Option<RefereeCommand>,
    pub status_message: String,
    pub designated_position: Option<(f32, f32)>,
}

/// A modular referee rule. Rules may hold cooldowns or persistence
/// counters, but never references to game frames.
pub trait RefereeRule {
    /// Check the current frame for an infringement. The first rule to
    /// return a violation wins the tick.
    fn check(
        &mut self,
        frame: &GameFrame,
        geometry: &RefereeGeometry,
        current_command: RefereeCommand,
    ) -> Option<RuleViolation>;

    /// Called on every command transition so rule-local state clears.
    fn reset(&mut self) {}
}
