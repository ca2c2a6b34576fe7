use crate::behavior::{Behavior, TickContext};
use crate::entities::RobotCommand;
use crate::error::ConfigError;
use crate::strategy::{BallPlacementStrategy, FormationStrategy, Role};

/// One team's decision logic: a behaviour tree plus the fallback used for
/// robots the tree left without a command.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    /// Build this strategy's behaviour tree. Called once at startup.
    fn build_tree(&self) -> Box<dyn Behavior + Send>;

    /// Validate the configured robot counts against what the strategy can
    /// handle. 1..=6 per team is already guaranteed by the runner.
    fn check_expected_robots(&self, n_friendly: usize, n_enemy: usize)
    -> Result<(), ConfigError>;

    /// Fallback for a robot the tree assigned no command this tick.
    /// `None` means send nothing for this robot.
    fn default_action(&self, ctx: &TickContext, role: Role, robot_id: u8)
    -> Option<RobotCommand>;
}

/// Look a built-in strategy up by CLI name.
pub fn strategy_by_name(name: &str) -> Result<Box<dyn Strategy>, ConfigError> {
    match name {
        "formation" => Ok(Box::new(FormationStrategy::new())),
        "placement" => Ok(Box::new(BallPlacementStrategy::new())),
        _ => Err(ConfigError::UnknownStrategy {
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_strategy_lookup() {
        assert!(strategy_by_name("formation").is_ok());
        assert!(strategy_by_name("placement").is_ok());
        assert!(matches!(
            strategy_by_name("does_not_exist"),
            Err(ConfigError::UnknownStrategy { .. })
        ));
    }
}
