use crate::error::ConfigError;
use crate::referee::RefereeGeometry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Built-in profiles shipped with the binary.
const BUILTIN_PROFILES: [(&str, &str); 3] = [
    ("strict_ai", include_str!("profiles/strict_ai.yaml")),
    ("exhibition", include_str!("profiles/exhibition.yaml")),
    ("arcade", include_str!("profiles/arcade.yaml")),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalDetectionConfig {
    pub enabled: bool,
    pub cooldown_seconds: f64,
}

impl Default for GoalDetectionConfig {
    fn default() -> Self {
        GoalDetectionConfig {
            enabled: true,
            cooldown_seconds: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeKickAssigner {
    LastTouch,
    AlwaysYellow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutOfBoundsConfig {
    pub enabled: bool,
    pub free_kick_assigner: FreeKickAssigner,
}

impl Default for OutOfBoundsConfig {
    fn default() -> Self {
        OutOfBoundsConfig {
            enabled: true,
            free_kick_assigner: FreeKickAssigner::LastTouch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseAreaConfig {
    pub enabled: bool,
    pub max_defenders: usize,
    pub attacker_infringement: bool,
}

impl Default for DefenseAreaConfig {
    fn default() -> Self {
        DefenseAreaConfig {
            enabled: true,
            max_defenders: 1,
            attacker_infringement: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepOutConfig {
    pub enabled: bool,
    pub radius_meters: f32,
    pub violation_persistence_frames: u32,
}

impl Default for KeepOutConfig {
    fn default() -> Self {
        KeepOutConfig {
            enabled: true,
            radius_meters: 0.5,
            violation_persistence_frames: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub goal_detection: GoalDetectionConfig,
    pub out_of_bounds: OutOfBoundsConfig,
    pub defense_area: DefenseAreaConfig,
    pub keep_out: KeepOutConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KickoffTeam {
    Yellow,
    Blue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub half_duration_seconds: f64,
    pub kickoff_team: KickoffTeam,
    /// Skip PREPARE_KICKOFF and issue FORCE_START automatically after
    /// `stop_duration_seconds` in STOP. Arcade profiles only.
    pub force_start_after_goal: bool,
    pub stop_duration_seconds: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            half_duration_seconds: 300.0,
            kickoff_team: KickoffTeam::Yellow,
            force_start_after_goal: false,
            stop_duration_seconds: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefereeProfile {
    pub profile_name: String,
    #[serde(default)]
    pub geometry: RefereeGeometry,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub game: GameConfig,
}

impl RefereeProfile {
    /// Load a profile by built-in name or file path.
    pub fn load(name_or_path: &str) -> Result<RefereeProfile, ConfigError> {
        let source = match BUILTIN_PROFILES
            .iter()
            .find(|(name, _)| *name == name_or_path)
        {
            Some((_, yaml)) => yaml.to_string(),
            None => {
                let path = Path::new(name_or_path);
                std::fs::read_to_string(path).map_err(|_| ConfigError::UnknownProfile {
                    name: name_or_path.to_string(),
                })?
            }
        };

        let profile: RefereeProfile =
            serde_yaml::from_str(&source).map_err(|source| ConfigError::MalformedProfile {
                name: name_or_path.to_string(),
                source,
            })?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.goal_detection.cooldown_seconds < 0.0 {
            return Err(ConfigError::BadThreshold {
                what: format!(
                    "goal cooldown must be non-negative, got {}",
                    self.rules.goal_detection.cooldown_seconds
                ),
            });
        }
        if self.rules.keep_out.radius_meters <= 0.0 {
            return Err(ConfigError::BadThreshold {
                what: format!(
                    "keep-out radius must be positive, got {}",
                    self.rules.keep_out.radius_meters
                ),
            });
        }
        if self.rules.keep_out.violation_persistence_frames == 0 {
            return Err(ConfigError::BadThreshold {
                what: "keep-out persistence must be at least one frame".to_string(),
            });
        }
        if self.game.half_duration_seconds <= 0.0 {
            return Err(ConfigError::BadThreshold {
                what: format!(
                    "half duration must be positive, got {}",
                    self.game.half_duration_seconds
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_load() {
        for name in ["strict_ai", "exhibition", "arcade"] {
            let profile = RefereeProfile::load(name).unwrap();
            assert_eq!(profile.profile_name, name);
        }
    }

    #[test]
    fn test_unknown_profile_is_config_error() {
        assert!(matches!(
            RefereeProfile::load("no_such_profile"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn test_strict_ai_values() {
        let profile = RefereeProfile::load("strict_ai").unwrap();
        assert_eq!(profile.geometry.half_length, 4.5);
        assert!(profile.rules.out_of_bounds.enabled);
        assert_eq!(profile.rules.keep_out.violation_persistence_frames, 30);
        assert!(!profile.game.force_start_after_goal);
    }

    #[test]
    fn test_arcade_disables_out_of_bounds_and_auto_advances() {
        let profile = RefereeProfile::load("arcade").unwrap();
        assert!(!profile.rules.out_of_bounds.enabled);
        assert!(profile.game.force_start_after_goal);
        assert_eq!(profile.game.stop_duration_seconds, 2.0);
    }

    #[test]
    fn test_round_trip_is_identical() {
        for name in ["strict_ai", "exhibition", "arcade"] {
            let profile = RefereeProfile::load(name).unwrap();
            let serialized = serde_yaml::to_string(&profile).unwrap();
            let reloaded: RefereeProfile = serde_yaml::from_str(&serialized).unwrap();
            assert_eq!(profile, reloaded);
        }
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let profile: RefereeProfile =
            serde_yaml::from_str("profile_name: minimal\n").unwrap();
        assert_eq!(profile.rules, RulesConfig::default());
        assert_eq!(profile.game, GameConfig::default());
        assert_eq!(profile.geometry, RefereeGeometry::default());
    }

    #[test]
    fn test_nonsensical_threshold_rejected() {
        let mut profile = RefereeProfile::load("strict_ai").unwrap();
        profile.rules.keep_out.radius_meters = -1.0;
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::BadThreshold { .. })
        ));
    }
}
