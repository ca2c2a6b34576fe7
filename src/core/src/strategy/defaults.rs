use crate::error::ConfigError;
use crate::strategy::Role;
use std::f32::consts::PI;

/// Starting pose per robot id: (x, y, orientation).
pub type StartPose = (f32, f32, f32);

/// Starting formation when defending the right goal.
pub const RIGHT_START: [StartPose; 6] = [
    (4.2, 0.0, PI),
    (3.4, -0.2, PI),
    (3.4, 0.2, PI),
    (0.7, 0.0, PI),
    (0.7, 2.25, PI),
    (0.7, -2.25, PI),
];

/// Starting formation when defending the left goal.
pub const LEFT_START: [StartPose; 6] = [
    (-4.2, 0.0, 0.0),
    (-3.4, 0.2, 0.0),
    (-3.4, -0.2, 0.0),
    (-0.7, 0.0, 0.0),
    (-0.7, -2.25, 0.0),
    (-0.7, 2.25, 0.0),
];

/// Attacking role split for a full squad.
pub const ATTACK_ROLES: [Role; 6] = [
    Role::Goalkeeper,
    Role::Defender,
    Role::Defender,
    Role::Midfielder,
    Role::Striker,
    Role::Striker,
];

/// Defending role split for a full squad.
pub const DEFEND_ROLES: [Role; 6] = [
    Role::Goalkeeper,
    Role::Defender,
    Role::Defender,
    Role::Defender,
    Role::Defender,
    Role::Striker,
];

/// Starting poses for the first `n_robots` robots of a team.
pub fn starting_formation(
    my_team_is_right: bool,
    n_robots: usize,
) -> Result<&'static [StartPose], ConfigError> {
    let table: &[StartPose] = if my_team_is_right {
        &RIGHT_START
    } else {
        &LEFT_START
    };
    if n_robots == 0 || n_robots > table.len() {
        return Err(ConfigError::MissingFormation { n_robots });
    }
    Ok(&table[..n_robots])
}
