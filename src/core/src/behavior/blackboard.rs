use crate::entities::RobotCommand;
use crate::strategy::Role;
use nalgebra::Vector2;
use std::collections::HashMap;

/// Which strategy a blackboard belongs to. Each side gets its own instance,
/// so nodes of one strategy can never read or clobber the other's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    My,
    Opponent,
}

/// Per-tick tactic choice written by the analysis part of a tree and read
/// by the execution part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tactic {
    Attack,
    Defend,
    HoldFormation,
}

/// Shared state of one behaviour tree. One field per key; what a node may
/// touch is decided by the signatures it is given, not by runtime
/// registration.
pub struct Blackboard {
    pub namespace: Namespace,

    /// Command written per friendly robot this tick; `None` means the
    /// strategy's default action applies.
    pub cmd_map: HashMap<u8, Option<RobotCommand>>,
    /// Role assigned per friendly robot.
    pub role_map: HashMap<u8, Role>,

    // Per-strategy scratch, reset or overwritten by the tree itself.
    pub robot_id: Option<u8>,
    pub target_coords: Option<Vector2<f32>>,
    pub target_orientation: Option<f32>,
    pub best_shot: Option<Vector2<f32>>,
    pub dribbled_distance: f32,
    pub tactic: Option<Tactic>,
}

impl Blackboard {
    pub fn new(namespace: Namespace) -> Self {
        Blackboard {
            namespace,
            cmd_map: HashMap::new(),
            role_map: HashMap::new(),
            robot_id: None,
            target_coords: None,
            target_orientation: None,
            best_shot: None,
            dribbled_distance: 0.0,
            tactic: None,
        }
    }

    /// Reset the command map so every known friendly robot has an empty
    /// slot. Called by the runner before each tick.
    pub fn reset_cmd_map(&mut self, robot_ids: impl Iterator<Item = u8>) {
        self.cmd_map.clear();
        for id in robot_ids {
            self.cmd_map.insert(id, None);
        }
    }

    pub fn set_command(&mut self, robot_id: u8, command: RobotCommand) {
        self.cmd_map.insert(robot_id, Some(command));
    }

    pub fn role_of(&self, robot_id: u8) -> Role {
        self.role_map.get(&robot_id).copied().unwrap_or(Role::Unassigned)
    }
}
