use crate::entities::GameFrame;
use crate::referee::rules::{RefereeRule, RuleKind, RuleViolation};
use crate::referee::{RefereeCommand, RefereeGeometry};

/// Detects attacker encroachment and crowded defense areas.
pub struct DefenseAreaRule {
    max_defenders: usize,
    attacker_infringement: bool,
}

impl DefenseAreaRule {
    pub fn new(max_defenders: usize, attacker_infringement: bool) -> Self {
        DefenseAreaRule {
            max_defenders,
            attacker_infringement,
        }
    }
}

impl RefereeRule for DefenseAreaRule {
    fn check(
        &mut self,
        frame: &GameFrame,
        geometry: &RefereeGeometry,
        current_command: RefereeCommand,
    ) -> Option<RuleViolation> {
        if !current_command.is_active_play() {
            return None;
        }

        let in_my_defense = |x: f32, y: f32| {
            if frame.my_team_is_right {
                geometry.is_in_right_defense_area(x, y)
            } else {
                geometry.is_in_left_defense_area(x, y)
            }
        };

        // Too many friendly defenders in our own area: opponent free kick.
        let n_friendly_in_own = frame
            .friendly_robots
            .values()
            .filter(|r| in_my_defense(r.position.x, r.position.y))
            .count();
        if n_friendly_in_own > self.max_defenders {
            return Some(RuleViolation {
                kind: RuleKind::DefenseArea,
                suggested_command: RefereeCommand::Stop,
                next_command: Some(RefereeCommand::direct_free(!frame.my_team_is_yellow)),
                status_message: "Too many defenders in own area".to_string(),
                designated_position: None,
            });
        }

        // Enemy attacker inside our area: defending team free kick.
        if self.attacker_infringement {
            let intruder = frame
                .enemy_robots
                .values()
                .find(|r| in_my_defense(r.position.x, r.position.y));
            if intruder.is_some() {
                return Some(RuleViolation {
                    kind: RuleKind::DefenseArea,
                    suggested_command: RefereeCommand::Stop,
                    next_command: Some(RefereeCommand::direct_free(frame.my_team_is_yellow)),
                    status_message: "Attacker in defense area".to_string(),
                    designated_position: None,
                });
            }
        }

        None
    }
}
