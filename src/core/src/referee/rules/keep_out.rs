use crate::entities::{GameFrame, Robot};
use crate::referee::rules::{RefereeRule, RuleKind, RuleViolation};
use crate::referee::{RefereeCommand, RefereeGeometry};

/// Enforces the minimum distance to the ball during stoppages. A violation
/// is only issued after `persistence_frames` consecutive frames of
/// encroachment, which filters transient positions out.
pub struct KeepOutRule {
    radius_meters: f32,
    persistence_frames: u32,
    violation_count: u32,
}

impl KeepOutRule {
    pub fn new(radius_meters: f32, persistence_frames: u32) -> Self {
        KeepOutRule {
            radius_meters,
            persistence_frames,
            violation_count: 0,
        }
    }

    fn any_encroaching<'a>(
        &self,
        mut robots: impl Iterator<Item = &'a Robot>,
        bx: f32,
        by: f32,
    ) -> bool {
        robots.any(|r| (r.position.x - bx).hypot(r.position.y - by) < self.radius_meters)
    }
}

impl RefereeRule for KeepOutRule {
    fn check(
        &mut self,
        frame: &GameFrame,
        _geometry: &RefereeGeometry,
        current_command: RefereeCommand,
    ) -> Option<RuleViolation> {
        if !current_command.is_stoppage() {
            self.violation_count = 0;
            return None;
        }

        let ball = match frame.ball.as_ref() {
            Some(ball) => ball,
            None => {
                self.violation_count = 0;
                return None;
            }
        };
        let (bx, by) = (ball.position.x, ball.position.y);

        // The kicking team is exempt; during STOP both teams must stay back.
        let kicking_team_is_yellow = current_command.kicking_team_is_yellow();
        let encroaching = match kicking_team_is_yellow {
            None => {
                self.any_encroaching(frame.friendly_robots.values(), bx, by)
                    || self.any_encroaching(frame.enemy_robots.values(), bx, by)
            }
            Some(yellow_kicks) if yellow_kicks == frame.my_team_is_yellow => {
                self.any_encroaching(frame.enemy_robots.values(), bx, by)
            }
            Some(_) => self.any_encroaching(frame.friendly_robots.values(), bx, by),
        };

        if encroaching {
            self.violation_count += 1;
        } else {
            self.violation_count = 0;
        }

        if self.violation_count >= self.persistence_frames {
            self.violation_count = 0;
            // The originally kicking team keeps the kick; yellow for STOP.
            let next = RefereeCommand::direct_free(kicking_team_is_yellow.unwrap_or(true));
            return Some(RuleViolation {
                kind: RuleKind::KeepOut,
                suggested_command: RefereeCommand::Stop,
                next_command: Some(next),
                status_message: "Keep-out circle violation".to_string(),
                designated_position: None,
            });
        }

        None
    }

    fn reset(&mut self) {
        self.violation_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Ball;
    use nalgebra::{Vector2, Vector3};

    fn encroaching_frame() -> GameFrame {
        let mut frame = GameFrame::empty(10.0, true, false);
        frame.ball = Some(Ball::at(Vector3::zeros()));
        frame
            .friendly_robots
            .insert(0, Robot::at(0, true, Vector2::new(0.2, 0.0), 0.0));
        frame
    }

    #[test]
    fn test_no_trigger_before_persistence_threshold() {
        let mut rule = KeepOutRule::new(0.5, 5);
        let geo = RefereeGeometry::default();
        let frame = encroaching_frame();
        // Enemy (blue) is kicking, friendly must keep out.
        for _ in 0..4 {
            assert!(rule.check(&frame, &geo, RefereeCommand::DirectFreeBlue).is_none());
        }
    }

    #[test]
    fn test_triggers_on_persistence_threshold_and_resets() {
        let mut rule = KeepOutRule::new(0.5, 5);
        let geo = RefereeGeometry::default();
        let frame = encroaching_frame();
        let mut v = None;
        for _ in 0..5 {
            v = rule.check(&frame, &geo, RefereeCommand::DirectFreeBlue);
        }
        let v = v.unwrap();
        assert_eq!(v.kind, RuleKind::KeepOut);
        // Awarded back to the original kicker.
        assert_eq!(v.next_command, Some(RefereeCommand::DirectFreeBlue));
        assert_eq!(rule.violation_count, 0);
    }

    #[test]
    fn test_counter_resets_on_clean_frame() {
        let mut rule = KeepOutRule::new(0.5, 5);
        let geo = RefereeGeometry::default();
        let near = encroaching_frame();
        for _ in 0..4 {
            rule.check(&near, &geo, RefereeCommand::DirectFreeBlue);
        }

        let mut far = GameFrame::empty(10.0, true, false);
        far.ball = Some(Ball::at(Vector3::zeros()));
        far.friendly_robots
            .insert(0, Robot::at(0, true, Vector2::new(2.0, 0.0), 0.0));
        rule.check(&far, &geo, RefereeCommand::DirectFreeBlue);
        assert_eq!(rule.violation_count, 0);

        // A fresh full persistence run is required after the reset.
        let mut v = None;
        for _ in 0..5 {
            v = rule.check(&near, &geo, RefereeCommand::DirectFreeBlue);
        }
        assert!(v.is_some());
    }

    #[test]
    fn test_counter_resets_when_leaving_stoppage() {
        let mut rule = KeepOutRule::new(0.5, 5);
        let geo = RefereeGeometry::default();
        let frame = encroaching_frame();
        for _ in 0..4 {
            rule.check(&frame, &geo, RefereeCommand::DirectFreeBlue);
        }
        rule.check(&frame, &geo, RefereeCommand::NormalStart);
        assert_eq!(rule.violation_count, 0);
    }

    #[test]
    fn test_kicking_team_is_exempt() {
        let mut rule = KeepOutRule::new(0.5, 1);
        let geo = RefereeGeometry::default();
        // Friendly yellow robot near the ball, yellow is kicking.
        let frame = encroaching_frame();
        assert!(rule
            .check(&frame, &geo, RefereeCommand::DirectFreeYellow)
            .is_none());
    }

    #[test]
    fn test_stop_awards_yellow_and_checks_both_teams() {
        let mut rule = KeepOutRule::new(0.5, 1);
        let geo = RefereeGeometry::default();
        let mut frame = GameFrame::empty(10.0, true, false);
        frame.ball = Some(Ball::at(Vector3::zeros()));
        frame
            .enemy_robots
            .insert(1, Robot::at(1, false, Vector2::new(0.1, 0.1), 0.0));
        let v = rule.check(&frame, &geo, RefereeCommand::Stop).unwrap();
        assert_eq!(v.next_command, Some(RefereeCommand::DirectFreeYellow));
    }
}
