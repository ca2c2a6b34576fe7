use crate::entities::{GameFrame, Robot};
use crate::referee::rules::{RefereeRule, RuleKind, RuleViolation};
use crate::referee::{RefereeCommand, RefereeGeometry};

/// Offset inside the boundary for free-kick placement, metres.
const INFIELD_OFFSET: f32 = 0.1;
/// A robot closer than this to the ball plausibly touched it.
const TOUCH_DISTANCE: f32 = 0.15;

/// Fires a direct free kick for the non-touching team when the ball leaves
/// the field outside the goals.
pub struct OutOfBoundsRule {
    /// True = friendly last touched, false = enemy, `None` = unknown.
    last_touch_was_friendly: Option<bool>,
}

impl OutOfBoundsRule {
    pub fn new() -> Self {
        OutOfBoundsRule {
            last_touch_was_friendly: None,
        }
    }

    fn update_last_touch(&mut self, frame: &GameFrame, bx: f32, by: f32) {
        // The has_ball flag from the IR sensor is reliable, prefer it.
        if frame.friendly_robots.values().any(|r| r.has_ball) {
            self.last_touch_was_friendly = Some(true);
            return;
        }

        let friendly = closest_distance(frame.friendly_robots.values(), bx, by);
        let enemy = closest_distance(frame.enemy_robots.values(), bx, by);

        let (dist, is_friendly) = match (friendly, enemy) {
            (Some(f), Some(e)) if e < f => (e, false),
            (Some(f), _) => (f, true),
            (None, Some(e)) => (e, false),
            (None, None) => return,
        };

        if dist <= TOUCH_DISTANCE {
            self.last_touch_was_friendly = Some(is_friendly);
        }
    }

    fn assign_free_kick(&self, frame: &GameFrame) -> RefereeCommand {
        match self.last_touch_was_friendly {
            // Unknown last touch: deterministic tiebreak to yellow.
            None => RefereeCommand::DirectFreeYellow,
            // The non-touching team takes the kick.
            Some(friendly_touched) => {
                let kicker_is_yellow = friendly_touched != frame.my_team_is_yellow;
                RefereeCommand::direct_free(kicker_is_yellow)
            }
        }
    }

    fn nearest_infield_point(bx: f32, by: f32, geometry: &RefereeGeometry) -> (f32, f32) {
        let mut px = bx.clamp(-geometry.half_length, geometry.half_length);
        let mut py = by.clamp(-geometry.half_width, geometry.half_width);

        if bx.abs() > geometry.half_length {
            px = bx.signum() * (geometry.half_length - INFIELD_OFFSET);
        }
        if by.abs() > geometry.half_width {
            py = by.signum() * (geometry.half_width - INFIELD_OFFSET);
        }
        (px, py)
    }
}

impl Default for OutOfBoundsRule {
    fn default() -> Self {
        Self::new()
    }
}

fn closest_distance<'a>(
    robots: impl Iterator<Item = &'a Robot>,
    bx: f32,
    by: f32,
) -> Option<f32> {
    robots
        .map(|r| (r.position.x - bx).hypot(r.position.y - by))
        .min_by(f32::total_cmp)
}

impl RefereeRule for OutOfBoundsRule {
    fn check(
        &mut self,
        frame: &GameFrame,
        geometry: &RefereeGeometry,
        current_command: RefereeCommand,
    ) -> Option<RuleViolation> {
        if !current_command.is_active_play() {
            return None;
        }

        let ball = frame.ball.as_ref()?;
        let (bx, by) = (ball.position.x, ball.position.y);

        // Track the toucher on every active frame, not only when the ball
        // is already out.
        self.update_last_touch(frame, bx, by);

        if geometry.is_in_field(bx, by)
            || geometry.is_in_left_goal(bx, by)
            || geometry.is_in_right_goal(bx, by)
        {
            return None;
        }

        Some(RuleViolation {
            kind: RuleKind::OutOfBounds,
            suggested_command: RefereeCommand::Stop,
            next_command: Some(self.assign_free_kick(frame)),
            status_message: "Ball out of bounds".to_string(),
            designated_position: Some(Self::nearest_infield_point(bx, by, geometry)),
        })
    }

    fn reset(&mut self) {
        self.last_touch_was_friendly = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Ball;
    use nalgebra::{Vector2, Vector3};

    fn frame(ball_x: f32, ball_y: f32, ts: f64) -> GameFrame {
        let mut frame = GameFrame::empty(ts, true, false);
        frame.ball = Some(Ball::at(Vector3::new(ball_x, ball_y, 0.0)));
        frame
    }

    #[test]
    fn test_ball_out_top_fires() {
        let mut rule = OutOfBoundsRule::new();
        let geo = RefereeGeometry::default();
        let v = rule
            .check(&frame(0.0, 3.5, 10.0), &geo, RefereeCommand::NormalStart)
            .unwrap();
        assert_eq!(v.kind, RuleKind::OutOfBounds);
        assert_eq!(v.suggested_command, RefereeCommand::Stop);
    }

    #[test]
    fn test_ball_in_field_or_goal_does_not_fire() {
        let mut rule = OutOfBoundsRule::new();
        let geo = RefereeGeometry::default();
        assert!(rule
            .check(&frame(0.0, 0.0, 10.0), &geo, RefereeCommand::NormalStart)
            .is_none());
        // The goal rule owns this case.
        assert!(rule
            .check(&frame(5.0, 0.0, 10.0), &geo, RefereeCommand::NormalStart)
            .is_none());
    }

    #[test]
    fn test_free_kick_goes_to_non_touching_team() {
        let mut rule = OutOfBoundsRule::new();
        let geo = RefereeGeometry::default();

        // Friendly yellow robot carries the ball near the corner at 9.9 s.
        let mut touch_frame = frame(4.4, 2.9, 9.9);
        touch_frame.friendly_robots.insert(
            0,
            Robot::at(0, true, Vector2::new(4.4, 2.9), 0.0).with_ball(),
        );
        assert!(rule
            .check(&touch_frame, &geo, RefereeCommand::NormalStart)
            .is_none());

        // Ball crosses the top boundary at 10.0 s.
        let v = rule
            .check(&frame(0.0, 3.5, 10.0), &geo, RefereeCommand::NormalStart)
            .unwrap();
        assert_eq!(v.next_command, Some(RefereeCommand::DirectFreeBlue));
        assert_eq!(v.designated_position, Some((0.0, 2.9)));
    }

    #[test]
    fn test_unknown_toucher_defaults_to_yellow() {
        let mut rule = OutOfBoundsRule::new();
        let geo = RefereeGeometry::default();
        let v = rule
            .check(&frame(0.0, 3.5, 10.0), &geo, RefereeCommand::NormalStart)
            .unwrap();
        assert_eq!(v.next_command, Some(RefereeCommand::DirectFreeYellow));
    }

    #[test]
    fn test_proximity_based_last_touch() {
        let mut rule = OutOfBoundsRule::new();
        let geo = RefereeGeometry::default();

        // Enemy robot within touch distance, no has_ball flag anywhere.
        let mut touch_frame = frame(2.0, 2.0, 9.9);
        touch_frame
            .enemy_robots
            .insert(3, Robot::at(3, false, Vector2::new(2.1, 2.0), 0.0));
        rule.check(&touch_frame, &geo, RefereeCommand::NormalStart);

        // Enemy touched, frame team is yellow: yellow takes the kick.
        let v = rule
            .check(&frame(0.0, -3.4, 10.0), &geo, RefereeCommand::NormalStart)
            .unwrap();
        assert_eq!(v.next_command, Some(RefereeCommand::DirectFreeYellow));
    }

    #[test]
    fn test_designated_position_strictly_infield() {
        let mut rule = OutOfBoundsRule::new();
        let geo = RefereeGeometry::default();
        for (bx, by) in [(0.0, 3.5), (0.0, -4.0), (5.0, 2.0), (-5.1, -2.2)] {
            let v = rule
                .check(&frame(bx, by, 10.0), &geo, RefereeCommand::NormalStart)
                .unwrap();
            let (px, py) = v.designated_position.unwrap();
            assert!(px.abs() <= geo.half_length - INFIELD_OFFSET + 1e-6);
            assert!(py.abs() <= geo.half_width - INFIELD_OFFSET + 1e-6);
        }
    }

    #[test]
    fn test_reset_clears_last_touch() {
        let mut rule = OutOfBoundsRule::new();
        let geo = RefereeGeometry::default();
        let mut touch_frame = frame(1.0, 1.0, 9.0);
        touch_frame
            .friendly_robots
            .insert(0, Robot::at(0, true, Vector2::new(1.0, 1.0), 0.0).with_ball());
        rule.check(&touch_frame, &geo, RefereeCommand::NormalStart);

        rule.reset();
        let v = rule
            .check(&frame(0.0, 3.5, 10.0), &geo, RefereeCommand::NormalStart)
            .unwrap();
        // Unknown again after the reset: defaults to yellow.
        assert_eq!(v.next_command, Some(RefereeCommand::DirectFreeYellow));
    }
}
