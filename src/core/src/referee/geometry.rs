use serde::{Deserialize, Serialize};

/// Immutable field dimensions used by the rule checkers. All measurements
/// are in metres, standard SSL coordinates (origin at centre, +x toward the
/// right goal, +y toward the top of the field).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefereeGeometry {
    pub half_length: f32,
    pub half_width: f32,
    pub half_goal_width: f32,
    pub half_defense_length: f32,
    pub half_defense_width: f32,
    pub center_circle_radius: f32,
}

impl Default for RefereeGeometry {
    /// Standard SSL Division B field.
    fn default() -> Self {
        RefereeGeometry {
            half_length: 4.5,
            half_width: 3.0,
            half_goal_width: 0.5,
            half_defense_length: 0.5,
            half_defense_width: 1.0,
            center_circle_radius: 0.5,
        }
    }
}

impl RefereeGeometry {
    /// True if (x, y) is within the playing field, boundary included.
    pub fn is_in_field(&self, x: f32, y: f32) -> bool {
        x.abs() <= self.half_length && y.abs() <= self.half_width
    }

    /// True once the ball has crossed the left goal line inside the goal.
    pub fn is_in_left_goal(&self, x: f32, y: f32) -> bool {
        x < -self.half_length && y.abs() < self.half_goal_width
    }

    /// True once the ball has crossed the right goal line inside the goal.
    pub fn is_in_right_goal(&self, x: f32, y: f32) -> bool {
        x > self.half_length && y.abs() < self.half_goal_width
    }

    pub fn is_in_left_defense_area(&self, x: f32, y: f32) -> bool {
        x <= -self.half_length + 2.0 * self.half_defense_length
            && y.abs() <= self.half_defense_width
    }

    pub fn is_in_right_defense_area(&self, x: f32, y: f32) -> bool {
        x >= self.half_length - 2.0 * self.half_defense_length
            && y.abs() <= self.half_defense_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_containment() {
        let geo = RefereeGeometry::default();
        assert!(geo.is_in_field(0.0, 0.0));
        assert!(geo.is_in_field(4.5, 3.0));
        assert!(!geo.is_in_field(4.6, 0.0));
        assert!(!geo.is_in_field(0.0, -3.1));
    }

    #[test]
    fn test_goal_regions() {
        let geo = RefereeGeometry::default();
        assert!(geo.is_in_right_goal(5.0, 0.0));
        assert!(!geo.is_in_right_goal(5.0, 1.0)); // wide of the posts
        assert!(geo.is_in_left_goal(-5.0, -0.4));
        assert!(!geo.is_in_left_goal(-4.4, 0.0)); // still on the field
    }

    #[test]
    fn test_defense_areas() {
        let geo = RefereeGeometry::default();
        assert!(geo.is_in_left_defense_area(-4.3, 0.5));
        assert!(!geo.is_in_left_defense_area(-3.0, 0.5));
        assert!(geo.is_in_right_defense_area(4.3, -0.9));
        assert!(!geo.is_in_right_defense_area(4.3, -1.5));
    }
}
