use nalgebra::Vector2;

/// Robot state for one frame. Orientation is in radians, wrapped into [−π, π].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Robot {
    pub id: u8,
    pub is_friendly: bool,
    pub has_ball: bool,
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub acceleration: Vector2<f32>,
    pub orientation: f32,
}

impl Robot {
    pub fn at(id: u8, is_friendly: bool, position: Vector2<f32>, orientation: f32) -> Self {
        Robot {
            id,
            is_friendly,
            has_ball: false,
            position,
            velocity: Vector2::zeros(),
            acceleration: Vector2::zeros(),
            orientation,
        }
    }

    pub fn with_ball(mut self) -> Self {
        self.has_ball = true;
        self
    }
}
