use nalgebra::Vector3;

/// Ball state for one frame. Built by the refiners, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub acceleration: Vector3<f32>,
}

impl Ball {
    pub fn at(position: Vector3<f32>) -> Self {
        Ball {
            position,
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
        }
    }

    pub fn with_kinematics(
        position: Vector3<f32>,
        velocity: Vector3<f32>,
        acceleration: Vector3<f32>,
    ) -> Self {
        Ball {
            position,
            velocity,
            acceleration,
        }
    }
}
