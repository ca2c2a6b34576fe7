use nalgebra::{Vector2, Vector3};

pub trait VectorExtensions {
    fn length(&self) -> f32;
    fn distance_to(&self, other: &Self) -> f32;
    /// Unsigned angle between two vectors in radians, in [0, π].
    fn angle_between(&self, other: &Self) -> f32;
    /// Heading of the line from this point to `other`, in (−π, π].
    fn angle_to(&self, other: &Self) -> f32;
}

impl VectorExtensions for Vector2<f32> {
    #[inline]
    fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    fn distance_to(&self, other: &Vector2<f32>) -> f32 {
        let diff = self - other;
        diff.dot(&diff).sqrt()
    }

    fn angle_between(&self, other: &Vector2<f32>) -> f32 {
        let norm_prod = self.length() * other.length();
        if norm_prod == 0.0 {
            return 0.0;
        }
        (self.dot(other) / norm_prod).clamp(-1.0, 1.0).acos()
    }

    #[inline]
    fn angle_to(&self, other: &Vector2<f32>) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

impl VectorExtensions for Vector3<f32> {
    #[inline]
    fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    fn distance_to(&self, other: &Vector3<f32>) -> f32 {
        let diff = self - other;
        diff.dot(&diff).sqrt()
    }

    fn angle_between(&self, other: &Vector3<f32>) -> f32 {
        let norm_prod = self.length() * other.length();
        if norm_prod == 0.0 {
            return 0.0;
        }
        (self.dot(other) / norm_prod).clamp(-1.0, 1.0).acos()
    }

    #[inline]
    fn angle_to(&self, other: &Vector3<f32>) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

pub trait Vector3Projection {
    /// Project onto the field plane, dropping z.
    fn to_2d(&self) -> Vector2<f32>;
}

impl Vector3Projection for Vector3<f32> {
    #[inline]
    fn to_2d(&self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }
}

/// Wrap an angle into (−π, π].
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * std::f32::consts::PI);
    if a <= -std::f32::consts::PI {
        a += 2.0 * std::f32::consts::PI;
    } else if a > std::f32::consts::PI {
        a -= 2.0 * std::f32::consts::PI;
    }
    a
}
