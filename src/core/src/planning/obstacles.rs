use crate::planning::geometry::AxisAlignedRectangle;
use nalgebra::Vector2;

/// A temporary keep-out region, e.g. a defense area or the stoppage circle
/// around the ball. The polygon keeps the precise outline; the bounding
/// rectangle is what the per-frame clearance checks use.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleRegion {
    pub polygon: Vec<Vector2<f32>>,
    pub rect: AxisAlignedRectangle,
}

impl ObstacleRegion {
    pub fn from_polygon(polygon: Vec<Vector2<f32>>) -> Self {
        debug_assert!(polygon.len() >= 3, "obstacle polygon needs at least 3 vertices");
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for p in &polygon {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        ObstacleRegion {
            polygon,
            rect: AxisAlignedRectangle::new(min_x, max_x, min_y, max_y),
        }
    }

    pub fn from_rect(rect: AxisAlignedRectangle) -> Self {
        ObstacleRegion {
            polygon: rect.corners().to_vec(),
            rect,
        }
    }
}
