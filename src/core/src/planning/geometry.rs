use nalgebra::Vector2;

/// Numeric geometry helpers for the planning stack. These stay allocation
/// free because they run inside the per-frame evaluation loop.

const EPSILON: f32 = 1e-9;

/// Minimal Euclidean distance between a point and a closed line segment.
pub fn point_segment_distance(
    point: Vector2<f32>,
    start: Vector2<f32>,
    end: Vector2<f32>,
) -> f32 {
    let segment = end - start;
    let denom = segment.dot(&segment);

    if denom < EPSILON {
        // Degenerate segment (start == end).
        return (point - start).norm();
    }

    let t = ((point - start).dot(&segment) / denom).clamp(0.0, 1.0);
    let projection = start + segment * t;
    (point - projection).norm()
}

fn orientation(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> bool {
    a.x.min(c.x) - EPSILON <= b.x
        && b.x <= a.x.max(c.x) + EPSILON
        && a.y.min(c.y) - EPSILON <= b.y
        && b.y <= a.y.max(c.y) + EPSILON
}

/// True if the two closed segments intersect.
pub fn segments_intersect(
    p1: Vector2<f32>,
    q1: Vector2<f32>,
    p2: Vector2<f32>,
    q2: Vector2<f32>,
) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if ((o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0))
        && ((o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0))
    {
        return true;
    }

    (o1.abs() <= EPSILON && on_segment(p1, p2, q1))
        || (o2.abs() <= EPSILON && on_segment(p1, q2, q1))
        || (o3.abs() <= EPSILON && on_segment(p2, p1, q2))
        || (o4.abs() <= EPSILON && on_segment(p2, q1, q2))
}

/// Shortest distance between two closed segments in 2D.
pub fn segment_to_segment_distance(
    a_start: Vector2<f32>,
    a_end: Vector2<f32>,
    b_start: Vector2<f32>,
    b_end: Vector2<f32>,
) -> f32 {
    if segments_intersect(a_start, a_end, b_start, b_end) {
        return 0.0;
    }

    point_segment_distance(a_start, b_start, b_end)
        .min(point_segment_distance(a_end, b_start, b_end))
        .min(point_segment_distance(b_start, a_start, a_end))
        .min(point_segment_distance(b_end, a_start, a_end))
}

/// Axis-aligned rectangle used as the cheap approximation of temporary
/// obstacles in the clearance checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAlignedRectangle {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl AxisAlignedRectangle {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        AxisAlignedRectangle {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn contains(&self, point: Vector2<f32>) -> bool {
        self.min_x <= point.x
            && point.x <= self.max_x
            && self.min_y <= point.y
            && point.y <= self.max_y
    }

    /// Distance from a point to the rectangle boundary; zero inside.
    pub fn distance_to_boundary(&self, point: Vector2<f32>) -> f32 {
        let dx = (self.min_x - point.x).max(0.0).max(point.x - self.max_x);
        let dy = (self.min_y - point.y).max(0.0).max(point.y - self.max_y);
        dx.hypot(dy)
    }

    pub fn corners(&self) -> [Vector2<f32>; 4] {
        [
            Vector2::new(self.min_x, self.min_y),
            Vector2::new(self.max_x, self.min_y),
            Vector2::new(self.max_x, self.max_y),
            Vector2::new(self.min_x, self.max_y),
        ]
    }

    fn edges(&self) -> [(Vector2<f32>, Vector2<f32>); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Nearest boundary point and the outward normal at that point. For
    /// interior points the nearest edge wins.
    fn nearest_boundary_point_and_normal(
        &self,
        point: Vector2<f32>,
    ) -> (Vector2<f32>, Vector2<f32>) {
        if self.contains(point) {
            let candidates = [
                (
                    point.x - self.min_x,
                    Vector2::new(-1.0, 0.0),
                    Vector2::new(self.min_x, point.y),
                ),
                (
                    self.max_x - point.x,
                    Vector2::new(1.0, 0.0),
                    Vector2::new(self.max_x, point.y),
                ),
                (
                    point.y - self.min_y,
                    Vector2::new(0.0, -1.0),
                    Vector2::new(point.x, self.min_y),
                ),
                (
                    self.max_y - point.y,
                    Vector2::new(0.0, 1.0),
                    Vector2::new(point.x, self.max_y),
                ),
            ];
            let (_, normal, boundary) = candidates
                .into_iter()
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .unwrap();
            return (boundary, normal);
        }

        let clamped = Vector2::new(
            point.x.clamp(self.min_x, self.max_x),
            point.y.clamp(self.min_y, self.max_y),
        );
        let diff = point - clamped;
        let norm = diff.norm();
        let normal = if norm < EPSILON {
            // On an edge: pick the normal from the closest side.
            if (point.x - self.min_x).abs() < EPSILON {
                Vector2::new(-1.0, 0.0)
            } else if (point.x - self.max_x).abs() < EPSILON {
                Vector2::new(1.0, 0.0)
            } else if (point.y - self.min_y).abs() < EPSILON {
                Vector2::new(0.0, -1.0)
            } else {
                Vector2::new(0.0, 1.0)
            }
        } else {
            diff / norm
        };
        (clamped, normal)
    }

    /// Point just outside the rectangle, `buffer` metres out along the
    /// nearest boundary normal.
    pub fn exit_point_with_buffer(&self, point: Vector2<f32>, buffer: f32) -> Vector2<f32> {
        let (boundary, normal) = self.nearest_boundary_point_and_normal(point);
        boundary + normal * buffer
    }

    /// Distance from a segment to this rectangle; zero when an endpoint is
    /// inside or the segment crosses an edge.
    pub fn distance_to_segment(&self, start: Vector2<f32>, end: Vector2<f32>) -> f32 {
        if self.contains(start) || self.contains(end) {
            return 0.0;
        }

        let mut min = self
            .distance_to_boundary(start)
            .min(self.distance_to_boundary(end));
        for (edge_start, edge_end) in self.edges() {
            min = min.min(segment_to_segment_distance(start, end, edge_start, edge_end));
        }
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_segment_distance() {
        let start = Vector2::new(0.0, 0.0);
        let end = Vector2::new(2.0, 0.0);
        assert_eq!(point_segment_distance(Vector2::new(1.0, 1.0), start, end), 1.0);
        assert_eq!(point_segment_distance(Vector2::new(3.0, 0.0), start, end), 1.0);
        // Degenerate segment.
        assert_eq!(
            point_segment_distance(Vector2::new(1.0, 0.0), start, start),
            1.0
        );
    }

    #[test]
    fn test_segments_intersect() {
        let a = (Vector2::new(0.0, 0.0), Vector2::new(2.0, 2.0));
        let b = (Vector2::new(0.0, 2.0), Vector2::new(2.0, 0.0));
        assert!(segments_intersect(a.0, a.1, b.0, b.1));

        let c = (Vector2::new(3.0, 3.0), Vector2::new(4.0, 4.0));
        assert!(!segments_intersect(a.0, a.1, c.0, c.1));
    }

    #[test]
    fn test_segment_to_segment_distance() {
        let d = segment_to_segment_distance(
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 1.0),
        );
        assert!((d - 1.0).abs() < 1e-6);

        // Crossing segments touch.
        let d = segment_to_segment_distance(
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 2.0),
            Vector2::new(0.0, 2.0),
            Vector2::new(2.0, 0.0),
        );
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_rectangle_distance_to_boundary() {
        let rect = AxisAlignedRectangle::new(-1.0, 1.0, -1.0, 1.0);
        assert_eq!(rect.distance_to_boundary(Vector2::new(0.0, 0.0)), 0.0);
        assert_eq!(rect.distance_to_boundary(Vector2::new(2.0, 0.0)), 1.0);
        assert!((rect.distance_to_boundary(Vector2::new(2.0, 2.0)) - 2f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_exit_point_from_inside() {
        let rect = AxisAlignedRectangle::new(-1.0, 1.0, -1.0, 1.0);
        let exit = rect.exit_point_with_buffer(Vector2::new(0.8, 0.0), 0.12);
        assert!((exit.x - 1.12).abs() < 1e-6);
        assert_eq!(exit.y, 0.0);
    }

    #[test]
    fn test_exit_point_from_outside() {
        let rect = AxisAlignedRectangle::new(-1.0, 1.0, -1.0, 1.0);
        let exit = rect.exit_point_with_buffer(Vector2::new(1.5, 0.0), 0.12);
        assert!((exit.x - 1.62).abs() < 1e-6);
    }

    #[test]
    fn test_distance_to_segment() {
        let rect = AxisAlignedRectangle::new(-1.0, 1.0, -1.0, 1.0);
        // Passes through the rectangle.
        assert_eq!(
            rect.distance_to_segment(Vector2::new(-2.0, 0.0), Vector2::new(2.0, 0.0)),
            0.0
        );
        // Runs alongside at distance 0.5.
        let d = rect.distance_to_segment(Vector2::new(-2.0, 1.5), Vector2::new(2.0, 1.5));
        assert!((d - 0.5).abs() < 1e-6);
    }
}
