use crate::entities::{GameFrame, Vector3Projection, VectorExtensions};
use log::warn;
use nalgebra::{DMatrix, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamKind {
    Friendly,
    Enemy,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Robot,
    Ball,
}

/// Identifies one row of the proximity matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub team: TeamKind,
    pub kind: ObjectKind,
    pub id: u8,
}

impl ObjectKey {
    pub fn robot(team: TeamKind, id: u8) -> Self {
        ObjectKey {
            team,
            kind: ObjectKind::Robot,
            id,
        }
    }

    pub fn ball() -> Self {
        ObjectKey {
            team: TeamKind::Neutral,
            kind: ObjectKind::Ball,
            id: 0,
        }
    }
}

/// Pairwise Euclidean distances between all robots and the ball for one
/// frame. The diagonal is +∞ so an argmin can never return the queried
/// object itself. Built once per frame, immutable afterwards.
pub struct ProximityLookup {
    keys: Vec<ObjectKey>,
    friendly_end: usize,
    enemy_end: usize,
    has_ball: bool,
    matrix: Option<DMatrix<f32>>,
}

impl ProximityLookup {
    pub fn from_frame(frame: &GameFrame) -> Self {
        let mut keys = Vec::new();
        let mut points: Vec<Vector2<f32>> = Vec::new();

        // Friendly block, then enemy block, then the ball as the final row.
        // Iteration order within a team map is irrelevant to the queries.
        for robot in frame.friendly_robots.values() {
            keys.push(ObjectKey::robot(TeamKind::Friendly, robot.id));
            points.push(robot.position);
        }
        let friendly_end = keys.len();

        for robot in frame.enemy_robots.values() {
            keys.push(ObjectKey::robot(TeamKind::Enemy, robot.id));
            points.push(robot.position);
        }
        let enemy_end = keys.len();

        let has_ball = frame.ball.is_some();
        if let Some(ball) = &frame.ball {
            keys.push(ObjectKey::ball());
            points.push(ball.position.to_2d());
        }

        let matrix = build_distance_matrix(&points);

        ProximityLookup {
            keys,
            friendly_end,
            enemy_end,
            has_ball,
            matrix,
        }
    }

    pub fn keys(&self) -> &[ObjectKey] {
        &self.keys
    }

    pub fn matrix(&self) -> Option<&DMatrix<f32>> {
        self.matrix.as_ref()
    }

    fn index_of(&self, key: &ObjectKey) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Distance between two tracked objects; +∞ when either is unknown.
    pub fn distance_between(&self, a: &ObjectKey, b: &ObjectKey) -> f32 {
        match (&self.matrix, self.index_of(a), self.index_of(b)) {
            (Some(matrix), Some(i), Some(j)) => matrix[(i, j)],
            _ => f32::INFINITY,
        }
    }

    /// Closest robot to the ball, optionally restricted to one team.
    /// Returns `None` when the frame has no ball or no candidate robots.
    pub fn closest_to_ball(&self, team: Option<TeamKind>) -> Option<(ObjectKey, f32)> {
        let matrix = match &self.matrix {
            Some(matrix) => matrix,
            None => {
                warn!("proximity matrix is empty, cannot find closest to ball");
                return None;
            }
        };
        if !self.has_ball {
            warn!("invalid closest_to_ball query: no ball in proximity lookup");
            return None;
        }

        let ball_index = self.keys.len() - 1;
        let (start, end) = match team {
            Some(TeamKind::Friendly) => (0, self.friendly_end),
            Some(TeamKind::Enemy) => (self.friendly_end, self.enemy_end),
            _ => (0, self.enemy_end),
        };
        if start == end {
            return None;
        }

        (start..end)
            .map(|i| (self.keys[i], matrix[(ball_index, i)]))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

fn build_distance_matrix(points: &[Vector2<f32>]) -> Option<DMatrix<f32>> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len();
    let mut matrix = DMatrix::zeros(n, n);
    for i in 0..n {
        matrix[(i, i)] = f32::INFINITY;
        for j in (i + 1)..n {
            let d = points[i].distance_to(&points[j]);
            matrix[(i, j)] = d;
            matrix[(j, i)] = d;
        }
    }
    Some(matrix)
}
