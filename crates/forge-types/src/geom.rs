use serde::{Deserialize, Serialize};

pub type Point2 = nalgebra::Point2<f64>;
pub type Point3 = nalgebra::Point3<f64>;
pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Lengths below this are treated as zero when normalizing directions.
pub const LENGTH_EPSILON: f64 = 1e-12;

/// Global coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vector3 {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }
}

/// Which side of a bounding box a coordinate comparison looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    Min,
    Max,
    Center,
}

/// Axis-aligned bounding box in global coordinates.
///
/// An empty box has `min > max` on every axis; `include` on an empty box
/// yields a degenerate box around the first point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.include(p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn include(&mut self, p: &Point3) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        if !other.is_empty() {
            out.include(&other.min);
            out.include(&other.max);
        }
        out
    }

    pub fn extent(&self, axis: Axis) -> f64 {
        let i = axis.index();
        (self.max[i] - self.min[i]).max(0.0)
    }

    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn coordinate(&self, axis: Axis, bound: Bound) -> f64 {
        let i = axis.index();
        match bound {
            Bound::Min => self.min[i],
            Bound::Max => self.max[i],
            Bound::Center => 0.5 * (self.min[i] + self.max[i]),
        }
    }

    pub fn contains(&self, p: &Point3, tolerance: f64) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - tolerance && p[i] <= self.max[i] + tolerance)
    }

    pub fn overlaps(&self, other: &BoundingBox, tolerance: f64) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        (0..3).all(|i| {
            self.min[i] <= other.max[i] + tolerance && other.min[i] <= self.max[i] + tolerance
        })
    }

    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Extents sorted ascending. For a planar axis-aligned face the first
    /// entry is ~0 and the second is its shortest in-plane dimension.
    pub fn sorted_extents(&self) -> [f64; 3] {
        let mut e = [
            self.extent(Axis::X),
            self.extent(Axis::Y),
            self.extent(Axis::Z),
        ];
        e.sort_by(|a, b| a.total_cmp(b));
        e
    }

    /// Bounding box of the eight transformed corners.
    pub fn transformed(&self, m: &Matrix4) -> BoundingBox {
        let pts: Vec<Point3> = self
            .corners()
            .iter()
            .map(|c| m.transform_point(c))
            .collect();
        BoundingBox::from_points(&pts)
    }
}

/// Comparison tolerances used by face and edge selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Allowed deviation per unit-normal component.
    pub normal: f64,
    /// Allowed deviation on bounding-box and coordinate comparisons, in mm.
    pub bbox: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            normal: 0.01,
            bbox: 0.1,
        }
    }
}

/// Normalize `v`, returning `None` for (near) zero vectors.
pub fn try_normalize(v: &Vector3) -> Option<Vector3> {
    v.try_normalize(LENGTH_EPSILON)
}
