use serde::{Deserialize, Serialize};

use crate::geom::{Axis, Bound, Point3, Tolerances, Vector3};

/// The kind of boundary entity a query addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopoKind {
    Face,
    Edge,
}

/// Region predicate for face selection. All filters of a query must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FaceFilter {
    /// A bounding-box coordinate of the face lies within the bbox tolerance
    /// of `value`.
    BoxCoordinate { axis: Axis, bound: Bound, value: f64 },
    /// The face's bounding box (grown by the bbox tolerance) contains `point`.
    ContainsPoint { point: Point3 },
    /// The face's plane passes within the bbox tolerance of `point`.
    PlaneThrough { point: Point3 },
    /// The face's bounding box spans at least `min` along `axis`.
    MinExtent { axis: Axis, min: f64 },
}

/// Face query: an outward normal plus region filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceQuery {
    pub normal: Vector3,
    #[serde(default)]
    pub filters: Vec<FaceFilter>,
    #[serde(default)]
    pub tolerances: Tolerances,
}

impl FaceQuery {
    pub fn facing(normal: Vector3) -> Self {
        Self {
            normal,
            filters: Vec::new(),
            tolerances: Tolerances::default(),
        }
    }

    pub fn with(mut self, filter: FaceFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn at(self, axis: Axis, bound: Bound, value: f64) -> Self {
        self.with(FaceFilter::BoxCoordinate { axis, bound, value })
    }

    pub fn containing(self, point: Point3) -> Self {
        self.with(FaceFilter::ContainsPoint { point })
    }

    pub fn through(self, point: Point3) -> Self {
        self.with(FaceFilter::PlaneThrough { point })
    }

    pub fn tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }
}

/// Predicate over an edge's midpoint, length, or direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EdgeFilter {
    /// Midpoint coordinate along `axis` within the bbox tolerance of `value`.
    MidpointCoordinate { axis: Axis, value: f64 },
    /// Midpoint inside the axis-aligned box `[min, max]`.
    MidpointWithin { min: Point3, max: Point3 },
    LongerThan { length: f64 },
    ShorterThan { length: f64 },
    /// Direction parallel (either sense) to `direction` within the normal
    /// tolerance per component.
    Parallel { direction: Vector3 },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeQuery {
    #[serde(default)]
    pub filters: Vec<EdgeFilter>,
    #[serde(default)]
    pub tolerances: Tolerances,
}

impl EdgeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: EdgeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn midpoint_at(self, axis: Axis, value: f64) -> Self {
        self.with(EdgeFilter::MidpointCoordinate { axis, value })
    }

    pub fn longer_than(self, length: f64) -> Self {
        self.with(EdgeFilter::LongerThan { length })
    }

    pub fn shorter_than(self, length: f64) -> Self {
        self.with(EdgeFilter::ShorterThan { length })
    }

    pub fn parallel_to(self, direction: Vector3) -> Self {
        self.with(EdgeFilter::Parallel { direction })
    }

    pub fn tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }
}
