use serde::{Deserialize, Serialize};

use crate::geom::Point2;

/// Orientation of a closed loop in its sketch frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winding {
    CounterClockwise,
    Clockwise,
}

/// A closed planar boundary in sketch-local coordinates.
///
/// Polygons carry their vertices in order with an implied closing segment
/// from the last vertex back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Profile {
    Polygon { vertices: Vec<Point2> },
    Circle { center: Point2, radius: f64 },
}

impl Profile {
    /// Shoelace area; positive for counter-clockwise polygons. Circles
    /// report their (positive) area.
    pub fn signed_area(&self) -> f64 {
        match self {
            Profile::Polygon { vertices } => {
                let n = vertices.len();
                let mut area = 0.0;
                for i in 0..n {
                    let j = (i + 1) % n;
                    area += vertices[i].x * vertices[j].y - vertices[j].x * vertices[i].y;
                }
                area / 2.0
            }
            Profile::Circle { radius, .. } => std::f64::consts::PI * radius * radius,
        }
    }

    pub fn winding(&self) -> Winding {
        if self.signed_area() >= 0.0 {
            Winding::CounterClockwise
        } else {
            Winding::Clockwise
        }
    }

    /// Same loop traversed the other way. Circles are unaffected.
    pub fn reversed(&self) -> Profile {
        match self {
            Profile::Polygon { vertices } => {
                let mut vertices = vertices.clone();
                vertices.reverse();
                Profile::Polygon { vertices }
            }
            circle => circle.clone(),
        }
    }

    pub fn with_winding(self, winding: Winding) -> Profile {
        if self.winding() == winding {
            self
        } else {
            self.reversed()
        }
    }

    /// `(min, max)` corners of the loop's 2D bounding rectangle.
    pub fn bounds(&self) -> (Point2, Point2) {
        match self {
            Profile::Polygon { vertices } => {
                let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
                let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
                for v in vertices {
                    min.x = min.x.min(v.x);
                    min.y = min.y.min(v.y);
                    max.x = max.x.max(v.x);
                    max.y = max.y.max(v.y);
                }
                (min, max)
            }
            Profile::Circle { center, radius } => (
                Point2::new(center.x - radius, center.y - radius),
                Point2::new(center.x + radius, center.y + radius),
            ),
        }
    }

    /// Point-in-loop test. Points exactly on the boundary may go either way.
    pub fn contains(&self, p: &Point2) -> bool {
        match self {
            Profile::Polygon { vertices } => {
                let n = vertices.len();
                let mut inside = false;
                let mut j = n.wrapping_sub(1);
                for i in 0..n {
                    let (a, b) = (vertices[i], vertices[j]);
                    if (a.y > p.y) != (b.y > p.y) {
                        let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                        if p.x < x_cross {
                            inside = !inside;
                        }
                    }
                    j = i;
                }
                inside
            }
            Profile::Circle { center, radius } => (p - center).norm_squared() < radius * radius,
        }
    }

    /// Apply a point map to every vertex (or the circle center).
    ///
    /// The map must be an isometry for circles to stay circles; the radius
    /// is carried over unchanged.
    pub fn map_points(&self, f: impl Fn(&Point2) -> Point2) -> Profile {
        match self {
            Profile::Polygon { vertices } => Profile::Polygon {
                vertices: vertices.iter().map(f).collect(),
            },
            Profile::Circle { center, radius } => Profile::Circle {
                center: f(center),
                radius: *radius,
            },
        }
    }

    pub fn is_circle(&self) -> bool {
        matches!(self, Profile::Circle { .. })
    }
}
