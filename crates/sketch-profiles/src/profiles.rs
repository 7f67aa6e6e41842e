use forge_types::{Point2, Profile, Winding};
use serde::{Deserialize, Serialize};

use crate::errors::ProfileError;
use crate::validate::polygon_self_intersects;

/// Points closer than this are considered the same vertex.
const POINT_EPSILON: f64 = 1e-9;

/// Long axis of a slot in sketch coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotAxis {
    U,
    V,
}

/// One entry of a hole configuration: center and diameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleSpec {
    pub center: Point2,
    pub diameter: f64,
}

impl HoleSpec {
    pub fn new(u: f64, v: f64, diameter: f64) -> Self {
        Self {
            center: Point2::new(u, v),
            diameter,
        }
    }
}

/// Closed polygon through `points`.
///
/// Consecutive duplicates (including a repeated closing vertex) are dropped.
/// At least three distinct points are required and the loop must enclose
/// area without crossing itself.
pub fn polygon(points: &[Point2]) -> Result<Profile, ProfileError> {
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(ProfileError::profile("polygon has non-finite coordinates"));
    }

    let mut vertices: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if vertices
            .last()
            .map_or(true, |last| (p - last).norm() > POINT_EPSILON)
        {
            vertices.push(*p);
        }
    }
    while vertices.len() > 1 && (vertices[0] - vertices[vertices.len() - 1]).norm() <= POINT_EPSILON {
        vertices.pop();
    }

    if vertices.len() < 3 {
        return Err(ProfileError::profile(format!(
            "polygon needs at least 3 distinct points, got {}",
            vertices.len()
        )));
    }

    let profile = Profile::Polygon { vertices };
    if profile.signed_area().abs() <= POINT_EPSILON {
        return Err(ProfileError::profile("polygon encloses no area"));
    }
    if let Profile::Polygon { vertices } = &profile {
        if polygon_self_intersects(vertices) {
            return Err(ProfileError::profile(
                "polygon crosses itself; winding is inconsistent",
            ));
        }
    }
    Ok(profile.with_winding(Winding::CounterClockwise))
}

/// Axis-aligned rectangle with corners `(x0, y0)` and `(x1, y1)`.
pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Profile, ProfileError> {
    if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
        return Err(ProfileError::geometry("rectangle has non-finite corners"));
    }
    if x1 <= x0 || y1 <= y0 {
        return Err(ProfileError::geometry(format!(
            "rectangle needs x1 > x0 and y1 > y0, got ({x0}, {y0})-({x1}, {y1})"
        )));
    }
    Ok(Profile::Polygon {
        vertices: vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ],
    })
}

/// Radius of the circle through a regular hexagon's corners.
pub fn hex_circumradius(across_flats: f64) -> f64 {
    across_flats / (2.0 * 30f64.to_radians().cos())
}

/// Regular hexagon sized by its across-flats distance.
///
/// Corners sit at 30° + k·60°, so two flats are perpendicular to the local
/// u axis at `u = center.x ± across_flats / 2`.
pub fn regular_hexagon(center: Point2, across_flats: f64) -> Result<Profile, ProfileError> {
    if !across_flats.is_finite() || across_flats <= 0.0 {
        return Err(ProfileError::geometry(format!(
            "hexagon across-flats must be > 0, got {across_flats}"
        )));
    }
    let r = hex_circumradius(across_flats);
    let vertices = (0..6)
        .map(|k| {
            let a = (30.0 + 60.0 * k as f64).to_radians();
            Point2::new(center.x + r * a.cos(), center.y + r * a.sin())
        })
        .collect();
    Ok(Profile::Polygon { vertices })
}

/// Rectangular slot centered at `center` with `length` along `axis`.
pub fn slot(center: Point2, length: f64, width: f64, axis: SlotAxis) -> Result<Profile, ProfileError> {
    if !(length.is_finite() && width.is_finite()) || length <= 0.0 || width <= 0.0 {
        return Err(ProfileError::geometry(format!(
            "slot needs positive length and width, got {length} x {width}"
        )));
    }
    let (du, dv) = match axis {
        SlotAxis::U => (length / 2.0, width / 2.0),
        SlotAxis::V => (width / 2.0, length / 2.0),
    };
    rectangle(center.x - du, center.y - dv, center.x + du, center.y + dv)
}

pub fn circle(center: Point2, radius: f64) -> Result<Profile, ProfileError> {
    if !(center.x.is_finite() && center.y.is_finite()) {
        return Err(ProfileError::geometry("circle center is not finite"));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ProfileError::geometry(format!(
            "circle radius must be > 0, got {radius}"
        )));
    }
    Ok(Profile::Circle { center, radius })
}

/// One circle per hole configuration entry, in order.
pub fn holes(config: &[HoleSpec]) -> Result<Vec<Profile>, ProfileError> {
    config
        .iter()
        .map(|h| circle(h.center, h.diameter / 2.0))
        .collect()
}
