use forge_types::{Point2, Profile};

use crate::errors::ProfileError;

fn cross(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Proper crossing of segments `ab` and `cd` (shared endpoints do not count).
fn segments_cross(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

pub(crate) fn polygon_self_intersects(vertices: &[Point2]) -> bool {
    let n = vertices.len();
    for i in 0..n {
        let (a, b) = (&vertices[i], &vertices[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (&vertices[j], &vertices[(j + 1) % n]);
            if segments_cross(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

fn bounds_overlap(a: &Profile, b: &Profile) -> bool {
    let (amin, amax) = a.bounds();
    let (bmin, bmax) = b.bounds();
    amin.x < bmax.x && bmin.x < amax.x && amin.y < bmax.y && bmin.y < amax.y
}

/// Check the loops of one sketch: each is non-degenerate and no two
/// overlap. Loops that merely touch are accepted.
pub fn validate_loops(profiles: &[Profile]) -> Result<(), ProfileError> {
    if profiles.is_empty() {
        return Err(ProfileError::profile("sketch has no profiles"));
    }
    for (i, p) in profiles.iter().enumerate() {
        match p {
            Profile::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(ProfileError::profile(format!(
                        "profile {i} has {} vertices",
                        vertices.len()
                    )));
                }
                if polygon_self_intersects(vertices) {
                    return Err(ProfileError::profile(format!("profile {i} crosses itself")));
                }
            }
            Profile::Circle { radius, .. } => {
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(ProfileError::profile(format!(
                        "profile {i} has radius {radius}"
                    )));
                }
            }
        }
    }
    for i in 0..profiles.len() {
        for j in (i + 1)..profiles.len() {
            if bounds_overlap(&profiles[i], &profiles[j]) {
                return Err(ProfileError::profile(format!(
                    "profiles {i} and {j} overlap"
                )));
            }
        }
    }
    Ok(())
}
