//! Ordered CSG term list evaluated by point membership.

use forge_types::{BoundingBox, Matrix4, Placement, Point2, Point3, Profile, Vector3};
use nalgebra::Matrix3;

use crate::descriptor::SweepSpec;
use crate::types::KernelError;

/// Tolerance on `LᵀL = I` for accepted transforms.
const ORTHOGONALITY_TOLERANCE: f64 = 1e-9;

/// Sampling pitch for tool/target intersection probes, in mm.
const PROBE_PITCH: f64 = 2.0;
const PROBE_MAX_SPLIT: usize = 4;
/// Coordinates closer than this are one grid line.
const PROBE_GAP: f64 = 1e-7;

/// A profile swept between two heights along its frame normal.
///
/// The frame may be left-handed after a reflection; local coordinates are
/// still read with plain dot products so membership is unaffected.
#[derive(Debug, Clone)]
pub(crate) struct Prism {
    pub frame: Placement,
    pub profile: Profile,
    pub start: f64,
    pub end: f64,
    bbox: BoundingBox,
}

impl Prism {
    pub fn new(frame: Placement, profile: Profile, start: f64, end: f64) -> Self {
        let mut prism = Self {
            frame,
            profile,
            start,
            end,
            bbox: BoundingBox::empty(),
        };
        prism.bbox = BoundingBox::from_points(&prism.outline_corners());
        prism
    }

    /// Global point at local `(u, v)` and height `h`.
    pub fn point(&self, uv: &Point2, h: f64) -> Point3 {
        self.frame.from_local(uv) + self.frame.normal * h
    }

    /// Corners of the profile's bounding rectangle at both end heights.
    pub fn outline_corners(&self) -> Vec<Point3> {
        let (lo, hi) = self.profile.bounds();
        let rect = [
            Point2::new(lo.x, lo.y),
            Point2::new(hi.x, lo.y),
            Point2::new(hi.x, hi.y),
            Point2::new(lo.x, hi.y),
        ];
        let mut corners = Vec::with_capacity(8);
        for h in [self.start, self.end] {
            corners.extend(rect.iter().map(|uv| self.point(uv, h)));
        }
        corners
    }

    pub fn contains(&self, p: &Point3) -> bool {
        if !self.bbox.contains(p, 0.0) {
            return false;
        }
        let h = self.frame.height(p);
        if h <= self.start || h >= self.end {
            return false;
        }
        self.profile.contains(&self.frame.to_local(p))
    }

    fn transformed(&self, m: &Matrix4) -> Self {
        Self::new(
            transform_placement(&self.frame, m),
            self.profile.clone(),
            self.start,
            self.end,
        )
    }
}

/// Material between a straight edge and a quarter circle tangent to both
/// faces meeting at it.
///
/// In edge coordinates `s = (p - origin)·axis`, `a = (p - origin)·u`,
/// `b = (p - origin)·v` the region is `0 < s < length`, `0 < a, b < radius`
/// and `(a - r)² + (b - r)² > r²`.
#[derive(Debug, Clone)]
pub(crate) struct FilletWedge {
    pub origin: Point3,
    pub axis: Vector3,
    pub u: Vector3,
    pub v: Vector3,
    pub length: f64,
    pub radius: f64,
    bbox: BoundingBox,
}

impl FilletWedge {
    pub fn new(
        origin: Point3,
        axis: Vector3,
        u: Vector3,
        v: Vector3,
        length: f64,
        radius: f64,
    ) -> Self {
        let mut wedge = Self {
            origin,
            axis,
            u,
            v,
            length,
            radius,
            bbox: BoundingBox::empty(),
        };
        let mut corners = Vec::with_capacity(8);
        for s in [0.0, length] {
            for (a, b) in [(0.0, 0.0), (radius, 0.0), (0.0, radius), (radius, radius)] {
                corners.push(origin + axis * s + u * a + v * b);
            }
        }
        wedge.bbox = BoundingBox::from_points(&corners);
        wedge
    }

    /// Center line of the rounding surface.
    pub fn arc_center(&self) -> Point3 {
        self.origin + (self.u + self.v) * self.radius
    }

    pub fn contains(&self, p: &Point3) -> bool {
        if !self.bbox.contains(p, 0.0) {
            return false;
        }
        let d = p - self.origin;
        let (s, a, b) = (d.dot(&self.axis), d.dot(&self.u), d.dot(&self.v));
        let r = self.radius;
        s > 0.0
            && s < self.length
            && a > 0.0
            && a < r
            && b > 0.0
            && b < r
            && (a - r).powi(2) + (b - r).powi(2) > r * r
    }

    fn transformed(&self, m: &Matrix4) -> Self {
        Self::new(
            m.transform_point(&self.origin),
            m.transform_vector(&self.axis),
            m.transform_vector(&self.u),
            m.transform_vector(&self.v),
            self.length,
            self.radius,
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Primitive {
    Prism(Prism),
    Wedge(FilletWedge),
}

impl Primitive {
    pub fn contains(&self, p: &Point3) -> bool {
        match self {
            Primitive::Prism(prism) => prism.contains(p),
            Primitive::Wedge(wedge) => wedge.contains(p),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Primitive::Prism(prism) => prism.bbox,
            Primitive::Wedge(wedge) => wedge.bbox,
        }
    }

    fn transformed(&self, m: &Matrix4) -> Self {
        match self {
            Primitive::Prism(prism) => Primitive::Prism(prism.transformed(m)),
            Primitive::Wedge(wedge) => Primitive::Wedge(wedge.transformed(m)),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Term {
    Add(Primitive),
    Cut(Primitive),
}

impl Term {
    pub fn primitive(&self) -> &Primitive {
        match self {
            Term::Add(p) | Term::Cut(p) => p,
        }
    }
}

/// A solid as an ordered list of additions and removals.
///
/// A point is inside when the last term containing it is an `Add`.
#[derive(Debug, Clone, Default)]
pub(crate) struct PrismSolid {
    pub terms: Vec<Term>,
}

impl PrismSolid {
    pub fn contains(&self, p: &Point3) -> bool {
        let mut inside = false;
        for term in &self.terms {
            match term {
                Term::Add(prim) if !inside => inside = prim.contains(p),
                Term::Cut(prim) if inside => inside = !prim.contains(p),
                _ => {}
            }
        }
        inside
    }

    /// Conservative bounds: the union of every added primitive.
    pub fn add_bounds(&self) -> BoundingBox {
        self.terms
            .iter()
            .filter_map(|t| match t {
                Term::Add(p) => Some(p.bounding_box()),
                Term::Cut(_) => None,
            })
            .fold(BoundingBox::empty(), |acc, b| acc.union(&b))
    }

    pub fn with_terms(&self, extra: impl IntoIterator<Item = Term>) -> Self {
        let mut terms = self.terms.clone();
        terms.extend(extra);
        Self { terms }
    }

    /// Midpoint-rule volume over a `resolution³` grid spanning the bounds.
    pub fn volume(&self, resolution: usize) -> f64 {
        let bb = self.add_bounds();
        if bb.is_empty() || resolution == 0 {
            return 0.0;
        }
        let n = resolution as f64;
        let step = (bb.max - bb.min) / n;
        let mut count = 0usize;
        for i in 0..resolution {
            for j in 0..resolution {
                for k in 0..resolution {
                    let p = bb.min
                        + Vector3::new(
                            step.x * (i as f64 + 0.5),
                            step.y * (j as f64 + 0.5),
                            step.z * (k as f64 + 0.5),
                        );
                    if self.contains(&p) {
                        count += 1;
                    }
                }
            }
        }
        count as f64 * step.x * step.y * step.z
    }

    /// Whether `tool` and this solid share interior volume.
    ///
    /// Samples the overlap of the tool box with the added material on a grid
    /// whose lines fall between every primitive box coordinate, so a slab
    /// bounded by primitive faces is sampled however thin it is.
    pub fn intersects(&self, tool: &Prism) -> bool {
        let bounds = self.add_bounds();
        if !bounds.overlaps(&tool.bbox, 0.0) {
            return false;
        }
        let lo = bounds.min.coords.sup(&tool.bbox.min.coords);
        let hi = bounds.max.coords.inf(&tool.bbox.max.coords);
        let boxes: Vec<BoundingBox> = self
            .terms
            .iter()
            .map(|t| t.primitive().bounding_box())
            .chain(std::iter::once(tool.bbox))
            .collect();
        let lines: Vec<Vec<f64>> = (0..3)
            .map(|axis| {
                let cuts = boxes.iter().flat_map(|b| [b.min[axis], b.max[axis]]);
                sample_lines(lo[axis], hi[axis], cuts)
            })
            .collect();
        for &x in &lines[0] {
            for &y in &lines[1] {
                for &z in &lines[2] {
                    let p = Point3::new(x, y, z);
                    if tool.contains(&p) && self.contains(&p) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Copy with every primitive mapped through `m`.
    ///
    /// Only rigid motions and reflections are accepted.
    pub fn transformed(&self, m: &Matrix4) -> Result<Self, KernelError> {
        check_orthogonal(m)?;
        let terms = self
            .terms
            .iter()
            .map(|t| match t {
                Term::Add(p) => Term::Add(p.transformed(m)),
                Term::Cut(p) => Term::Cut(p.transformed(m)),
            })
            .collect();
        Ok(Self { terms })
    }
}

/// Midpoints of the intervals that `cuts` split `[lo, hi]` into.
///
/// Intervals wider than `PROBE_PITCH` are subdivided, up to
/// `PROBE_MAX_SPLIT` samples each, to reach curved profiles.
fn sample_lines(lo: f64, hi: f64, cuts: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut stops: Vec<f64> = cuts.filter(|c| *c > lo && *c < hi).collect();
    stops.push(lo);
    stops.push(hi);
    stops.sort_by(f64::total_cmp);
    stops.dedup_by(|a, b| (*a - *b).abs() < PROBE_GAP);
    let mut lines = Vec::new();
    for pair in stops.windows(2) {
        let width = pair[1] - pair[0];
        if width < PROBE_GAP {
            continue;
        }
        let n = ((width / PROBE_PITCH).ceil() as usize).clamp(1, PROBE_MAX_SPLIT);
        lines.extend((0..n).map(|i| pair[0] + width * (i as f64 + 0.5) / n as f64));
    }
    lines
}

fn transform_placement(frame: &Placement, m: &Matrix4) -> Placement {
    Placement {
        origin: m.transform_point(&frame.origin),
        x_axis: m.transform_vector(&frame.x_axis),
        y_axis: m.transform_vector(&frame.y_axis),
        normal: m.transform_vector(&frame.normal),
    }
}

fn check_orthogonal(m: &Matrix4) -> Result<(), KernelError> {
    let bottom = m.fixed_view::<1, 4>(3, 0);
    let affine = bottom[(0, 0)] == 0.0
        && bottom[(0, 1)] == 0.0
        && bottom[(0, 2)] == 0.0
        && (bottom[(0, 3)] - 1.0).abs() < ORTHOGONALITY_TOLERANCE;
    let linear: Matrix3<f64> = m.fixed_view::<3, 3>(0, 0).into_owned();
    let deviation = (linear.transpose() * linear - Matrix3::identity()).amax();
    if affine && deviation < ORTHOGONALITY_TOLERANCE {
        Ok(())
    } else {
        Err(KernelError::NotSupported {
            operation: "non-rigid transform".to_string(),
        })
    }
}

/// Validate a sweep and build one prism per profile.
pub(crate) fn prisms_from_sweep(sweep: &SweepSpec) -> Result<Vec<Prism>, KernelError> {
    if !sweep.length.is_finite() || sweep.length <= 0.0 || !sweep.start.is_finite() {
        return Err(KernelError::InvalidInput {
            reason: format!(
                "sweep span [{}, +{}] is not a positive finite length",
                sweep.start, sweep.length
            ),
        });
    }
    if sweep.profiles.is_empty() {
        return Err(KernelError::InvalidInput {
            reason: "sweep has no profiles".to_string(),
        });
    }
    let frame = &sweep.placement;
    if (frame.normal.norm() - 1.0).abs() > 1e-6
        || frame.normal.dot(&frame.x_axis).abs() > 1e-6
        || frame.normal.dot(&frame.y_axis).abs() > 1e-6
    {
        return Err(KernelError::InvalidInput {
            reason: "sweep placement is not orthonormal".to_string(),
        });
    }
    sweep
        .profiles
        .iter()
        .enumerate()
        .map(|(i, profile)| {
            let degenerate = match profile {
                Profile::Polygon { vertices } => {
                    vertices.len() < 3 || profile.signed_area().abs() < 1e-12
                }
                Profile::Circle { radius, .. } => !radius.is_finite() || *radius <= 0.0,
            };
            if degenerate {
                return Err(KernelError::InvalidInput {
                    reason: format!("profile {i} is degenerate"),
                });
            }
            Ok(Prism::new(*frame, profile.clone(), sweep.start, sweep.end()))
        })
        .collect()
}
