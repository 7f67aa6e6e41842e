//! Boundary extraction for CSG solids.
//!
//! Every primitive contributes candidate surface patches (caps, planar
//! sides, cylinder walls). Coincident patches are merged into one surface
//! group. A point `p` on a group with positive normal `m` lies on the
//! boundary with outward normal `+m` when `p - δm` is inside and `p + δm`
//! is not (and `-m` for the converse). The boundary samples of one
//! orientation are split into connected regions, one face each, so patches
//! of a plane separated by a cut stay distinct faces. Edges are the creases
//! where two realized faces meet.

use std::f64::consts::TAU;

use forge_types::{try_normalize, BoundingBox, Placement, Point2, Point3, Profile, Vector3};

use super::solid::{FilletWedge, Primitive, Prism, PrismSolid};
use crate::traits::{BrepEdge, BrepFace, CurveKind, SurfaceKind};
use crate::types::{KernelId, KernelSolidHandle};

/// Offset used for inside/outside probes, in mm.
pub(crate) const PROBE: f64 = 1e-4;

const GRID_PITCH: f64 = 2.0;
const GRID_MIN: usize = 6;
const GRID_MAX: usize = 32;
const EDGE_PITCH: f64 = 0.25;
const EDGE_MAX_SAMPLES: usize = 512;
const ARC_MIN_SAMPLES: usize = 32;
const ARC_MAX_SAMPLES: usize = 256;
const BISECTION_STEPS: usize = 40;
const COINCIDENCE: f64 = 1e-7;
const PARALLEL: f64 = 1e-9;
const CLIP_PAD: f64 = 1e-3;
const MIN_EDGE_LENGTH: f64 = 1e-4;
const ENDPOINT_INSET: f64 = 1e-9;
const CYLINDER_MIN_CELLS: usize = 24;
/// Grid lines closer than this are merged.
const LINE_MERGE: f64 = 1e-12;
const FOOTPRINT_PAD: f64 = 1e-6;
/// Samples closer than this join without a midpoint check.
const JOIN_GAP: f64 = 1e-6;

/// A surface parameterized by `(u, v)`.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Surface {
    /// Right-handed frame; `(u, v)` are its local coordinates.
    Plane(Placement),
    /// `u` is the angle from `x_ref` towards `y_ref`, `v` the axial height.
    Cylinder {
        base: Point3,
        axis: Vector3,
        x_ref: Vector3,
        y_ref: Vector3,
        radius: f64,
    },
}

impl Surface {
    pub fn point(&self, u: f64, v: f64) -> Point3 {
        match self {
            Surface::Plane(frame) => frame.from_local(&Point2::new(u, v)),
            Surface::Cylinder {
                base,
                axis,
                x_ref,
                y_ref,
                radius,
            } => base + axis * v + (x_ref * u.cos() + y_ref * u.sin()) * *radius,
        }
    }

    /// Unit normal of the positive orientation.
    pub fn normal(&self, u: f64, _v: f64) -> Vector3 {
        match self {
            Surface::Plane(frame) => frame.normal,
            Surface::Cylinder { x_ref, y_ref, .. } => x_ref * u.cos() + y_ref * u.sin(),
        }
    }

    pub fn params(&self, p: &Point3) -> (f64, f64) {
        match self {
            Surface::Plane(frame) => {
                let uv = frame.to_local(p);
                (uv.x, uv.y)
            }
            Surface::Cylinder {
                base,
                axis,
                x_ref,
                y_ref,
                ..
            } => {
                let d = p - base;
                let u = d.dot(y_ref).atan2(d.dot(x_ref)).rem_euclid(TAU);
                (u, d.dot(axis))
            }
        }
    }

    /// Physical length of one unit of `u`.
    pub fn u_scale(&self) -> f64 {
        match self {
            Surface::Plane(_) => 1.0,
            Surface::Cylinder { radius, .. } => *radius,
        }
    }

    pub fn is_cylinder(&self) -> bool {
        matches!(self, Surface::Cylinder { .. })
    }

    fn same_as(&self, other: &Surface) -> bool {
        match (self, other) {
            (Surface::Plane(a), Surface::Plane(b)) => {
                a.normal.dot(&b.normal).abs() > 1.0 - PARALLEL
                    && a.height(&b.origin).abs() < COINCIDENCE
            }
            (
                Surface::Cylinder {
                    base: b1,
                    axis: a1,
                    radius: r1,
                    ..
                },
                Surface::Cylinder {
                    base: b2,
                    axis: a2,
                    radius: r2,
                    ..
                },
            ) => {
                let d = b2 - b1;
                a1.dot(a2).abs() > 1.0 - PARALLEL
                    && (r1 - r2).abs() < COINCIDENCE
                    && (d - a1 * d.dot(a1)).norm() < COINCIDENCE
            }
            _ => false,
        }
    }
}

/// Parameter rectangle sampled on a surface.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Domain {
    pub u: (f64, f64),
    pub v: (f64, f64),
}

impl Domain {
    fn at(uv: (f64, f64)) -> Domain {
        Domain {
            u: (uv.0, uv.0),
            v: (uv.1, uv.1),
        }
    }

    pub fn union(&self, other: &Domain) -> Domain {
        Domain {
            u: (self.u.0.min(other.u.0), self.u.1.max(other.u.1)),
            v: (self.v.0.min(other.v.0), self.v.1.max(other.v.1)),
        }
    }

    fn holds(&self, uv: (f64, f64), pad: f64) -> bool {
        uv.0 >= self.u.0 - pad
            && uv.0 <= self.u.1 + pad
            && uv.1 >= self.v.0 - pad
            && uv.1 <= self.v.1 + pad
    }
}

/// Coincident patches merged under the first patch's parameterization.
#[derive(Debug, Clone)]
pub(crate) struct SurfaceGroup {
    pub surface: Surface,
    pub domains: Vec<Domain>,
}

impl SurfaceGroup {
    pub fn full_domain(&self) -> Option<Domain> {
        let mut iter = self.domains.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, d| acc.union(d)))
    }
}

/// A candidate patch: its surface and points spanning its extent.
struct Patch {
    surface: Surface,
    extent: Vec<Point3>,
}

/// Where a face sits on its group's surface, in parameter space.
#[derive(Debug, Clone)]
pub(crate) struct Footprint {
    pub domain: Domain,
    pub samples: Vec<(f64, f64)>,
}

impl Footprint {
    fn distance(&self, uv: (f64, f64), u_scale: f64) -> f64 {
        self.samples
            .iter()
            .map(|s| ((s.0 - uv.0) * u_scale).hypot(s.1 - uv.1))
            .fold(f64::INFINITY, f64::min)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FaceRecord {
    pub face: BrepFace,
    pub group: usize,
    /// `1` when the outward normal is the group's positive normal, else `-1`.
    pub orientation: i8,
    pub footprint: Footprint,
}

/// Faces sharing `faces[f]`'s surface group and orientation, `f` included.
pub(crate) fn siblings(faces: &[FaceRecord], f: usize) -> Vec<usize> {
    let (group, orientation) = (faces[f].group, faces[f].orientation);
    (0..faces.len())
        .filter(|&i| faces[i].group == group && faces[i].orientation == orientation)
        .collect()
}

/// The sibling whose footprint holds `uv`, falling back to the nearest one.
pub(crate) fn owner(
    faces: &[FaceRecord],
    siblings: &[usize],
    uv: (f64, f64),
    u_scale: f64,
) -> Option<usize> {
    if let [only] = siblings {
        return Some(*only);
    }
    let holding: Vec<usize> = siblings
        .iter()
        .copied()
        .filter(|&i| faces[i].footprint.domain.holds(uv, FOOTPRINT_PAD))
        .collect();
    if let [only] = holding.as_slice() {
        return Some(*only);
    }
    let pool = if holding.is_empty() {
        siblings
    } else {
        holding.as_slice()
    };
    pool.iter().copied().min_by(|&a, &b| {
        let da = faces[a].footprint.distance(uv, u_scale);
        let db = faces[b].footprint.distance(uv, u_scale);
        da.total_cmp(&db)
    })
}

#[derive(Debug, Clone)]
pub(crate) struct EdgeRecord {
    pub edge: BrepEdge,
    pub faces: [usize; 2],
    pub convex: bool,
}

/// Realized boundary of one solid.
#[derive(Debug, Clone)]
pub(crate) struct Boundary {
    pub groups: Vec<SurfaceGroup>,
    pub faces: Vec<FaceRecord>,
    pub edges: Vec<EdgeRecord>,
    pub bbox: BoundingBox,
}

/// Which side of a surface point the material is on: `1` below `m`
/// (outward normal `+m`), `-1` above, `0` when `p` is not on the boundary.
pub(crate) fn side(solid: &PrismSolid, p: &Point3, m: &Vector3) -> i8 {
    let below = solid.contains(&(p - m * PROBE));
    let above = solid.contains(&(p + m * PROBE));
    match (below, above) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}

/// Classify `p` as a crease between faces with outward normals `a` and `b`.
/// Returns `Some(true)` for a convex edge, `Some(false)` for a concave one.
fn crease(solid: &PrismSolid, p: &Point3, a: &Vector3, b: &Vector3) -> Option<bool> {
    let probe = |sa: f64, sb: f64| solid.contains(&(p + (a * sa + b * sb) * PROBE));
    if !probe(-1.0, -1.0) || probe(1.0, 1.0) {
        return None;
    }
    match (probe(1.0, -1.0), probe(-1.0, 1.0)) {
        (true, true) => Some(false),
        (false, false) => Some(true),
        _ => None,
    }
}

fn bisect(pred: impl Fn(f64) -> bool, mut good: f64, mut bad: f64) -> f64 {
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (good + bad);
        if pred(mid) {
            good = mid;
        } else {
            bad = mid;
        }
    }
    good
}

fn plane(origin: Point3, normal: Vector3, x_hint: Vector3) -> Option<Surface> {
    Placement::new(origin, normal, x_hint).ok().map(Surface::Plane)
}

fn prism_patches(prism: &Prism, out: &mut Vec<Patch>) {
    let f = &prism.frame;
    let corners = prism.outline_corners();
    for (h, cap) in [(prism.start, &corners[0..4]), (prism.end, &corners[4..8])] {
        if let Some(surface) = plane(f.origin + f.normal * h, f.normal, f.x_axis) {
            out.push(Patch {
                surface,
                extent: cap.to_vec(),
            });
        }
    }
    let rise = f.normal * (prism.end - prism.start);
    match &prism.profile {
        Profile::Polygon { vertices } => {
            let n = vertices.len();
            for i in 0..n {
                let a = prism.point(&vertices[i], prism.start);
                let b = prism.point(&vertices[(i + 1) % n], prism.start);
                let Some(dir) = try_normalize(&(b - a)) else {
                    continue;
                };
                if let Some(surface) = plane(a, dir.cross(&f.normal), dir) {
                    out.push(Patch {
                        surface,
                        extent: vec![a, b, a + rise, b + rise],
                    });
                }
            }
        }
        Profile::Circle { center, radius } => {
            let base = f.from_local(center);
            let x_ref = f.x_axis;
            out.push(Patch {
                surface: Surface::Cylinder {
                    base,
                    axis: f.normal,
                    x_ref,
                    y_ref: f.normal.cross(&x_ref),
                    radius: *radius,
                },
                extent: vec![base + f.normal * prism.start, base + f.normal * prism.end],
            });
        }
    }
}

fn wedge_patches(w: &FilletWedge, out: &mut Vec<Patch>) {
    let (o, r) = (w.origin, w.radius);
    let along = w.axis * w.length;
    let base = w.arc_center();
    let x_ref = -w.u;
    out.push(Patch {
        surface: Surface::Cylinder {
            base,
            axis: w.axis,
            x_ref,
            y_ref: w.axis.cross(&x_ref),
            radius: r,
        },
        extent: vec![base, base + along],
    });
    let section = [o, o + w.u * r, o + w.v * r, o + (w.u + w.v) * r];
    for offset in [Vector3::zeros(), along] {
        if let Some(surface) = plane(o + offset, w.axis, w.u) {
            out.push(Patch {
                surface,
                extent: section.iter().map(|p| p + offset).collect(),
            });
        }
    }
    for (normal, leg) in [(w.u, w.v), (w.v, w.u)] {
        if let Some(surface) = plane(o, normal, w.axis) {
            out.push(Patch {
                surface,
                extent: vec![o, o + along, o + leg * r, o + along + leg * r],
            });
        }
    }
}

fn domain_of(surface: &Surface, extent: &[Point3]) -> Domain {
    let mut u = (f64::INFINITY, f64::NEG_INFINITY);
    let mut v = (f64::INFINITY, f64::NEG_INFINITY);
    for p in extent {
        let (pu, pv) = surface.params(p);
        u = (u.0.min(pu), u.1.max(pu));
        v = (v.0.min(pv), v.1.max(pv));
    }
    if surface.is_cylinder() {
        u = (0.0, TAU);
    }
    Domain { u, v }
}

fn surface_groups(solid: &PrismSolid) -> Vec<SurfaceGroup> {
    let mut patches = Vec::new();
    for term in &solid.terms {
        match term.primitive() {
            Primitive::Prism(prism) => prism_patches(prism, &mut patches),
            Primitive::Wedge(wedge) => wedge_patches(wedge, &mut patches),
        }
    }
    let mut groups: Vec<SurfaceGroup> = Vec::new();
    for patch in patches {
        match groups.iter_mut().find(|g| g.surface.same_as(&patch.surface)) {
            Some(group) => {
                let domain = domain_of(&group.surface, &patch.extent);
                group.domains.push(domain);
            }
            None => {
                let domain = domain_of(&patch.surface, &patch.extent);
                groups.push(SurfaceGroup {
                    surface: patch.surface,
                    domains: vec![domain],
                });
            }
        }
    }
    groups
}

/// Sample positions along one axis of a domain: both ends (inset) plus
/// cell centers.
fn sample_line(lo: f64, hi: f64, cells: usize) -> Vec<f64> {
    let span = hi - lo;
    let inset = ENDPOINT_INSET * span.abs().max(1.0);
    let mut out = Vec::with_capacity(cells + 2);
    out.push(lo + inset);
    out.extend((0..cells).map(|i| lo + span * (i as f64 + 0.5) / cells as f64));
    out.push(hi - inset);
    out
}

fn grid_cells(length: f64) -> usize {
    ((length / GRID_PITCH).ceil() as usize).clamp(GRID_MIN, GRID_MAX)
}

/// Sample positions across `range`: both ends (inset) and cell centers,
/// with at least one center between each pair of neighboring `stops`.
fn sample_axis(range: (f64, f64), cells: usize, stops: &[f64], out: &mut Vec<f64>) {
    let (lo, hi) = range;
    let span = hi - lo;
    let inset = ENDPOINT_INSET * span.abs().max(1.0);
    out.push(lo + inset);
    out.push(hi - inset);
    let pitch = span / cells as f64;
    let mut cuts: Vec<f64> = stops.iter().copied().filter(|c| *c > lo && *c < hi).collect();
    cuts.push(lo);
    cuts.push(hi);
    cuts.sort_by(f64::total_cmp);
    cuts.dedup_by(|a, b| (*a - *b).abs() < COINCIDENCE);
    for pair in cuts.windows(2) {
        let width = pair[1] - pair[0];
        let n = ((width / pitch).round() as usize).max(1);
        out.extend((0..n).map(|i| pair[0] + width * (i as f64 + 0.5) / n as f64));
    }
}

/// Corners of every primitive's box; their coordinates bound all patches.
fn breakpoints(solid: &PrismSolid) -> Vec<Point3> {
    let mut out = Vec::with_capacity(solid.terms.len() * 8);
    for term in &solid.terms {
        let b = term.primitive().bounding_box();
        for x in [b.min.x, b.max.x] {
            for y in [b.min.y, b.max.y] {
                for z in [b.min.z, b.max.z] {
                    out.push(Point3::new(x, y, z));
                }
            }
        }
    }
    out
}

/// Four-neighbours of node `k` with their parameters. Cylinder grids wrap
/// in `u`, so a wrapped neighbour's `u` is shifted by a full turn.
fn grid_neighbours(k: usize, us: &[f64], vs: &[f64], wraps: bool) -> Vec<(usize, (f64, f64))> {
    let (nu, nv) = (us.len(), vs.len());
    let (i, j) = (k % nu, k / nu);
    let mut out = Vec::with_capacity(4);
    if i + 1 < nu {
        out.push((k + 1, (us[i + 1], vs[j])));
    } else if wraps && nu > 1 {
        out.push((j * nu, (us[0] + TAU, vs[j])));
    }
    if i > 0 {
        out.push((k - 1, (us[i - 1], vs[j])));
    } else if wraps && nu > 1 {
        out.push((j * nu + nu - 1, (us[nu - 1] - TAU, vs[j])));
    }
    if j + 1 < nv {
        out.push((k + nu, (us[i], vs[j + 1])));
    }
    if j > 0 {
        out.push((k - nu, (us[i], vs[j - 1])));
    }
    out
}

#[derive(Default)]
struct FaceSamples {
    bbox: Option<BoundingBox>,
    uv_box: Option<Domain>,
    points: Vec<(Point3, (f64, f64))>,
}

impl FaceSamples {
    fn include(&mut self, p: Point3, uv: (f64, f64)) {
        let bbox = self.bbox.get_or_insert_with(BoundingBox::empty);
        bbox.include(&p);
        let cell = Domain::at(uv);
        self.uv_box = Some(self.uv_box.map_or(cell, |d| d.union(&cell)));
    }

    fn push(&mut self, p: Point3, uv: (f64, f64)) {
        self.include(p, uv);
        self.points.push((p, uv));
    }

    fn footprint(&self) -> Footprint {
        Footprint {
            domain: self.uv_box.unwrap_or(Domain::at((0.0, 0.0))),
            samples: self.points.iter().map(|(_, uv)| *uv).collect(),
        }
    }
}

/// Sample one group on a shared grid and split its boundary samples into
/// connected faces, positive orientation first.
///
/// Two neighboring samples join when the midpoint between them is on the
/// same side too; each sample next to a change of side is refined by
/// bisection to tighten its face's bounds.
fn sample_group(
    solid: &PrismSolid,
    group: &SurfaceGroup,
    stops: &[Point3],
) -> Vec<(i8, FaceSamples)> {
    let surface = &group.surface;
    let wraps = surface.is_cylinder();
    let classify = |u: f64, v: f64| side(solid, &surface.point(u, v), &surface.normal(u, v));
    let (u_stops, v_stops): (Vec<f64>, Vec<f64>) = stops.iter().map(|p| surface.params(p)).unzip();

    let (mut us, mut vs) = (Vec::new(), Vec::new());
    for domain in &group.domains {
        let mut nu = grid_cells((domain.u.1 - domain.u.0) * surface.u_scale());
        if wraps {
            nu = nu.max(CYLINDER_MIN_CELLS);
        }
        let u_cuts: &[f64] = if wraps { &[] } else { &u_stops };
        sample_axis(domain.u, nu, u_cuts, &mut us);
        sample_axis(domain.v, grid_cells(domain.v.1 - domain.v.0), &v_stops, &mut vs);
    }
    for line in [&mut us, &mut vs] {
        line.sort_by(f64::total_cmp);
        line.dedup_by(|a, b| (*a - *b).abs() < LINE_MERGE);
    }
    let nu = us.len();
    let classes: Vec<i8> = (0..nu * vs.len())
        .map(|k| classify(us[k % nu], vs[k / nu]))
        .collect();
    let wrap_u = |u: f64| if wraps { u.rem_euclid(TAU) } else { u };

    let mut component = vec![usize::MAX; classes.len()];
    let mut faces: Vec<(i8, FaceSamples)> = Vec::new();
    for orientation in [1i8, -1] {
        for seed in 0..classes.len() {
            if classes[seed] != orientation || component[seed] != usize::MAX {
                continue;
            }
            let id = faces.len();
            let mut samples = FaceSamples::default();
            component[seed] = id;
            let mut stack = vec![seed];
            while let Some(k) = stack.pop() {
                let (u, v) = (us[k % nu], vs[k / nu]);
                samples.push(surface.point(u, v), (u, v));
                for (n, (u1, v1)) in grid_neighbours(k, &us, &vs, wraps) {
                    let lerp = |t: f64| (u + (u1 - u) * t, v + (v1 - v) * t);
                    let on_face = |t: f64| {
                        let (a, b) = lerp(t);
                        classify(a, b) == orientation
                    };
                    let same = classes[n] == orientation;
                    let touching = ((u1 - u) * surface.u_scale()).hypot(v1 - v) < JOIN_GAP;
                    if same && (touching || on_face(0.5)) {
                        if component[n] == usize::MAX {
                            component[n] = id;
                            stack.push(n);
                        }
                        continue;
                    }
                    let bad = if same { 0.5 } else { 1.0 };
                    let (a, b) = lerp(bisect(on_face, 0.0, bad));
                    samples.include(surface.point(a, b), (wrap_u(a), b));
                }
            }
            faces.push((orientation, samples));
        }
    }
    faces
}

fn realize_face(
    id: KernelId,
    surface: &Surface,
    orientation: i8,
    samples: &FaceSamples,
    bbox: BoundingBox,
) -> BrepFace {
    let center = bbox.center();
    let nearest = samples
        .points
        .iter()
        .min_by(|a, b| (a.0 - center).norm().total_cmp(&(b.0 - center).norm()));
    match surface {
        Surface::Plane(frame) => {
            let mut realized = if orientation > 0 {
                *frame
            } else {
                frame.flipped()
            };
            realized.origin = realized.project(&Point3::origin());
            let uv_center = nearest
                .map(|(p, _)| {
                    let uv = realized.to_local(p);
                    (uv.x, uv.y)
                })
                .unwrap_or((0.0, 0.0));
            BrepFace {
                id,
                surface: SurfaceKind::Planar { frame: realized },
                bbox,
                vertices: Vec::new(),
                uv_center,
            }
        }
        Surface::Cylinder {
            base,
            axis,
            x_ref,
            y_ref,
            radius,
        } => BrepFace {
            id,
            surface: SurfaceKind::Cylindrical {
                base: *base,
                axis: *axis,
                x_ref: *x_ref,
                y_ref: *y_ref,
                radius: *radius,
                outward: orientation > 0,
            },
            bbox,
            vertices: Vec::new(),
            uv_center: nearest.map(|(_, uv)| *uv).unwrap_or((0.0, 0.0)),
        },
    }
}

fn extract_faces(
    solid: &PrismSolid,
    handle: &KernelSolidHandle,
    groups: &[SurfaceGroup],
) -> Vec<FaceRecord> {
    let stops = breakpoints(solid);
    let mut faces = Vec::new();
    for (g, group) in groups.iter().enumerate() {
        for (orientation, s) in sample_group(solid, group, &stops) {
            let Some(bbox) = s.bbox else {
                continue;
            };
            let id = KernelId::face(handle, faces.len());
            faces.push(FaceRecord {
                face: realize_face(id, &group.surface, orientation, &s, bbox),
                group: g,
                orientation,
                footprint: s.footprint(),
            });
        }
    }
    faces
}

/// Clip the line `p0 + t·d` to the intersection of padded boxes.
fn clip_line(p0: &Point3, d: &Vector3, boxes: [&BoundingBox; 2]) -> Option<(f64, f64)> {
    let (mut lo, mut hi) = (f64::NEG_INFINITY, f64::INFINITY);
    for b in boxes {
        for k in 0..3 {
            let (mn, mx) = (b.min[k] - CLIP_PAD, b.max[k] + CLIP_PAD);
            if d[k].abs() < 1e-12 {
                if p0[k] < mn || p0[k] > mx {
                    return None;
                }
            } else {
                let (ta, tb) = ((mn - p0[k]) / d[k], (mx - p0[k]) / d[k]);
                lo = lo.max(ta.min(tb));
                hi = hi.min(ta.max(tb));
            }
        }
    }
    (hi - lo > MIN_EDGE_LENGTH).then_some((lo, hi))
}

/// Maximal runs of equal crease class along `[t0, t1]`, endpoints refined.
fn crease_runs(t0: f64, t1: f64, classify: impl Fn(f64) -> Option<bool>) -> Vec<(f64, f64, bool)> {
    let cells = (((t1 - t0) / EDGE_PITCH).ceil() as usize).clamp(4, EDGE_MAX_SAMPLES);
    let ts = sample_line(t0, t1, cells);
    let classes: Vec<Option<bool>> = ts.iter().map(|&t| classify(t)).collect();
    let mut runs = Vec::new();
    let mut k = 0;
    while k < ts.len() {
        let Some(c) = classes[k] else {
            k += 1;
            continue;
        };
        let mut e = k;
        while e + 1 < ts.len() && classes[e + 1] == Some(c) {
            e += 1;
        }
        let same = |t: f64| classify(t) == Some(c);
        let start = if k == 0 {
            ts[0]
        } else {
            bisect(same, ts[k], ts[k - 1])
        };
        let end = if e + 1 == ts.len() {
            ts[e]
        } else {
            bisect(same, ts[e], ts[e + 1])
        };
        if end - start > MIN_EDGE_LENGTH {
            runs.push((start, end, c));
        }
        k = e + 1;
    }
    runs
}

fn plane_plane_edges(
    solid: &PrismSolid,
    a: &Placement,
    b: &Placement,
    boxes: [&BoundingBox; 2],
) -> Vec<(CurveKind, bool)> {
    let (na, nb) = (a.normal, b.normal);
    let w = na.cross(&nb);
    if w.norm() < 1e-6 {
        return Vec::new();
    }
    let (ha, hb) = (na.dot(&a.origin.coords), nb.dot(&b.origin.coords));
    let p0 = Point3::from((nb * ha - na * hb).cross(&w) / w.norm_squared());
    let d = w.normalize();
    let Some((t0, t1)) = clip_line(&p0, &d, boxes) else {
        return Vec::new();
    };
    crease_runs(t0, t1, |t| crease(solid, &(p0 + d * t), &na, &nb))
        .into_iter()
        .map(|(s, e, convex)| {
            (
                CurveKind::Line {
                    start: p0 + d * s,
                    end: p0 + d * e,
                },
                convex,
            )
        })
        .collect()
}

struct CylinderFace {
    base: Point3,
    axis: Vector3,
    x_ref: Vector3,
    y_ref: Vector3,
    radius: f64,
    outward: bool,
}

fn plane_cylinder_edges(
    solid: &PrismSolid,
    plane: &Placement,
    cyl: &CylinderFace,
) -> Vec<(CurveKind, bool)> {
    let n = plane.normal;
    let c = n.dot(&cyl.axis);
    if c.abs() < 1.0 - PARALLEL {
        return Vec::new();
    }
    let t = (n.dot(&plane.origin.coords) - n.dot(&cyl.base.coords)) / c;
    let center = cyl.base + cyl.axis * t;
    let radial = |theta: f64| cyl.x_ref * theta.cos() + cyl.y_ref * theta.sin();
    let classify = |theta: f64| {
        let r = radial(theta);
        let outward = if cyl.outward { r } else { -r };
        crease(solid, &(center + r * cyl.radius), &n, &outward)
    };

    let m = ((TAU * cyl.radius / EDGE_PITCH).ceil() as usize).clamp(ARC_MIN_SAMPLES, ARC_MAX_SAMPLES);
    let step = TAU / m as f64;
    let classes: Vec<Option<bool>> = (0..m).map(|k| classify(k as f64 * step)).collect();
    let arc = |start_angle: f64, sweep: f64| CurveKind::Arc {
        center,
        axis: cyl.axis,
        x_ref: cyl.x_ref,
        y_ref: cyl.y_ref,
        radius: cyl.radius,
        start_angle,
        sweep,
    };

    if classes.iter().all(|c| *c == classes[0]) {
        return match classes[0] {
            Some(convex) => vec![(arc(0.0, TAU), convex)],
            None => Vec::new(),
        };
    }

    // Start scanning at a class change so no run wraps around the seam.
    let k0 = (0..m)
        .find(|&k| classes[k] != classes[(k + m - 1) % m])
        .unwrap_or(0);
    let mut out = Vec::new();
    let mut offset = 0;
    while offset < m {
        let idx = (k0 + offset) % m;
        let Some(convex) = classes[idx] else {
            offset += 1;
            continue;
        };
        let mut end = offset;
        while end + 1 < m && classes[(k0 + end + 1) % m] == Some(convex) {
            end += 1;
        }
        let same = |theta: f64| classify(theta) == Some(convex);
        let a0 = (k0 + offset) as f64 * step;
        let a1 = (k0 + end) as f64 * step;
        let start = bisect(same, a0, a0 - step);
        let stop = bisect(same, a1, a1 + step);
        if (stop - start) * cyl.radius > MIN_EDGE_LENGTH {
            out.push((arc(start, stop - start), convex));
        }
        offset = end + 1;
    }
    out
}

/// Whether the point `p` on face `f`'s surface belongs to `f` rather than
/// to a coplanar sibling.
fn owns(
    faces: &[FaceRecord],
    groups: &[SurfaceGroup],
    siblings: &[usize],
    f: usize,
    p: &Point3,
) -> bool {
    if siblings.len() < 2 {
        return true;
    }
    let surface = &groups[faces[f].group].surface;
    owner(faces, siblings, surface.params(p), surface.u_scale()) == Some(f)
}

fn extract_edges(
    solid: &PrismSolid,
    handle: &KernelSolidHandle,
    groups: &[SurfaceGroup],
    faces: &[FaceRecord],
) -> Vec<EdgeRecord> {
    let family: Vec<Vec<usize>> = (0..faces.len()).map(|f| siblings(faces, f)).collect();
    let mut edges = Vec::new();
    for i in 0..faces.len() {
        for j in (i + 1)..faces.len() {
            let (fa, fb) = (&faces[i].face, &faces[j].face);
            if !fa.bbox.overlaps(&fb.bbox, CLIP_PAD) {
                continue;
            }
            let found = match (&fa.surface, &fb.surface) {
                (SurfaceKind::Planar { frame: a }, SurfaceKind::Planar { frame: b }) => {
                    plane_plane_edges(solid, a, b, [&fa.bbox, &fb.bbox])
                }
                (SurfaceKind::Planar { frame }, cyl @ SurfaceKind::Cylindrical { .. })
                | (cyl @ SurfaceKind::Cylindrical { .. }, SurfaceKind::Planar { frame }) => {
                    match cylinder_face(cyl) {
                        Some(c) => plane_cylinder_edges(solid, frame, &c),
                        None => Vec::new(),
                    }
                }
                _ => Vec::new(),
            };
            for (curve, convex) in found {
                let mid = curve.point_at(0.5);
                if !owns(faces, groups, &family[i], i, &mid)
                    || !owns(faces, groups, &family[j], j, &mid)
                {
                    continue;
                }
                let id = KernelId::edge(handle, edges.len());
                edges.push(EdgeRecord {
                    edge: BrepEdge { id, curve },
                    faces: [i, j],
                    convex,
                });
            }
        }
    }
    edges
}

fn cylinder_face(surface: &SurfaceKind) -> Option<CylinderFace> {
    match surface {
        SurfaceKind::Cylindrical {
            base,
            axis,
            x_ref,
            y_ref,
            radius,
            outward,
        } => Some(CylinderFace {
            base: *base,
            axis: *axis,
            x_ref: *x_ref,
            y_ref: *y_ref,
            radius: *radius,
            outward: *outward,
        }),
        SurfaceKind::Planar { .. } => None,
    }
}

fn attach_vertices(faces: &mut [FaceRecord], edges: &[EdgeRecord]) {
    for edge in edges {
        let ends = match &edge.edge.curve {
            CurveKind::Line { start, end } => vec![*start, *end],
            CurveKind::Arc { sweep, .. } if sweep.abs() < TAU - 1e-9 => {
                vec![edge.edge.curve.point_at(0.0), edge.edge.curve.point_at(1.0)]
            }
            CurveKind::Arc { .. } => Vec::new(),
        };
        for &f in &edge.faces {
            let vertices = &mut faces[f].face.vertices;
            for p in &ends {
                if !vertices.iter().any(|q| (q - p).norm() < 1e-6) {
                    vertices.push(*p);
                }
            }
        }
    }
}

/// Extract the full boundary of `solid`. Ids are encoded against `handle`.
pub(crate) fn extract(solid: &PrismSolid, handle: &KernelSolidHandle) -> Boundary {
    let groups = surface_groups(solid);
    let mut faces = extract_faces(solid, handle, &groups);
    let edges = extract_edges(solid, handle, &groups, &faces);
    attach_vertices(&mut faces, &edges);
    let bbox = faces
        .iter()
        .fold(BoundingBox::empty(), |acc, f| acc.union(&f.face.bbox));
    Boundary {
        groups,
        faces,
        edges,
        bbox,
    }
}
