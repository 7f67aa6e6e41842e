//! ModelBuilder: fluent API for scripting single-body workflows in tests.
//!
//! Drives the real `Body` feature path against a `PrismKernel`. Failed
//! features are recorded by name so a report can show them alongside the
//! history that did succeed.

use feature_engine::{mirror_body, recompute, Body, Sketch};
use forge_types::{BoundingBox, DatumPlane, EdgeQuery, Point3, Profile, Vector3};
use kernel_bridge::{
    Deflection, Kernel, KernelIntrospect, KernelSolidHandle, PrismKernel, RenderMesh,
};
use modeling_ops::PocketExtent;
use uuid::Uuid;

use crate::helpers::HarnessError;
use crate::oracle::{self, OracleVerdict};

/// A fluent builder for constructing and verifying one body in tests.
pub struct ModelBuilder {
    pub(crate) kernel: PrismKernel,
    pub(crate) body: Body,
    pub(crate) errors: Vec<(String, String)>,
}

impl ModelBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            kernel: PrismKernel::new(),
            body: Body::new(name),
            errors: Vec::new(),
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn kernel(&self) -> &PrismKernel {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut PrismKernel {
        &mut self.kernel
    }

    /// Features that failed, with their error messages, in call order.
    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    fn record<T>(
        &mut self,
        name: &str,
        result: Result<T, feature_engine::FeatureError>,
    ) -> Result<T, HarnessError> {
        result.map_err(|e| {
            self.errors.push((name.to_string(), e.error.to_string()));
            HarnessError::Feature(e)
        })
    }

    // ── Features ────────────────────────────────────────────────────────

    pub fn pad(
        &mut self,
        name: &str,
        sketch: Sketch,
        distance: f64,
        reversed: bool,
    ) -> Result<Uuid, HarnessError> {
        let result = self
            .body
            .add_pad(&mut self.kernel, name, sketch, distance, reversed);
        self.record(name, result)
    }

    /// Pad profiles drawn on a datum plane in one call.
    pub fn pad_on(
        &mut self,
        name: &str,
        plane: DatumPlane,
        offset: f64,
        profiles: Vec<Profile>,
        distance: f64,
    ) -> Result<Uuid, HarnessError> {
        self.pad(name, Sketch::on_datum(plane, offset, profiles), distance, false)
    }

    pub fn pocket(
        &mut self,
        name: &str,
        sketch: Sketch,
        extent: PocketExtent,
        reversed: bool,
    ) -> Result<Uuid, HarnessError> {
        let result = self
            .body
            .add_pocket(&mut self.kernel, name, sketch, extent, reversed);
        self.record(name, result)
    }

    pub fn fillet(
        &mut self,
        name: &str,
        edges: EdgeQuery,
        radius: f64,
    ) -> Result<Uuid, HarnessError> {
        let result = self.body.add_fillet(&mut self.kernel, name, edges, radius);
        self.record(name, result)
    }

    /// Mirror the current body into a new, independent body sharing this
    /// builder's kernel.
    pub fn mirror(
        &mut self,
        name: &str,
        point: Point3,
        normal: Vector3,
    ) -> Result<Body, HarnessError> {
        let result = mirror_body(&mut self.kernel, &self.body, name, point, normal);
        self.record(name, result)
    }

    /// Rebuild the current history from scratch into a fresh body.
    pub fn recompute(&mut self) -> Result<Body, HarnessError> {
        let features = self.body.features().to_vec();
        Ok(recompute(self.body.name(), &features, &mut self.kernel)?)
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn solid(&self) -> Result<KernelSolidHandle, HarnessError> {
        self.body.tip().ok_or_else(|| HarnessError::NoSolid {
            name: self.body.name().to_string(),
        })
    }

    pub fn contains(&self, point: Point3) -> Result<bool, HarnessError> {
        Ok(self.kernel.contains(&self.solid()?, &point)?)
    }

    pub fn volume(&self) -> Result<f64, HarnessError> {
        Ok(self.kernel.volume(&self.solid()?)?)
    }

    pub fn bounding_box(&self) -> Result<BoundingBox, HarnessError> {
        Ok(self.kernel.bounding_box(&self.solid()?)?)
    }

    pub fn mesh(&mut self, deflection: Deflection) -> Result<RenderMesh, HarnessError> {
        let solid = self.solid()?;
        Ok(self.kernel.tessellate(&solid, deflection)?)
    }

    // ── Inline Checks ───────────────────────────────────────────────────

    /// Check that the box `[min, max]` holds no material.
    pub fn check_void(
        &self,
        min: Point3,
        max: Point3,
        samples: usize,
    ) -> Result<OracleVerdict, HarnessError> {
        Ok(oracle::check_void_box(&self.kernel, &self.solid()?, min, max, samples))
    }

    /// Check that every point lies in material.
    pub fn check_solid(&self, points: &[Point3]) -> Result<OracleVerdict, HarnessError> {
        Ok(oracle::check_solid_points(&self.kernel, &self.solid()?, points))
    }
}
