//! Fail-fast design builds.
//!
//! Bodies are built in declaration order. A failing body stops at its first
//! failing feature; independent bodies still build, mirrors of a failed
//! source are skipped. Exports only happen when every body succeeded.

use std::fmt;
use std::path::{Path, PathBuf};

use feature_engine::{mirror_body, Body};
use file_format::{export_body, ExportError};
use forge_types::{ParamError, ParameterSet, Point3, Vector3};
use kernel_bridge::{Deflection, Kernel};
use modeling_ops::KernelBundle;
use tracing::{error, info, instrument};

use crate::errors::RecipeError;

/// A body built from the parameter set alone.
pub trait BodyRecipe {
    fn name(&self) -> &str;

    fn build(&self, params: &ParameterSet, kb: &mut dyn KernelBundle) -> Result<Body, RecipeError>;
}

/// Mirror plane derived from parameters: a point on the plane and its normal.
pub type MirrorPlane = fn(&ParameterSet) -> Result<(Point3, Vector3), ParamError>;

/// A body produced by reflecting an already-built body.
pub struct MirrorRecipe {
    pub name: String,
    pub source: String,
    pub plane: MirrorPlane,
}

impl MirrorRecipe {
    fn feature_name(&self) -> String {
        format!("Mirror of {}", self.source)
    }

    fn build(
        &self,
        source: &Body,
        params: &ParameterSet,
        kb: &mut dyn KernelBundle,
    ) -> Result<Body, RecipeError> {
        let (point, normal) = (self.plane)(params)?;
        Ok(mirror_body(kb, source, &self.name, point, normal)?)
    }
}

pub enum BodyPlan {
    Recipe(Box<dyn BodyRecipe>),
    Mirror(MirrorRecipe),
}

impl BodyPlan {
    pub fn name(&self) -> &str {
        match self {
            BodyPlan::Recipe(recipe) => recipe.name(),
            BodyPlan::Mirror(mirror) => &mirror.name,
        }
    }
}

/// One body of a design and the file stem it exports to.
pub struct PlannedBody {
    pub plan: BodyPlan,
    pub export_name: String,
}

impl PlannedBody {
    pub fn recipe(recipe: impl BodyRecipe + 'static, export_name: impl Into<String>) -> Self {
        Self {
            plan: BodyPlan::Recipe(Box::new(recipe)),
            export_name: export_name.into(),
        }
    }

    pub fn mirror(
        name: impl Into<String>,
        source: impl Into<String>,
        plane: MirrorPlane,
        export_name: impl Into<String>,
    ) -> Self {
        Self {
            plan: BodyPlan::Mirror(MirrorRecipe {
                name: name.into(),
                source: source.into(),
                plane,
            }),
            export_name: export_name.into(),
        }
    }
}

/// A complete design: its parameters, bodies and export tolerances.
pub struct Design {
    pub name: String,
    pub parameters: ParameterSet,
    pub bodies: Vec<PlannedBody>,
    pub deflection: Deflection,
}

/// Where and why one body stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildFailure {
    pub body: String,
    pub feature: String,
    pub message: String,
}

impl BuildFailure {
    fn new(body: &str, feature: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            body: body.to_string(),
            feature: feature.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "body '{}' failed at feature '{}': {}",
            self.body, self.feature, self.message
        )
    }
}

#[derive(Debug, Clone)]
pub struct BuiltBody {
    pub body: Body,
    pub export_name: String,
}

/// Outcome of [`build_design`].
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub design: String,
    pub bodies: Vec<BuiltBody>,
    pub failures: Vec<BuildFailure>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies
            .iter()
            .map(|b| &b.body)
            .find(|b| b.name() == name)
    }

    /// Plain-text summary: one line per body, warnings and failures.
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "Design '{}': {} built, {} failed\n",
            self.design,
            self.bodies.len(),
            self.failures.len()
        );
        for built in &self.bodies {
            out.push_str(&format!(
                "  {} ({} features) -> {}.stl\n",
                built.body.name(),
                built.body.features().len(),
                built.export_name
            ));
            for warning in built.body.warnings() {
                out.push_str(&format!("      warning: {warning}\n"));
            }
        }
        for failure in &self.failures {
            out.push_str(&format!("  FAILED: {failure}\n"));
        }
        out
    }
}

fn failure(body: &str, err: &RecipeError, mirror_feature: Option<String>) -> BuildFailure {
    match err {
        RecipeError::Feature(e) => BuildFailure::new(body, e.feature.clone(), e.error.to_string()),
        RecipeError::Parameter(e) => BuildFailure::new(body, "parameters", e.to_string()),
        other => BuildFailure::new(
            body,
            mirror_feature.unwrap_or_else(|| "build".to_string()),
            other.to_string(),
        ),
    }
}

/// Build every body of `design` in order.
#[instrument(skip_all, fields(design = %design.name))]
pub fn build_design(design: &Design, kb: &mut dyn KernelBundle) -> BuildReport {
    let mut report = BuildReport {
        design: design.name.clone(),
        ..BuildReport::default()
    };

    for planned in &design.bodies {
        let name = planned.plan.name();
        let (outcome, mirror_feature) = match &planned.plan {
            BodyPlan::Recipe(recipe) => (recipe.build(&design.parameters, kb), None),
            BodyPlan::Mirror(mirror) => {
                let outcome = match report.body(&mirror.source) {
                    Some(source) => mirror.build(source, &design.parameters, kb),
                    None => Err(RecipeError::MissingSource {
                        body: mirror.source.clone(),
                    }),
                };
                (outcome, Some(mirror.feature_name()))
            }
        };
        match outcome {
            Ok(body) => {
                info!(body = name, features = body.features().len(), "body built");
                report.bodies.push(BuiltBody {
                    body,
                    export_name: planned.export_name.clone(),
                });
            }
            Err(err) => {
                let failure = failure(name, &err, mirror_feature);
                error!(body = name, feature = %failure.feature, "{}", failure.message);
                report.failures.push(failure);
            }
        }
    }
    report
}

/// Tessellate every built body to `<dir>/<export_name>.stl` and seal it.
///
/// Refuses to write anything when the build recorded a failure.
pub fn export_design<K: Kernel>(
    report: &mut BuildReport,
    kernel: &mut K,
    deflection: Deflection,
    dir: &Path,
) -> Result<Vec<PathBuf>, RecipeError> {
    if !report.is_success() {
        return Err(RecipeError::BuildFailed {
            failures: report.failures.len(),
        });
    }
    std::fs::create_dir_all(dir).map_err(|e| RecipeError::Io {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut written = Vec::with_capacity(report.bodies.len());
    for built in &mut report.bodies {
        let tip = built.body.tip().ok_or_else(|| ExportError::NoSolid {
            body: built.body.name().to_string(),
        })?;
        let path = dir.join(format!("{}.stl", built.export_name));
        export_body(kernel, &tip, deflection, &path)?;
        built.body.seal();
        written.push(path);
    }
    info!(files = written.len(), dir = %dir.display(), "design exported");
    Ok(written)
}
