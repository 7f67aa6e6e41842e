use forge_types::EdgeQuery;
use kernel_bridge::KernelSolidHandle;
use modeling_ops::{KernelBundle, PocketExtent};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::rebuild::execute_operation;
use crate::types::{EngineError, Feature, FeatureError, Operation, Sketch};

/// A named, append-only feature history and its current tip.
///
/// A feature is recorded only after it succeeds, so a failed step leaves
/// both the history and the tip exactly as they were.
#[derive(Debug, Clone)]
pub struct Body {
    name: String,
    features: Vec<Feature>,
    tip: Option<KernelSolidHandle>,
    warnings: Vec<String>,
    sealed: bool,
}

impl Body {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
            tip: None,
            warnings: Vec::new(),
            sealed: false,
        }
    }

    pub(crate) fn from_parts(
        name: impl Into<String>,
        features: Vec<Feature>,
        tip: KernelSolidHandle,
    ) -> Self {
        Self {
            name: name.into(),
            features,
            tip: Some(tip),
            warnings: Vec::new(),
            sealed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Current resultant solid, `None` before the first pad.
    pub fn tip(&self) -> Option<KernelSolidHandle> {
        self.tip
    }

    /// Non-fatal warnings collected while building.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Mark the body terminal. Every later mutation fails.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Append and execute a new feature.
    pub fn apply(
        &mut self,
        kb: &mut dyn KernelBundle,
        name: &str,
        operation: Operation,
    ) -> Result<Uuid, FeatureError> {
        self.push(
            kb,
            Feature {
                id: Uuid::new_v4(),
                name: name.to_string(),
                operation,
            },
        )
    }

    pub(crate) fn push(
        &mut self,
        kb: &mut dyn KernelBundle,
        feature: Feature,
    ) -> Result<Uuid, FeatureError> {
        if self.sealed {
            return Err(FeatureError::new(
                feature.name,
                EngineError::SealedBody {
                    body: self.name.clone(),
                },
            ));
        }
        let outcome = execute_operation(kb, self.tip, &feature.operation)
            .map_err(|e| FeatureError::new(feature.name.clone(), e))?;
        for warning in &outcome.warnings {
            warn!(body = %self.name, feature = %feature.name, "{warning}");
            self.warnings.push(format!("{}: {warning}", feature.name));
        }
        info!(
            body = %self.name,
            feature = %feature.name,
            kind = feature.operation.kind(),
            tip = outcome.tip.id(),
            "feature applied"
        );
        self.tip = Some(outcome.tip);
        let id = feature.id;
        self.features.push(feature);
        Ok(id)
    }

    /// Extrude the sketch by `distance` along its plane normal, or against
    /// it when `reversed`. The first pad of a body creates the solid.
    #[instrument(skip(self, kb, sketch), fields(body = %self.name))]
    pub fn add_pad(
        &mut self,
        kb: &mut dyn KernelBundle,
        name: &str,
        sketch: Sketch,
        distance: f64,
        reversed: bool,
    ) -> Result<Uuid, FeatureError> {
        self.apply(
            kb,
            name,
            Operation::Pad {
                sketch,
                distance,
                reversed,
            },
        )
    }

    /// Subtract the swept sketch from the tip.
    #[instrument(skip(self, kb, sketch), fields(body = %self.name))]
    pub fn add_pocket(
        &mut self,
        kb: &mut dyn KernelBundle,
        name: &str,
        sketch: Sketch,
        extent: PocketExtent,
        reversed: bool,
    ) -> Result<Uuid, FeatureError> {
        self.apply(
            kb,
            name,
            Operation::Pocket {
                sketch,
                extent,
                reversed,
            },
        )
    }

    /// Round every tip edge matching `edges`. Matching nothing records a
    /// warning and leaves the tip unchanged.
    #[instrument(skip(self, kb, edges), fields(body = %self.name))]
    pub fn add_fillet(
        &mut self,
        kb: &mut dyn KernelBundle,
        name: &str,
        edges: EdgeQuery,
        radius: f64,
    ) -> Result<Uuid, FeatureError> {
        self.apply(kb, name, Operation::Fillet { edges, radius })
    }
}
