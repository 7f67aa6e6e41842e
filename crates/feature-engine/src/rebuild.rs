use forge_types::{Point3, Vector3};
use kernel_bridge::{EdgeGeometry, KernelSolidHandle};
use modeling_ops::{execute_fillet, execute_mirror, execute_pad, execute_pocket, KernelBundle};
use tracing::{debug, info};

use crate::select::select_edges;
use crate::sketch::resolve_sketch;
use crate::tree::Body;
use crate::types::{EngineError, Feature, FeatureError, Operation};

/// What one feature produced.
#[derive(Debug, Clone)]
pub(crate) struct Outcome {
    pub tip: KernelSolidHandle,
    pub warnings: Vec<String>,
}

fn positive(what: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidParameter {
            reason: format!("{what} must be positive, got {value}"),
        })
    }
}

fn existing(tip: Option<KernelSolidHandle>, what: &str) -> Result<KernelSolidHandle, EngineError> {
    tip.ok_or_else(|| EngineError::InvalidParameter {
        reason: format!("{what} needs an existing solid"),
    })
}

/// Execute one operation against the current tip.
pub(crate) fn execute_operation(
    kb: &mut dyn KernelBundle,
    tip: Option<KernelSolidHandle>,
    operation: &Operation,
) -> Result<Outcome, EngineError> {
    let result = match operation {
        Operation::Pad {
            sketch,
            distance,
            reversed,
        } => {
            positive("pad distance", *distance)?;
            let resolved = resolve_sketch(kb.as_introspect(), tip.as_ref(), sketch)?;
            execute_pad(
                kb,
                tip.as_ref(),
                &resolved.placement,
                &resolved.profiles,
                *distance,
                *reversed,
            )?
        }
        Operation::Pocket {
            sketch,
            extent,
            reversed,
        } => {
            let target = existing(tip, "pocket")?;
            let resolved = resolve_sketch(kb.as_introspect(), Some(&target), sketch)?;
            execute_pocket(
                kb,
                &target,
                &resolved.placement,
                &resolved.profiles,
                *extent,
                *reversed,
            )?
        }
        Operation::Fillet { edges, radius } => {
            let target = existing(tip, "fillet")?;
            positive("fillet radius", *radius)?;
            let selected = select_edges(kb.as_introspect(), &target, edges)?;
            debug!(edges = selected.len(), radius, "fillet edges selected");
            let ids: Vec<_> = selected.iter().map(|e| e.id()).collect();
            execute_fillet(kb, &target, &ids, *radius)?
        }
        Operation::Mirror {
            source,
            source_features,
            point,
            normal,
        } => {
            if tip.is_some() {
                return Err(EngineError::InvalidParameter {
                    reason: "mirror must be the first feature of a body".to_string(),
                });
            }
            let original = recompute(source, source_features, kb).map_err(|e| e.error)?;
            let source_tip = existing(original.tip(), "mirror source")?;
            execute_mirror(kb, &source_tip, point, normal)?
        }
    };
    Ok(Outcome {
        tip: result.handle,
        warnings: result.diagnostics.warnings,
    })
}

/// Rebuild a body from its feature history alone.
///
/// Features keep their ids. The first failing feature aborts the replay.
pub fn recompute(
    name: &str,
    features: &[Feature],
    kb: &mut dyn KernelBundle,
) -> Result<Body, FeatureError> {
    let mut body = Body::new(name);
    for feature in features {
        body.push(kb, feature.clone())?;
    }
    info!(body = name, features = features.len(), "body recomputed");
    Ok(body)
}

/// Reflect a finished body across the plane through `point` with `normal`.
///
/// The result is a new, independent body whose single feature records the
/// mirror and a copy of the source history.
pub fn mirror_body(
    kb: &mut dyn KernelBundle,
    source: &Body,
    name: &str,
    point: Point3,
    normal: Vector3,
) -> Result<Body, FeatureError> {
    let feature_name = format!("Mirror of {}", source.name());
    let source_tip = existing(source.tip(), "mirror source")
        .map_err(|e| FeatureError::new(feature_name.clone(), e))?;
    let result = execute_mirror(kb, &source_tip, &point, &normal)
        .map_err(|e| FeatureError::new(feature_name.clone(), e))?;
    let feature = Feature {
        id: uuid::Uuid::new_v4(),
        name: feature_name,
        operation: Operation::Mirror {
            source: source.name().to_string(),
            source_features: source.features().to_vec(),
            point,
            normal,
        },
    };
    info!(body = name, source = source.name(), "body mirrored");
    Ok(Body::from_parts(name, vec![feature], result.handle))
}
