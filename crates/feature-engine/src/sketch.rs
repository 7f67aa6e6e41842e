//! Turning a [`Sketch`] into a concrete placement and profile set.

use forge_types::{Placement, Profile};
use kernel_bridge::{FaceGeometry, KernelIntrospect, KernelSolidHandle};
use sketch_profiles::validate_loops;

use crate::select::select_face;
use crate::types::{EngineError, ProfileFrame, Sketch, SketchPlacement};

/// Parallelism tolerance between an authoring datum and the sketch plane.
const PARALLEL_TOLERANCE: f64 = 1e-9;

/// A sketch bound to the current tip: the realized frame plus profiles in
/// that frame's coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSketch {
    pub placement: Placement,
    pub profiles: Vec<Profile>,
}

/// Resolve `sketch` against `tip`.
///
/// Face placements use the selected face's realized frame, so its axis
/// signs come from the face orientation the kernel reports now, not from
/// any assumption made when the sketch was written.
pub fn resolve_sketch(
    kernel: &dyn KernelIntrospect,
    tip: Option<&KernelSolidHandle>,
    sketch: &Sketch,
) -> Result<ResolvedSketch, EngineError> {
    validate_loops(&sketch.profiles)?;

    let placement = match &sketch.placement {
        SketchPlacement::Datum { plane, offset } => Placement::datum(*plane).offset(*offset),
        SketchPlacement::Face { query, offset } => {
            let tip = tip.ok_or_else(|| EngineError::InvalidParameter {
                reason: "a face placement needs an existing solid".to_string(),
            })?;
            let face = select_face(kernel, tip, query)?;
            let frame = face.frame().ok_or_else(|| EngineError::InvalidGeometry {
                reason: format!("selected face {} is not planar", face.id.0),
            })?;
            frame.offset(*offset)
        }
    };

    let profiles = match sketch.frame {
        ProfileFrame::Local => sketch.profiles.clone(),
        ProfileFrame::Datum { plane } => {
            let authoring = Placement::datum(plane);
            if (authoring.normal.dot(&placement.normal).abs() - 1.0).abs() > PARALLEL_TOLERANCE {
                return Err(EngineError::InvalidGeometry {
                    reason: format!("datum {plane:?} is not parallel to the sketch plane"),
                });
            }
            sketch
                .profiles
                .iter()
                .map(|p| p.map_points(|uv| placement.remap_from(&authoring, uv)))
                .collect()
        }
    };

    Ok(ResolvedSketch {
        placement,
        profiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use forge_types::{DatumPlane, Point2};
    use kernel_bridge::PrismKernel;

    #[test]
    fn test_datum_sketch_is_offset() {
        let kernel = PrismKernel::new();
        let sketch = Sketch::on_datum(
            DatumPlane::XY,
            -3.0,
            vec![Profile::Circle {
                center: Point2::new(1.0, 2.0),
                radius: 1.0,
            }],
        );
        let resolved = resolve_sketch(&kernel, None, &sketch).unwrap();
        assert_relative_eq!(resolved.placement.origin.z, -3.0);
        assert_eq!(resolved.profiles, sketch.profiles);
    }

    #[test]
    fn test_face_placement_needs_tip() {
        let kernel = PrismKernel::new();
        let sketch = Sketch::on_face(
            forge_types::FaceQuery::facing(forge_types::Vector3::z()),
            vec![Profile::Circle {
                center: Point2::new(0.0, 0.0),
                radius: 1.0,
            }],
        );
        assert!(matches!(
            resolve_sketch(&kernel, None, &sketch),
            Err(EngineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_non_parallel_datum_rejected() {
        let kernel = PrismKernel::new();
        let sketch = Sketch::on_datum(
            DatumPlane::XY,
            0.0,
            vec![Profile::Circle {
                center: Point2::new(0.0, 0.0),
                radius: 1.0,
            }],
        )
        .authored_in(DatumPlane::YZ);
        assert!(matches!(
            resolve_sketch(&kernel, None, &sketch),
            Err(EngineError::InvalidGeometry { .. })
        ));
    }
}
