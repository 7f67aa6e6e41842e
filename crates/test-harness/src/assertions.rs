//! Rich assertion helpers with diagnostic output.
//!
//! Every failure names the context, expected vs actual, and the body's
//! feature history when one is involved.

use feature_engine::Body;
use kernel_bridge::RenderMesh;

use crate::helpers::HarnessError;
use crate::oracle::OracleVerdict;

/// Turn a verdict into `Ok` or an `OracleFailure`.
pub fn assert_verdict(verdict: OracleVerdict, ctx: &str) -> Result<OracleVerdict, HarnessError> {
    if verdict.passed {
        Ok(verdict)
    } else {
        Err(HarnessError::OracleFailure {
            oracle: verdict.oracle_name,
            detail: format!("[{ctx}] {}", verdict.detail),
        })
    }
}

/// Fail on the first failing verdict of a batch.
pub fn assert_all_pass(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    let failed: Vec<String> = verdicts
        .iter()
        .filter(|v| !v.passed)
        .map(|v| format!("  {}: {}", v.oracle_name, v.detail))
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] {} of {} checks failed:\n{}",
                failed.len(),
                verdicts.len(),
                failed.join("\n")
            ),
        })
    }
}

/// Assert the mesh bounding box matches expected values within tolerance.
pub fn assert_bounding_box(
    mesh: &RenderMesh,
    expected_min: [f32; 3],
    expected_max: [f32; 3],
    tol: f32,
    ctx: &str,
) -> Result<(), HarnessError> {
    let (actual_min, actual_max) = crate::helpers::mesh_bounding_box(mesh);

    for i in 0..3 {
        if (actual_min[i] - expected_min[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] bounding box min[{}]: expected {:.3}, got {:.3} (tol={})",
                    ctx, i, expected_min[i], actual_min[i], tol,
                ),
            });
        }
        if (actual_max[i] - expected_max[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] bounding box max[{}]: expected {:.3}, got {:.3} (tol={})",
                    ctx, i, expected_max[i], actual_max[i], tol,
                ),
            });
        }
    }
    Ok(())
}

/// Assert the body's history matches expected (name, kind) pairs.
pub fn assert_history(body: &Body, expected: &[(&str, &str)]) -> Result<(), HarnessError> {
    let actual: Vec<(String, &str)> = body
        .features()
        .iter()
        .map(|f| (f.name.clone(), f.operation.kind()))
        .collect();

    if actual.len() != expected.len() {
        return Err(HarnessError::AssertionFailed {
            detail: format!(
                "'{}' history length mismatch: expected {}, got {}.\nActual: {:?}",
                body.name(),
                expected.len(),
                actual.len(),
                actual,
            ),
        });
    }

    for (i, ((act_name, act_kind), (exp_name, exp_kind))) in
        actual.iter().zip(expected.iter()).enumerate()
    {
        if act_name != exp_name || act_kind != exp_kind {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "'{}' history mismatch at index {}: expected (\"{}\", \"{}\"), got (\"{}\", \"{}\")",
                    body.name(),
                    i,
                    exp_name,
                    exp_kind,
                    act_name,
                    act_kind,
                ),
            });
        }
    }

    Ok(())
}

/// Assert the body collected no warnings.
pub fn assert_no_warnings(body: &Body) -> Result<(), HarnessError> {
    if body.warnings().is_empty() {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "'{}' has {} warnings: {}",
                body.name(),
                body.warnings().len(),
                body.warnings().join("; ")
            ),
        })
    }
}
