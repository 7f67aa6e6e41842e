//! Declarative parameter overrides: a flat JSON object of `name -> mm`.

use std::collections::BTreeMap;
use std::path::Path;

use forge_types::ParameterSet;
use tracing::info;

use crate::errors::LoadError;

/// Parse a flat `{ "NAME": number, ... }` object.
pub fn parse_overrides(json: &str) -> Result<BTreeMap<String, f64>, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))
}

/// Apply overrides to `params`.
///
/// Every name must already be a base parameter of the set; the first
/// unknown or derived name aborts before anything is changed. Value checks
/// follow each parameter's constraint.
pub fn apply_overrides(
    params: &mut ParameterSet,
    overrides: &BTreeMap<String, f64>,
) -> Result<usize, LoadError> {
    for name in overrides.keys() {
        if !params.contains(name) || params.is_derived(name) {
            return Err(LoadError::UnknownParameter { name: name.clone() });
        }
    }
    let mut staged = params.clone();
    staged.apply_overrides(overrides.iter().map(|(k, v)| (k.as_str(), *v)))?;
    *params = staged;
    Ok(overrides.len())
}

/// Read a parameter file and apply it to `params`.
pub fn load_parameter_file(path: &Path, params: &mut ParameterSet) -> Result<usize, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let applied = apply_overrides(params, &parse_overrides(&text)?)?;
    info!(path = %path.display(), applied, "parameter overrides loaded");
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_types::{ParamConstraint, ParamError};

    fn params() -> ParameterSet {
        let mut p = ParameterSet::new();
        p.define("PANEL_WIDTH", 212.0, ParamConstraint::Positive).unwrap();
        p.define("LIP_INSET", 3.0, ParamConstraint::NonNegative).unwrap();
        p.derive("INNER", |p| Ok(p.get("PANEL_WIDTH")? - 2.0 * p.get("LIP_INSET")?))
            .unwrap();
        p
    }

    #[test]
    fn test_overrides_applied() {
        let mut p = params();
        let n = apply_overrides(&mut p, &parse_overrides(r#"{"PANEL_WIDTH": 220}"#).unwrap())
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(p.get("INNER").unwrap(), 214.0);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let mut p = params();
        let err = apply_overrides(&mut p, &parse_overrides(r#"{"PANEL_DEPTH": 1}"#).unwrap())
            .unwrap_err();
        assert!(matches!(err, LoadError::UnknownParameter { name } if name == "PANEL_DEPTH"));
    }

    #[test]
    fn test_derived_name_rejected() {
        let mut p = params();
        assert!(matches!(
            apply_overrides(&mut p, &parse_overrides(r#"{"INNER": 1}"#).unwrap()),
            Err(LoadError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn test_invalid_value_leaves_set_untouched() {
        let mut p = params();
        let err = apply_overrides(
            &mut p,
            &parse_overrides(r#"{"LIP_INSET": 5, "PANEL_WIDTH": -1}"#).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Parameter(ParamError::InvalidValue { .. })));
        assert_eq!(p.get("LIP_INSET").unwrap(), 3.0);
    }

    #[test]
    fn test_non_numeric_is_parse_error() {
        assert!(matches!(
            parse_overrides(r#"{"PANEL_WIDTH": "wide"}"#),
            Err(LoadError::ParseError(_))
        ));
    }
}
