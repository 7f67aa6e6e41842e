//! Named millimeter constants plus derived formulas.
//!
//! Base parameters are validated when inserted or overridden. Derived
//! parameters are plain function pointers evaluated on every read, so a
//! derived value can never lag behind the parameters it depends on.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("parameter '{name}' is already defined")]
    DuplicateParameter { name: String },

    #[error("parameter '{name}' = {value}: {reason}")]
    InvalidValue {
        name: String,
        value: f64,
        reason: String,
    },

    #[error("derived parameter '{name}' cannot be evaluated: {reason}")]
    DerivationFailed { name: String, reason: String },
}

/// Admissible range for a base parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamConstraint {
    /// Strictly greater than zero (lengths, radii, depths).
    Positive,
    /// Zero or greater (offsets, clearances).
    NonNegative,
    /// Any finite value (coordinates).
    Finite,
}

impl ParamConstraint {
    fn check(self, name: &str, value: f64) -> Result<(), ParamError> {
        let reason = if !value.is_finite() {
            Some("value must be finite")
        } else {
            match self {
                ParamConstraint::Positive if value <= 0.0 => Some("value must be > 0"),
                ParamConstraint::NonNegative if value < 0.0 => Some("value must be >= 0"),
                _ => None,
            }
        };
        match reason {
            Some(reason) => Err(ParamError::InvalidValue {
                name: name.to_string(),
                value,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub value: f64,
    pub constraint: ParamConstraint,
}

pub type Formula = fn(&ParameterSet) -> Result<f64, ParamError>;

#[derive(Clone)]
struct Derived {
    formula: Formula,
}

impl fmt::Debug for Derived {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<formula>")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    base: BTreeMap<String, Parameter>,
    derived: BTreeMap<String, Derived>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new base parameter.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        value: f64,
        constraint: ParamConstraint,
    ) -> Result<(), ParamError> {
        let name = name.into();
        if self.base.contains_key(&name) || self.derived.contains_key(&name) {
            return Err(ParamError::DuplicateParameter { name });
        }
        constraint.check(&name, value)?;
        self.base.insert(name, Parameter { value, constraint });
        Ok(())
    }

    /// Register a derived parameter.
    pub fn derive(&mut self, name: impl Into<String>, formula: Formula) -> Result<(), ParamError> {
        let name = name.into();
        if self.base.contains_key(&name) || self.derived.contains_key(&name) {
            return Err(ParamError::DuplicateParameter { name });
        }
        self.derived.insert(name, Derived { formula });
        Ok(())
    }

    /// Override an existing base parameter. Derived parameters cannot be set.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), ParamError> {
        if self.derived.contains_key(name) {
            return Err(ParamError::InvalidValue {
                name: name.to_string(),
                value,
                reason: "derived parameters cannot be overridden".to_string(),
            });
        }
        let param = self
            .base
            .get_mut(name)
            .ok_or_else(|| ParamError::UnknownParameter {
                name: name.to_string(),
            })?;
        param.constraint.check(name, value)?;
        param.value = value;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<f64, ParamError> {
        if let Some(p) = self.base.get(name) {
            return Ok(p.value);
        }
        let derived = self
            .derived
            .get(name)
            .ok_or_else(|| ParamError::UnknownParameter {
                name: name.to_string(),
            })?;
        let value = (derived.formula)(self)?;
        if !value.is_finite() {
            return Err(ParamError::DerivationFailed {
                name: name.to_string(),
                reason: format!("formula produced {value}"),
            });
        }
        Ok(value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.base.contains_key(name) || self.derived.contains_key(name)
    }

    pub fn is_derived(&self, name: &str) -> bool {
        self.derived.contains_key(name)
    }

    pub fn base_names(&self) -> impl Iterator<Item = &str> {
        self.base.keys().map(String::as_str)
    }

    /// Every base and derived value, evaluated now.
    pub fn snapshot(&self) -> Result<BTreeMap<String, f64>, ParamError> {
        let mut out: BTreeMap<String, f64> =
            self.base.iter().map(|(k, p)| (k.clone(), p.value)).collect();
        for name in self.derived.keys() {
            out.insert(name.clone(), self.get(name)?);
        }
        Ok(out)
    }

    /// Apply a batch of overrides, stopping at the first invalid entry.
    pub fn apply_overrides<'a>(
        &mut self,
        overrides: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<(), ParamError> {
        for (name, value) in overrides {
            self.set(name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> ParameterSet {
        let mut p = ParameterSet::new();
        p.define("WIDTH", 212.0, ParamConstraint::Positive).unwrap();
        p.define("INSET", 3.0, ParamConstraint::NonNegative).unwrap();
        p.derive("INNER_WIDTH", |p| Ok(p.get("WIDTH")? - 2.0 * p.get("INSET")?))
            .unwrap();
        p
    }

    #[test]
    fn test_derived_tracks_overrides() {
        let mut p = sample();
        assert_relative_eq!(p.get("INNER_WIDTH").unwrap(), 206.0);
        p.set("INSET", 5.0).unwrap();
        assert_relative_eq!(p.get("INNER_WIDTH").unwrap(), 202.0);
    }

    #[test]
    fn test_rejects_non_positive() {
        let mut p = sample();
        let err = p.set("WIDTH", 0.0).unwrap_err();
        assert!(matches!(err, ParamError::InvalidValue { .. }));
        assert_relative_eq!(p.get("WIDTH").unwrap(), 212.0);
    }

    #[test]
    fn test_rejects_nan() {
        let mut p = sample();
        assert!(p.set("INSET", f64::NAN).is_err());
    }

    #[test]
    fn test_unknown_and_duplicate() {
        let mut p = sample();
        assert!(matches!(
            p.get("DEPTH"),
            Err(ParamError::UnknownParameter { .. })
        ));
        assert!(matches!(
            p.define("WIDTH", 1.0, ParamConstraint::Positive),
            Err(ParamError::DuplicateParameter { .. })
        ));
        assert!(p.set("INNER_WIDTH", 1.0).is_err());
    }

    #[test]
    fn test_snapshot_includes_derived() {
        let snap = sample().snapshot().unwrap();
        assert_eq!(snap.len(), 3);
        assert_relative_eq!(snap["INNER_WIDTH"], 206.0);
    }
}
