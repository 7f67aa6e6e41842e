//! Structured text reports of a builder's body.

use std::fmt;

use feature_engine::Operation;
use kernel_bridge::Deflection;
use modeling_ops::PocketExtent;

use crate::helpers::{mesh_bounding_box, HarnessError};
use crate::oracle::{self, OracleVerdict};
use crate::workflow::ModelBuilder;

/// A complete model report with all sections.
pub struct ModelReport {
    pub body_name: String,
    pub feature_entries: Vec<FeatureEntry>,
    pub warnings: Vec<String>,
    pub mesh_summary: Option<MeshSummary>,
    pub bounding_box: Option<([f32; 3], [f32; 3])>,
    pub volume: Option<f64>,
    pub oracle_results: Vec<OracleVerdict>,
    pub errors: Vec<(String, String)>,
}

/// A single feature's report entry.
pub struct FeatureEntry {
    pub index: usize,
    pub name: String,
    pub kind: String,
    pub detail: String,
}

pub struct MeshSummary {
    pub triangle_count: usize,
    pub vertex_count: usize,
    pub face_range_count: usize,
}

impl ModelReport {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Model Report: {} ===\n\n", self.body_name));

        out.push_str(&format!(
            "Feature History ({} features, {} errors):\n",
            self.feature_entries.len(),
            self.errors.len(),
        ));
        for entry in &self.feature_entries {
            out.push_str(&format!(
                "  [{}] {} \"{}\"\n",
                entry.index, entry.kind, entry.name
            ));
            if !entry.detail.is_empty() {
                out.push_str(&format!("      {}\n", entry.detail));
            }
        }

        if !self.warnings.is_empty() {
            out.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for w in &self.warnings {
                out.push_str(&format!("  {w}\n"));
            }
        }

        if let Some(ms) = &self.mesh_summary {
            out.push_str(&format!(
                "\nMesh: {} triangles, {} vertices, {} face ranges\n",
                ms.triangle_count, ms.vertex_count, ms.face_range_count,
            ));
        }

        if let Some((min, max)) = self.bounding_box {
            out.push_str(&format!(
                "\nBounding Box: ({:.1}, {:.1}, {:.1}) -> ({:.1}, {:.1}, {:.1})\n",
                min[0], min[1], min[2], max[0], max[1], max[2],
            ));
        }
        if let Some(volume) = self.volume {
            out.push_str(&format!("Volume: {volume:.1} mm³\n"));
        }

        if !self.oracle_results.is_empty() {
            out.push_str(&format!(
                "\nOracle Results ({} checks):\n",
                self.oracle_results.len()
            ));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }

        if self.errors.is_empty() {
            out.push_str("\nErrors: none\n");
        } else {
            out.push_str(&format!("\nErrors ({}):\n", self.errors.len()));
            for (feature, msg) in &self.errors {
                out.push_str(&format!("  {feature}: {msg}\n"));
            }
        }

        out
    }
}

impl fmt::Display for ModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

fn describe_operation(op: &Operation) -> String {
    match op {
        Operation::Pad {
            sketch,
            distance,
            reversed,
        } => format!(
            "{} profile(s), distance={distance}{}",
            sketch.profiles.len(),
            if *reversed { ", reversed" } else { "" }
        ),
        Operation::Pocket {
            sketch,
            extent,
            reversed,
        } => {
            let extent = match extent {
                PocketExtent::Depth { depth } => format!("depth={depth}"),
                PocketExtent::ThroughAll => "through all".to_string(),
            };
            format!(
                "{} profile(s), {extent}{}",
                sketch.profiles.len(),
                if *reversed { ", reversed" } else { "" }
            )
        }
        Operation::Fillet { edges, radius } => {
            format!("radius={radius}, {} edge filter(s)", edges.filters.len())
        }
        Operation::Mirror {
            source,
            source_features,
            point,
            normal,
        } => format!(
            "of '{source}' ({} features) across ({}, {}, {}) n=({}, {}, {})",
            source_features.len(),
            point.x,
            point.y,
            point.z,
            normal.x,
            normal.y,
            normal.z
        ),
    }
}

impl ModelBuilder {
    /// Generate a complete model report. A body without a solid reports its
    /// history and errors only.
    pub fn report(&mut self) -> Result<ModelReport, HarnessError> {
        let feature_entries = self
            .body
            .features()
            .iter()
            .enumerate()
            .map(|(index, f)| FeatureEntry {
                index,
                name: f.name.clone(),
                kind: f.operation.kind().to_string(),
                detail: describe_operation(&f.operation),
            })
            .collect();

        let mut mesh_summary = None;
        let mut bounding_box = None;
        let mut volume = None;
        let mut oracle_results = Vec::new();
        if self.body.tip().is_some() {
            let mesh = self.mesh(Deflection::new(0.5, 0.5))?;
            mesh_summary = Some(MeshSummary {
                triangle_count: mesh.triangle_count(),
                vertex_count: mesh.vertices.len() / 3,
                face_range_count: mesh.face_ranges.len(),
            });
            bounding_box = Some(mesh_bounding_box(&mesh));
            volume = Some(self.volume()?);
            oracle_results = oracle::run_all_mesh_checks(&mesh);
        }

        Ok(ModelReport {
            body_name: self.body.name().to_string(),
            feature_entries,
            warnings: self.body.warnings().to_vec(),
            mesh_summary,
            bounding_box,
            volume,
            oracle_results,
            errors: self.errors.clone(),
        })
    }
}
