//! STL export from RenderMesh: binary and ASCII formats.

use std::path::Path;

use kernel_bridge::{Deflection, Kernel, KernelSolidHandle, RenderMesh};
use tracing::info;

use crate::errors::ExportError;

type Facet = ([f32; 3], [[f32; 3]; 3]);

/// Triangles with a unit normal computed from their winding.
fn facets(mesh: &RenderMesh) -> Result<Vec<Facet>, ExportError> {
    let tri_count = mesh.indices.len() / 3;
    if tri_count == 0 {
        return Err(ExportError::StlError {
            reason: "mesh has no triangles".to_string(),
        });
    }
    let vertex_count = mesh.vertices.len() / 3;
    if let Some(&idx) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(ExportError::StlError {
            reason: format!("index {idx} out of range (vertex count = {vertex_count})"),
        });
    }

    Ok(mesh
        .indices
        .chunks(3)
        .map(|tri| {
            let [a, b, c] = [mesh.vertex(tri[0]), mesh.vertex(tri[1]), mesh.vertex(tri[2])];
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let n = [
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ];
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            let normal = if len > 1e-12 {
                [n[0] / len, n[1] / len, n[2] / len]
            } else {
                [0.0, 0.0, 1.0]
            };
            (normal, [a, b, c])
        })
        .collect())
}

/// Export a RenderMesh as a binary STL file.
///
/// Binary STL format:
/// - 80-byte header (arbitrary text)
/// - u32 triangle count (little-endian)
/// - For each triangle: 3×f32 normal + 3×(3×f32 vertex) + u16 attribute = 50 bytes
pub fn binary_stl(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, ExportError> {
    let facets = facets(mesh)?;
    let mut buf = Vec::with_capacity(84 + facets.len() * 50);

    let header = format!("binary STL: {name}");
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(80)]);
    buf.resize(80, 0u8);
    buf.extend_from_slice(&(facets.len() as u32).to_le_bytes());

    for (normal, corners) in &facets {
        for value in normal.iter().chain(corners.iter().flatten()) {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        // Attribute byte count (unused)
        buf.extend_from_slice(&0u16.to_le_bytes());
    }
    Ok(buf)
}

/// Export a RenderMesh as an ASCII STL string.
pub fn ascii_stl(mesh: &RenderMesh, name: &str) -> Result<String, ExportError> {
    let facets = facets(mesh)?;
    let mut out = String::with_capacity(facets.len() * 300);
    out.push_str(&format!("solid {name}\n"));
    for (n, corners) in &facets {
        out.push_str(&format!("  facet normal {} {} {}\n", n[0], n[1], n[2]));
        out.push_str("    outer loop\n");
        for p in corners {
            out.push_str(&format!("      vertex {} {} {}\n", p[0], p[1], p[2]));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    out.push_str(&format!("endsolid {name}\n"));
    Ok(out)
}

/// Tessellate `tip` and write it to `path` as binary STL. Returns the
/// number of triangles written.
pub fn export_body(
    kernel: &mut dyn Kernel,
    tip: &KernelSolidHandle,
    deflection: Deflection,
    path: &Path,
) -> Result<usize, ExportError> {
    let mesh = kernel.tessellate(tip, deflection)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = binary_stl(&mesh, &name)?;
    std::fs::write(path, &bytes).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let triangles = mesh.triangle_count();
    info!(path = %path.display(), triangles, "STL written");
    Ok(triangles)
}
