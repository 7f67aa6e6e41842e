use feature_engine::{mirror_body, recompute, Body, Sketch};
use file_format::{
    ascii_stl, binary_stl, export_body, load_document, save_document, write_document,
    ExportError, LoadError, ProjectMetadata, FORMAT_VERSION,
};
use forge_types::{DatumPlane, ParamConstraint, ParameterSet, Point2, Point3, Profile, Vector3};
use kernel_bridge::{Deflection, Kernel, KernelIntrospect, PrismKernel, RenderMesh};
use modeling_ops::PocketExtent;

// ── Helper Functions ─────────────────────────────────────────────────────

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Profile {
    Profile::Polygon {
        vertices: vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ],
    }
}

fn params() -> ParameterSet {
    let mut p = ParameterSet::new();
    p.define("PLATE_WIDTH", 20.0, ParamConstraint::Positive).unwrap();
    p.define("HOLE_RADIUS", 1.6, ParamConstraint::Positive).unwrap();
    p.derive("HOLE_CENTER", |p| Ok(p.get("PLATE_WIDTH")? / 2.0))
        .unwrap();
    p
}

/// 20 × 10 × 4 plate with one through hole.
fn holed_plate(kernel: &mut PrismKernel) -> Body {
    let mut body = Body::new("Plate");
    body.add_pad(
        kernel,
        "Base",
        Sketch::on_datum(DatumPlane::XY, 0.0, vec![rect(0.0, 0.0, 20.0, 10.0)]),
        4.0,
        false,
    )
    .unwrap();
    body.add_pocket(
        kernel,
        "Hole",
        Sketch::on_datum(
            DatumPlane::XY,
            0.0,
            vec![Profile::Circle {
                center: Point2::new(10.0, 5.0),
                radius: 1.6,
            }],
        ),
        PocketExtent::ThroughAll,
        false,
    )
    .unwrap();
    body
}

fn single_triangle() -> RenderMesh {
    RenderMesh {
        vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        indices: vec![0, 1, 2],
        face_ranges: Vec::new(),
    }
}

// ── Document Round-Trip ──────────────────────────────────────────────────

#[test]
fn document_round_trip_preserves_history() {
    let mut kernel = PrismKernel::new();
    let body = holed_plate(&mut kernel);
    let json = save_document([&body], &params(), &ProjectMetadata::new("Plate")).unwrap();

    let doc = load_document(&json).unwrap();
    assert_eq!(doc.version, FORMAT_VERSION);
    assert_eq!(doc.project.name, "Plate");
    assert_eq!(doc.bodies.len(), 1);
    assert_eq!(doc.bodies[0].name, "Plate");
    assert_eq!(doc.bodies[0].features, body.features());
    assert_eq!(doc.parameters["HOLE_CENTER"], 10.0);
}

#[test]
fn loaded_history_rebuilds_same_solid() {
    let mut kernel = PrismKernel::new();
    let body = holed_plate(&mut kernel);
    let json = save_document([&body], &params(), &ProjectMetadata::new("Plate")).unwrap();
    let doc = load_document(&json).unwrap();

    let rebuilt = recompute(&doc.bodies[0].name, &doc.bodies[0].features, &mut kernel).unwrap();
    let original = kernel.volume(&body.tip().unwrap()).unwrap();
    let replayed = kernel.volume(&rebuilt.tip().unwrap()).unwrap();
    assert!((original - replayed).abs() < 1e-6);
    assert!(!kernel
        .contains(&rebuilt.tip().unwrap(), &Point3::new(10.0, 5.0, 2.0))
        .unwrap());
}

#[test]
fn mirrored_body_saves_its_source_history() {
    let mut kernel = PrismKernel::new();
    let body = holed_plate(&mut kernel);
    let mirrored = mirror_body(
        &mut kernel,
        &body,
        "Mirrored",
        Point3::origin(),
        Vector3::x(),
    )
    .unwrap();
    let json = save_document([&body, &mirrored], &params(), &ProjectMetadata::new("Pair"))
        .unwrap();
    let doc = load_document(&json).unwrap();
    assert_eq!(doc.bodies.len(), 2);
    assert_eq!(doc.bodies[1].features.len(), 1);
    assert_eq!(doc.bodies[1].features, mirrored.features());
}

#[test]
fn write_document_creates_file() {
    let mut kernel = PrismKernel::new();
    let body = holed_plate(&mut kernel);
    let path = std::env::temp_dir().join(format!("rack-forge-doc-{}.json", std::process::id()));
    write_document(&path, [&body], &params(), &ProjectMetadata::new("Plate")).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert!(load_document(&text).is_ok());
}

// ── Validation ───────────────────────────────────────────────────────────

#[test]
fn unknown_format_rejected() {
    let json = r#"{
        "format": "other",
        "version": 1,
        "project": {"name": "x", "created": "2024-01-01T00:00:00Z", "modified": "2024-01-01T00:00:00Z"},
        "parameters": {},
        "bodies": []
    }"#;
    assert!(matches!(load_document(json), Err(LoadError::UnknownFormat(f)) if f == "other"));
}

#[test]
fn future_version_rejected() {
    let json = r#"{
        "format": "rack-forge",
        "version": 99,
        "project": {"name": "x", "created": "2024-01-01T00:00:00Z", "modified": "2024-01-01T00:00:00Z"},
        "parameters": {},
        "bodies": []
    }"#;
    assert!(matches!(
        load_document(json),
        Err(LoadError::FutureVersion {
            file_version: 99,
            ..
        })
    ));
}

#[test]
fn malformed_json_is_parse_error() {
    assert!(matches!(
        load_document("{ not json"),
        Err(LoadError::ParseError(_))
    ));
}

// ── STL Export ───────────────────────────────────────────────────────────

#[test]
fn binary_stl_layout() {
    let bytes = binary_stl(&single_triangle(), "tri").unwrap();
    assert_eq!(bytes.len(), 84 + 50);
    assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 1);
    // Normal z component
    let nz = f32::from_le_bytes([bytes[92], bytes[93], bytes[94], bytes[95]]);
    assert!((nz - 1.0).abs() < 1e-6);
}

#[test]
fn ascii_stl_structure() {
    let text = ascii_stl(&single_triangle(), "tri").unwrap();
    assert!(text.starts_with("solid tri\n"));
    assert!(text.trim_end().ends_with("endsolid tri"));
    assert_eq!(text.matches("facet normal").count(), 1);
    assert_eq!(text.matches("vertex").count(), 3);
}

#[test]
fn empty_mesh_rejected() {
    let mesh = RenderMesh::default();
    assert!(matches!(
        binary_stl(&mesh, "empty"),
        Err(ExportError::StlError { .. })
    ));
}

#[test]
fn out_of_range_index_rejected() {
    let mut mesh = single_triangle();
    mesh.indices[2] = 7;
    assert!(matches!(
        ascii_stl(&mesh, "bad"),
        Err(ExportError::StlError { .. })
    ));
}

#[test]
fn export_body_writes_tessellated_solid() {
    let mut kernel = PrismKernel::new();
    let body = holed_plate(&mut kernel);
    let tip = body.tip().unwrap();
    let path = std::env::temp_dir().join(format!("rack-forge-plate-{}.stl", std::process::id()));
    let triangles = export_body(&mut kernel, &tip, Deflection::new(0.5, 0.5), &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(triangles > 0);
    assert_eq!(bytes.len(), 84 + 50 * triangles);
    let mesh = kernel.tessellate(&tip, Deflection::new(0.5, 0.5)).unwrap();
    assert_eq!(mesh.triangle_count(), triangles);
}
