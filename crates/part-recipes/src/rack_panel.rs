//! Three-piece 10-inch 1U rack panel: center panel and two end tabs.
//!
//! Panel frame: x along the width, y up the panel, z from the front lip
//! (negative) through the face plate (0 to 4) into the shelf.

use feature_engine::{Body, Sketch};
use forge_types::{Axis, Bound, DatumPlane, EdgeQuery, FaceQuery, ParameterSet, Point2, Point3, Vector3};
use kernel_bridge::Deflection;
use modeling_ops::{KernelBundle, PocketExtent};
use sketch_profiles::{circle, holes, polygon, rectangle, regular_hexagon, HoleSpec};

use crate::errors::{InFeature, RecipeError};
use crate::orchestrate::{BodyRecipe, Design, PlannedBody};
use crate::params::rack_panel_parameters;

/// The back of the face plate, where walls, nut recesses and the
/// retention bar attach.
fn back_face(plate_thickness: f64) -> FaceQuery {
    FaceQuery::facing(Vector3::z()).at(Axis::Z, Bound::Max, plate_thickness)
}

fn joint_positions(p: &ParameterSet, mirrored_x: Option<f64>) -> Result<Vec<Point2>, RecipeError> {
    let x = p.get("JOINT_SCREW_X")?;
    let ys = [p.get("JOINT_SCREW_Y_LOW")?, p.get("JOINT_SCREW_Y_HIGH")?];
    let mut points: Vec<Point2> = ys.iter().map(|&y| Point2::new(x, y)).collect();
    if let Some(width) = mirrored_x {
        points.extend(ys.iter().map(|&y| Point2::new(width - x, y)));
    }
    Ok(points)
}

/// Face plate with shelf walls, front lip, joint holes, nut recesses and
/// box cutouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterPanel {
    /// Adds the side-bar between the two box cutouts.
    pub retention_bar: bool,
}

impl BodyRecipe for CenterPanel {
    fn name(&self) -> &str {
        "CenterPanel"
    }

    fn build(&self, p: &ParameterSet, kb: &mut dyn KernelBundle) -> Result<Body, RecipeError> {
        let w = p.get("PANEL_WIDTH")?;
        let h = p.get("RACK_1U_HEIGHT")?;
        let fpt = p.get("FACE_PLATE_THICKNESS")?;
        let wt = p.get("WALL_THICKNESS")?;
        let lip_depth = p.get("LIP_DEPTH")?;
        let li = p.get("LIP_INSET")?;
        let mut body = Body::new(self.name());

        let plate = rectangle(0.0, 0.0, w, h).in_feature("FacePlate")?;
        body.add_pad(kb, "FacePlate", Sketch::on_datum(DatumPlane::XY, 0.0, vec![plate]), fpt, false)?;

        for (feature, y0, y1) in [("BottomWall", 0.0, wt), ("TopWall", h - wt, h)] {
            let wall = rectangle(0.0, y0, w, y1).in_feature(feature)?;
            body.add_pad(
                kb,
                feature,
                Sketch::on_face(back_face(fpt), vec![wall]).authored_in(DatumPlane::XY),
                p.get("SHELF_DEPTH")?,
                false,
            )?;
        }

        let lip = rectangle(0.0, 0.0, w, h).in_feature("LipBlock")?;
        body.add_pad(kb, "LipBlock", Sketch::on_datum(DatumPlane::XY, 0.0, vec![lip]), lip_depth, true)?;

        let inner = rectangle(li, li, w - li, h - li).in_feature("LipPocket")?;
        body.add_pocket(
            kb,
            "LipPocket",
            Sketch::on_datum(DatumPlane::XY, -lip_depth, vec![inner]),
            PocketExtent::Depth { depth: lip_depth },
            false,
        )?;

        let joints = joint_positions(p, Some(w))?;
        let radius = p.get("M3_CLEARANCE_RADIUS")?;
        let clearance = joints
            .iter()
            .map(|c| circle(*c, radius))
            .collect::<Result<Vec<_>, _>>()
            .in_feature("JointHoles")?;
        body.add_pocket(
            kb,
            "JointHoles",
            Sketch::on_datum(DatumPlane::XY, 0.0, clearance),
            PocketExtent::ThroughAll,
            false,
        )?;

        let across_flats = p.get("NUT_ACROSS_FLATS")?;
        let nuts = joints
            .iter()
            .map(|c| regular_hexagon(*c, across_flats))
            .collect::<Result<Vec<_>, _>>()
            .in_feature("NutRecesses")?;
        body.add_pocket(
            kb,
            "NutRecesses",
            Sketch::on_face(back_face(fpt), nuts).authored_in(DatumPlane::XY),
            PocketExtent::Depth {
                depth: p.get("NUT_RECESS_DEPTH")?,
            },
            true,
        )?;

        let lip_cut = p.get("CUTOUT_LIP")?;
        let opening_w = p.get("BOX_OPENING_WIDTH")?;
        let bay_top = wt + p.get("BOX_OPENING_HEIGHT")?;
        let cutouts = [p.get("BOX_LEFT_X")?, p.get("BOX_RIGHT_X")?]
            .iter()
            .map(|&x| rectangle(x + lip_cut, wt + lip_cut, x + opening_w - lip_cut, bay_top - lip_cut))
            .collect::<Result<Vec<_>, _>>()
            .in_feature("BoxCutouts")?;
        body.add_pocket(
            kb,
            "BoxCutouts",
            Sketch::on_datum(DatumPlane::XY, 0.0, cutouts),
            PocketExtent::ThroughAll,
            false,
        )?;

        if self.retention_bar {
            let cx = p.get("RETENTION_BAR_X_CENTER")?;
            let half = p.get("RETENTION_BAR_WIDTH")? / 2.0;
            let bar = rectangle(cx - half, wt, cx + half, h - wt).in_feature("RetentionBar")?;
            body.add_pad(
                kb,
                "RetentionBar",
                Sketch::on_face(back_face(fpt), vec![bar]).authored_in(DatumPlane::XY),
                p.get("RETENTION_BAR_DEPTH")?,
                false,
            )?;
        }

        // Inside corners where each wall meets the face plate. The length
        // bound keeps short edges around holes and the bar out.
        let radius = p.get("WALL_FILLET_RADIUS")?;
        for (feature, y) in [("BottomWallFillet", wt), ("TopWallFillet", h - wt)] {
            let edges = EdgeQuery::new()
                .parallel_to(Vector3::x())
                .midpoint_at(Axis::Y, y)
                .midpoint_at(Axis::Z, fpt)
                .longer_than(20.0);
            body.add_fillet(kb, feature, edges, radius)?;
        }
        Ok(body)
    }
}

/// L-shaped end tab that bolts to the panel and carries the rail holes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeftTab;

impl BodyRecipe for LeftTab {
    fn name(&self) -> &str {
        "LeftTab"
    }

    fn build(&self, p: &ParameterSet, kb: &mut dyn KernelBundle) -> Result<Body, RecipeError> {
        let h = p.get("RACK_1U_HEIGHT")?;
        let li = p.get("LIP_INSET")?;
        let rail_x = -p.get("TAB_RAIL_WIDTH")?;
        let overlap = p.get("TAB_OVERLAP_WIDTH")?;
        let depth = p.get("TAB_DEPTH")?;
        let mut body = Body::new(self.name());

        let outline = polygon(&[
            Point2::new(rail_x, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(0.0, li),
            Point2::new(overlap, li),
            Point2::new(overlap, h - li),
            Point2::new(0.0, h - li),
            Point2::new(0.0, h),
            Point2::new(rail_x, h),
        ])
        .in_feature("TabPad")?;
        body.add_pad(kb, "TabPad", Sketch::on_datum(DatumPlane::XY, 0.0, vec![outline]), depth, true)?;

        // Receives the panel's front lip.
        let groove = rectangle(0.0, li, li, h - li).in_feature("LipGroove")?;
        body.add_pocket(
            kb,
            "LipGroove",
            Sketch::on_datum(DatumPlane::XY, 0.0, vec![groove]),
            PocketExtent::Depth {
                depth: p.get("LIP_DEPTH")?,
            },
            true,
        )?;

        let x = p.get("RAIL_HOLE_X_CENTER")?;
        let y = p.get("RAIL_HOLE_Y_CENTER")?;
        let spacing = p.get("RAIL_HOLE_SPACING")?;
        let outer = p.get("RAIL_HOLE_OUTER_DIA")?;
        let rail = holes(&[
            HoleSpec::new(x, y - spacing, outer),
            HoleSpec::new(x, y, p.get("RAIL_HOLE_CENTER_DIA")?),
            HoleSpec::new(x, y + spacing, outer),
        ])
        .in_feature("RailHoles")?;
        body.add_pocket(
            kb,
            "RailHoles",
            Sketch::on_datum(DatumPlane::XY, -depth, rail),
            PocketExtent::ThroughAll,
            false,
        )?;

        let joints = joint_positions(p, None)?;
        let radius = p.get("M3_CLEARANCE_RADIUS")?;
        let clearance = joints
            .iter()
            .map(|c| circle(*c, radius))
            .collect::<Result<Vec<_>, _>>()
            .in_feature("JointHoles")?;
        body.add_pocket(
            kb,
            "JointHoles",
            Sketch::on_datum(DatumPlane::XY, 0.0, clearance),
            PocketExtent::ThroughAll,
            false,
        )?;

        let bore = p.get("COUNTERBORE_RADIUS")?;
        let counterbores = joints
            .iter()
            .map(|c| circle(*c, bore))
            .collect::<Result<Vec<_>, _>>()
            .in_feature("Counterbores")?;
        body.add_pocket(
            kb,
            "Counterbores",
            Sketch::on_datum(DatumPlane::XY, -depth, counterbores),
            PocketExtent::Depth {
                depth: p.get("COUNTERBORE_DEPTH")?,
            },
            false,
        )?;
        Ok(body)
    }
}

impl Design {
    /// Center panel, left tab, and the right tab mirrored across the
    /// panel's vertical center plane.
    pub fn rack_panel(retention_bar: bool) -> Result<Self, RecipeError> {
        Ok(Self {
            name: "RackPanel".to_string(),
            parameters: rack_panel_parameters()?,
            bodies: vec![
                PlannedBody::recipe(CenterPanel { retention_bar }, "CenterPanel"),
                PlannedBody::recipe(LeftTab, "LeftTab"),
                PlannedBody::mirror(
                    "RightTab",
                    "LeftTab",
                    |p| Ok((Point3::new(p.get("PANEL_WIDTH")? / 2.0, 0.0, 0.0), Vector3::x())),
                    "RightTab",
                ),
            ],
            deflection: Deflection::new(0.1, 0.5),
        })
    }
}
