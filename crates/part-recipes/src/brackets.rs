//! Prusa frame to 6U rack rail L-brackets.
//!
//! Bracket frame: the L profile lies in XY with the frame leg along -x
//! below y = 0 and the rail leg along +y at x in [0, thickness]. The base
//! pad spans z in [0, FRAME_LEG_WIDTH]; rail extensions continue along z.

use feature_engine::{Body, Sketch};
use forge_types::{Axis, Bound, DatumPlane, FaceQuery, ParameterSet, Point2, Point3, Vector3};
use kernel_bridge::Deflection;
use modeling_ops::{KernelBundle, PocketExtent};
use sketch_profiles::{holes, polygon, rectangle, HoleSpec};

use crate::errors::{InFeature, RecipeError};
use crate::orchestrate::{BodyRecipe, Design, PlannedBody};
use crate::params::bracket_parameters;

/// Which end of the frame the bracket mounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    /// Rail extension continues above the base; two frame holes.
    Top,
    /// Rail extension continues below the base; three frame holes in a
    /// triangle.
    Bottom,
}

#[derive(Debug, Clone, Copy)]
pub struct Bracket {
    pub kind: BracketKind,
}

impl Bracket {
    pub fn top() -> Self {
        Self {
            kind: BracketKind::Top,
        }
    }

    pub fn bottom() -> Self {
        Self {
            kind: BracketKind::Bottom,
        }
    }
}

fn l_profile(p: &ParameterSet) -> Result<Vec<Point2>, RecipeError> {
    let depth = p.get("FRAME_LEG_DEPTH")?;
    let frame_t = p.get("FRAME_LEG_THICKNESS")?;
    let brace = p.get("ANGLE_BRACE_SIZE")?;
    let rail_h = p.get("RAIL_LEG_HEIGHT")?;
    let rail_t = p.get("RAIL_LEG_THICKNESS")?;
    Ok(vec![
        Point2::new(-depth, -frame_t),
        Point2::new(-depth, 0.0),
        Point2::new(-brace, 0.0),
        Point2::new(0.0, brace),
        Point2::new(0.0, rail_h),
        Point2::new(rail_t, rail_h),
        Point2::new(rail_t, -frame_t),
    ])
}

impl BodyRecipe for Bracket {
    fn name(&self) -> &str {
        match self.kind {
            BracketKind::Top => "TopBracketLeft",
            BracketKind::Bottom => "BottomBracketLeft",
        }
    }

    fn build(&self, p: &ParameterSet, kb: &mut dyn KernelBundle) -> Result<Body, RecipeError> {
        let width = p.get("FRAME_LEG_WIDTH")?;
        let mut body = Body::new(self.name());

        let outline = polygon(&l_profile(p)?).in_feature("LProfile")?;
        body.add_pad(kb, "LProfile", Sketch::on_datum(DatumPlane::XY, 0.0, vec![outline]), width, false)?;

        // Extension grows outward from the end cap it is sketched on.
        let (cap, length, rail_center) = match self.kind {
            BracketKind::Top => (
                FaceQuery::facing(Vector3::z()).at(Axis::Z, Bound::Max, width),
                p.get("TOP_EXTENSION_LENGTH")?,
                p.get("TOP_RAIL_HOLE_CENTER")?,
            ),
            BracketKind::Bottom => (
                FaceQuery::facing(-Vector3::z()).at(Axis::Z, Bound::Min, 0.0),
                p.get("BOTTOM_EXTENSION_LENGTH")?,
                p.get("BOTTOM_RAIL_HOLE_CENTER")?,
            ),
        };
        let rail_leg = rectangle(0.0, 0.0, p.get("RAIL_LEG_THICKNESS")?, p.get("RAIL_LEG_HEIGHT")?)
            .in_feature("RailExtension")?;
        body.add_pad(
            kb,
            "RailExtension",
            Sketch::on_face(cap, vec![rail_leg]).authored_in(DatumPlane::XY),
            length,
            false,
        )?;

        // Frame holes run through the frame leg along y; XZ sketch
        // coordinates are (x, z), measured inward from the rail leg.
        let hole_d = p.get("FRAME_HOLE_DIAMETER")?;
        let z = p.get("TOP_FRAME_HOLE_Z")?;
        let mut frame = vec![
            HoleSpec::new(-p.get("TOP_FRAME_HOLE_INNER")?, z, hole_d),
            HoleSpec::new(-p.get("TOP_FRAME_HOLE_OUTER")?, z, hole_d),
        ];
        if self.kind == BracketKind::Bottom {
            frame.push(HoleSpec::new(
                -p.get("BOTTOM_FRAME_HOLE_APEX_X")?,
                p.get("BOTTOM_FRAME_HOLE_APEX_Z")?,
                hole_d,
            ));
        }
        let frame = holes(&frame).in_feature("FrameHoles")?;
        body.add_pocket(
            kb,
            "FrameHoles",
            Sketch::on_datum(DatumPlane::XZ, 0.0, frame),
            PocketExtent::ThroughAll,
            false,
        )?;

        // Rail holes run through the rail leg along x; YZ coordinates are (y, z).
        let y = p.get("RAIL_HOLE_Y_CENTER")?;
        let spacing = p.get("RAIL_HOLE_SPACING")?;
        let outer = p.get("RAIL_HOLE_OUTER_DIA")?;
        let rail = holes(&[
            HoleSpec::new(y, rail_center - spacing, outer),
            HoleSpec::new(y, rail_center, p.get("RAIL_HOLE_CENTER_DIA")?),
            HoleSpec::new(y, rail_center + spacing, outer),
        ])
        .in_feature("RailHoles")?;
        body.add_pocket(
            kb,
            "RailHoles",
            Sketch::on_datum(DatumPlane::YZ, 0.0, rail),
            PocketExtent::ThroughAll,
            false,
        )?;
        Ok(body)
    }
}

fn yz_plane(_: &ParameterSet) -> Result<(Point3, Vector3), forge_types::ParamError> {
    Ok((Point3::origin(), Vector3::x()))
}

impl Design {
    /// Left top and bottom brackets plus their mirrored right partners.
    pub fn brackets() -> Result<Self, RecipeError> {
        Ok(Self {
            name: "PrusaRackBrackets".to_string(),
            parameters: bracket_parameters()?,
            bodies: vec![
                PlannedBody::recipe(Bracket::top(), "top_bracket_left"),
                PlannedBody::recipe(Bracket::bottom(), "bottom_bracket_left"),
                PlannedBody::mirror("TopBracketRight", "TopBracketLeft", yz_plane, "top_bracket_right"),
                PlannedBody::mirror(
                    "BottomBracketRight",
                    "BottomBracketLeft",
                    yz_plane,
                    "bottom_bracket_right",
                ),
            ],
            deflection: Deflection::new(0.1, 0.1),
        })
    }
}
