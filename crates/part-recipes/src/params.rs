//! Default parameter tables for the two designs.
//!
//! All values are millimeters. Derived values are formulas, so overriding a
//! base parameter is immediately visible through every dependent value.

use forge_types::ParamConstraint::{Finite, NonNegative, Positive};
use forge_types::{ParamError, ParameterSet};
use sketch_profiles::hex_circumradius;

/// 10-inch rack, 1U panel with two end tabs.
pub fn rack_panel_parameters() -> Result<ParameterSet, ParamError> {
    let mut p = ParameterSet::new();
    for (name, value, constraint) in [
        ("RACK_1U_HEIGHT", 44.45, Positive),
        ("PANEL_WIDTH", 212.0, Positive),
        ("FACE_PLATE_THICKNESS", 4.0, Positive),
        ("WALL_THICKNESS", 4.0, Positive),
        ("SHELF_DEPTH", 34.0, Positive),
        ("LIP_DEPTH", 3.0, Positive),
        ("LIP_INSET", 3.0, Positive),
        ("BOX_WIDTH", 62.0, Positive),
        ("BOX_TOLERANCE", 1.0, NonNegative),
        ("BOX_LEFT_X", 33.0, NonNegative),
        ("BOX_RIGHT_X", 116.0, NonNegative),
        ("BOX_HEIGHT", 37.0, Positive),
        ("CUTOUT_LIP", 3.0, NonNegative),
        ("TAB_RAIL_WIDTH", 15.0, Positive),
        ("TAB_OVERLAP_WIDTH", 12.0, Positive),
        ("TAB_DEPTH", 7.0, Positive),
        ("JOINT_SCREW_X", 7.0, Positive),
        ("JOINT_SCREW_Y_LOW", 11.0, Positive),
        ("JOINT_SCREW_Y_HIGH", 33.45, Positive),
        ("M3_CLEARANCE_RADIUS", 1.6, Positive),
        ("COUNTERBORE_RADIUS", 3.0, Positive),
        ("COUNTERBORE_DEPTH", 3.5, Positive),
        ("NUT_ACROSS_FLATS", 5.5, Positive),
        ("NUT_RECESS_DEPTH", 1.5, Positive),
        ("RAIL_HOLE_CENTER_DIA", 6.3, Positive),
        ("RAIL_HOLE_OUTER_DIA", 4.6, Positive),
        ("RAIL_HOLE_SPACING", 16.0, Positive),
        ("WALL_FILLET_RADIUS", 2.0, Positive),
        ("RETENTION_BAR_WIDTH", 4.0, Positive),
        ("RETENTION_BAR_DEPTH", 20.0, Positive),
    ] {
        p.define(name, value, constraint)?;
    }

    p.derive("TOTAL_DEPTH", |p| {
        Ok(p.get("LIP_DEPTH")? + p.get("FACE_PLATE_THICKNESS")? + p.get("SHELF_DEPTH")?)
    })?;
    p.derive("TAB_TOTAL_WIDTH", |p| {
        Ok(p.get("TAB_RAIL_WIDTH")? + p.get("TAB_OVERLAP_WIDTH")?)
    })?;
    p.derive("RAIL_HOLE_X_CENTER", |p| Ok(-p.get("TAB_RAIL_WIDTH")? / 2.0))?;
    p.derive("RAIL_HOLE_Y_CENTER", |p| Ok(p.get("RACK_1U_HEIGHT")? / 2.0))?;
    p.derive("HEX_CIRCUMRADIUS", |p| {
        Ok(hex_circumradius(p.get("NUT_ACROSS_FLATS")?))
    })?;
    p.derive("BOX_OPENING_WIDTH", |p| {
        Ok(p.get("BOX_WIDTH")? + p.get("BOX_TOLERANCE")?)
    })?;
    // The box sits on the bottom wall, so its bay spans the box height.
    p.derive("BOX_OPENING_HEIGHT", |p| p.get("BOX_HEIGHT"))?;
    p.derive("RETENTION_BAR_X_CENTER", |p| {
        let left_end = p.get("BOX_LEFT_X")? + p.get("BOX_OPENING_WIDTH")?;
        Ok((left_end + p.get("BOX_RIGHT_X")?) / 2.0)
    })?;
    Ok(p)
}

/// Prusa frame to 6U rail L-brackets.
pub fn bracket_parameters() -> Result<ParameterSet, ParamError> {
    let mut p = ParameterSet::new();
    for (name, value, constraint) in [
        ("FRAME_LEG_DEPTH", 45.0, Positive),
        ("FRAME_LEG_WIDTH", 40.0, Positive),
        ("FRAME_LEG_THICKNESS", 4.0, Positive),
        ("RAIL_LEG_HEIGHT", 39.0, Positive),
        ("RAIL_LEG_THICKNESS", 4.0, Positive),
        ("TOP_RAIL_EXTENSION", 97.0, Positive),
        ("BOTTOM_RAIL_EXTENSION", 95.0, Positive),
        ("ANGLE_BRACE_SIZE", 10.0, Positive),
        ("FRAME_HOLE_DIAMETER", 3.2, Positive),
        ("TOP_FRAME_HOLE_INNER", 17.5, Positive),
        ("TOP_FRAME_HOLE_OUTER", 37.5, Positive),
        ("TOP_FRAME_HOLE_Z", 10.0, Finite),
        ("BOTTOM_FRAME_HOLE_APEX_X", 27.5, Positive),
        ("BOTTOM_FRAME_HOLE_APEX_Z", 30.0, Finite),
        ("RAIL_HOLE_CENTER_DIA", 6.3, Positive),
        ("RAIL_HOLE_OUTER_DIA", 4.6, Positive),
        ("RAIL_HOLE_SPACING", 16.0, Positive),
        ("RAIL_HOLE_Y_CENTER", 19.5, Finite),
        ("TOP_RAIL_HOLE_CENTER", 70.0, Finite),
        ("BOTTOM_RAIL_HOLE_CENTER", -27.5, Finite),
    ] {
        p.define(name, value, constraint)?;
    }

    p.derive("TOP_EXTENSION_LENGTH", |p| {
        Ok(p.get("TOP_RAIL_EXTENSION")? - p.get("FRAME_LEG_WIDTH")?)
    })?;
    p.derive("BOTTOM_EXTENSION_LENGTH", |p| {
        Ok(p.get("BOTTOM_RAIL_EXTENSION")? - p.get("FRAME_LEG_WIDTH")?)
    })?;
    p.derive("FRAME_HOLE_RADIUS", |p| Ok(p.get("FRAME_HOLE_DIAMETER")? / 2.0))?;
    Ok(p)
}
