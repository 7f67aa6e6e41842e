//! Concrete bodies built on the feature engine: the 10-inch rack panel
//! and the Prusa rack brackets, plus the fail-fast build orchestrator.

pub mod brackets;
pub mod errors;
pub mod orchestrate;
pub mod params;
pub mod rack_panel;

pub use brackets::{Bracket, BracketKind};
pub use errors::RecipeError;
pub use orchestrate::{
    build_design, export_design, BodyPlan, BodyRecipe, BuildFailure, BuildReport, BuiltBody,
    Design, MirrorPlane, MirrorRecipe, PlannedBody,
};
pub use params::{bracket_parameters, rack_panel_parameters};
pub use rack_panel::{CenterPanel, LeftTab};
