//! Closed 2D profile construction from explicit coordinates.
//!
//! Every builder is pure: same inputs, same loop, no side effects. Polygonal
//! results are normalized to counter-clockwise winding in the sketch frame.

pub mod errors;
pub mod profiles;
pub mod validate;

pub use errors::ProfileError;
pub use profiles::*;
pub use validate::validate_loops;
