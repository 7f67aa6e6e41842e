//! Shared value types for the feature-tree engine.
//!
//! Everything here is plain data plus pure geometry: no kernel handles,
//! no I/O. Higher crates build sketches, selections and bodies on top.

pub mod frame;
pub mod geom;
pub mod params;
pub mod profile;
pub mod topo;

pub use frame::*;
pub use geom::*;
pub use params::*;
pub use profile::*;
pub use topo::*;
