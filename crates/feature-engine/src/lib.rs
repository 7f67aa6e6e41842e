//! Feature history, selection and recomputation.
//!
//! A [`Body`] is an ordered list of [`Feature`]s plus the tip they produce.
//! Features locate their attachment faces and fillet edges through
//! geometric queries ([`select_face`], [`select_edges`]) resolved against
//! the tip at execution time, so a history replays identically through
//! [`recompute`].

pub mod rebuild;
pub mod select;
pub mod sketch;
pub mod tree;
pub mod types;

pub use rebuild::{mirror_body, recompute};
pub use select::{matching_faces, select_edges, select_face};
pub use sketch::{resolve_sketch, ResolvedSketch};
pub use tree::Body;
pub use types::*;
