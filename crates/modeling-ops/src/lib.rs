//! One-operation executors over a [`KernelBundle`].
//!
//! Each executor validates its numeric input, issues one or more backend
//! descriptors, and returns the new solid handle with diagnostics. None of
//! them know about feature history.

pub mod fillet;
pub mod kernel_ext;
pub mod mirror;
pub mod pad;
pub mod pocket;
pub mod types;

pub use fillet::{execute_fillet, in_plane_extent};
pub use kernel_ext::KernelBundle;
pub use mirror::{execute_mirror, reflection_matrix};
pub use pad::execute_pad;
pub use pocket::{execute_pocket, through_all_sweep, THROUGH_ALL_MARGIN};
pub use types::*;
