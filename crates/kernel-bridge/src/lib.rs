//! Backend collaborator contract and its implementations.
//!
//! The engine talks to a solid modeler exclusively through [`Kernel`]
//! (one [`OpDescriptor`] in, one [`BackendReply`] out) and reads the
//! resulting boundary through [`KernelIntrospect`].

pub mod descriptor;
pub mod prism;
pub mod traits;
pub mod types;

pub use descriptor::*;
pub use prism::PrismKernel;
pub use traits::*;
pub use types::*;
