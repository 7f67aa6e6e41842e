//! Test harness for scripted modeling workflows.
//!
//! Provides programmatic tools for building bodies step by step,
//! verifying geometry with sampling oracles, and generating diagnostic
//! output.
//!
//! # Key Components
//!
//! - [`ModelBuilder`]: fluent API over a `Body` and a `PrismKernel`
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`report`]: structured text model descriptions
//! - [`helpers`]: error type, profile builders, sampling, mesh math
//! - [`assertions`]: verdict and history assertions with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod workflow;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::ModelReport;
pub use workflow::ModelBuilder;
