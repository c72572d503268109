//! Common types used across the workspace.

pub mod analytic;
pub mod id;

pub use analytic::{AnalyticDistribution, AnalyticError};
pub use id::*;
