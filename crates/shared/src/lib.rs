//! Shared types and configuration for the petty cash desk.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Analytic distributions carried by ledger lines
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, LoggingConfig, PettyCashConfig, SequenceConfig};
