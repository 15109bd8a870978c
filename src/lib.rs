//! depmatrix - update matrix builder library
//!
//! This library provides the core functionality for turning the declared
//! dependencies of a multi-package npm project into update groups:
//! - Manifest collection with "lowest version wins" reconciliation
//! - Latest-version lookups against the npm registry
//! - Grouping by scope and target version, with `@types` companions
//! - Matrix assembly and output

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod update;
