//! Core data types for depsync.
//!
//! This crate defines the vocabulary shared by the resolver and the project
//! model: usage scopes, module coordinates, configurations, artifacts, the
//! resolution report produced by an external engine, and the project and
//! module settings read from `depsync.toml`.
//!
//! Nothing in this crate is async or touches the network.

pub mod artifact;
pub mod configuration;
pub mod coordinate;
pub mod project;
pub mod properties;
pub mod report;
pub mod scope;
pub mod settings;
