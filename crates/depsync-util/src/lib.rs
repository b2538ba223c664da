//! Shared utilities for depsync.
//!
//! This crate provides cross-cutting concerns used by all other depsync crates:
//! error types, filesystem helpers and terminal status output.

pub mod errors;
pub mod fs;
pub mod progress;
