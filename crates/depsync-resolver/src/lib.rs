//! Dependency resolution orchestration: configuration graph ordering,
//! resolution report walking, internal/external classification, scope
//! assignment and problem collection.
//!
//! The resolution engine itself is an external collaborator reached through
//! the traits in [`engine`].

pub mod cache;
pub mod dependency;
pub mod engine;
pub mod graph;
pub mod problem;
pub mod resolver;
