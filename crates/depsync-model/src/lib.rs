//! The project model: per-module library and module dependency entries,
//! edited through transactional modifiable models, and the reconciliation
//! that makes them match a resolution outcome.

pub mod library_cache;
pub mod local;
pub mod store;
pub mod transaction;
pub mod wrapper;
