// src/repositories/mod.rs
//
// Persistence layer: disk-backed stores for the manifest, per-mod records
// and the authenticated session.

pub mod manifest_repository;
pub mod mod_repository;
pub mod user_repository;

pub use manifest_repository::{JsonManifestRepository, ManifestRepository};
pub use mod_repository::{DiskModRepository, ModRepository};
pub use user_repository::{JsonUserRepository, UserRepository};
