// src/domain/mod.rs
//
// Domain Root - entities mirrored from the remote catalog plus the
// durable sync records that track them locally.

pub mod catalog;
pub mod manifest;
pub mod mod_event;
pub mod mod_profile;
pub mod modfile;
pub mod user;

pub use catalog::CatalogProfile;
pub use manifest::Manifest;
pub use mod_event::{ModEvent, ModEventType};
pub use mod_profile::{
    GalleryImageLocator, GalleryImageVersion, LogoLocator, LogoVersion, ModBinaryStatus,
    ModProfile,
};
pub use modfile::Modfile;
pub use user::{AuthenticatedUser, UserProfile};

use thiserror::Error;

/// Violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// A mod profile must carry a usable id and name before it may be cached.
pub fn validate_mod_profile(profile: &ModProfile) -> DomainResult<()> {
    if profile.id == 0 {
        return Err(DomainError::InvariantViolation(
            "mod profile id must be non-zero".to_string(),
        ));
    }
    if profile.name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "mod profile {} has an empty name",
            profile.id
        )));
    }
    Ok(())
}

/// A modfile record must reference its owning mod and a download source.
pub fn validate_modfile(modfile: &Modfile) -> DomainResult<()> {
    if modfile.id == 0 || modfile.mod_id == 0 {
        return Err(DomainError::InvariantViolation(
            "modfile ids must be non-zero".to_string(),
        ));
    }
    if modfile.download_url.trim().is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "modfile {} has no download url",
            modfile.id
        )));
    }
    Ok(())
}

/// Shared fixtures for unit tests across the crate.
#[cfg(test)]
pub mod testutil {
    use super::*;
    use chrono::Utc;

    pub fn sample_profile(id: u64) -> ModProfile {
        ModProfile {
            id,
            name: format!("Mod {}", id),
            name_id: format!("mod-{}", id),
            summary: "A test mod".to_string(),
            description: None,
            tags: vec!["test".to_string()],
            logo: LogoLocator::default(),
            media: Vec::new(),
            primary_modfile_id: id * 10,
            date_added: Utc::now(),
            date_updated: Utc::now(),
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    pub fn sample_modfile(mod_id: u64, modfile_id: u64) -> Modfile {
        Modfile {
            id: modfile_id,
            mod_id,
            version: Some("1.0.0".to_string()),
            changelog: None,
            filesize: 64,
            filehash: String::new(),
            download_url: format!("https://example.com/mods/{}/{}.zip", mod_id, modfile_id),
            date_added: Utc::now(),
        }
    }

    pub fn sample_event(id: u64, mod_id: u64, event_type: ModEventType) -> ModEvent {
        ModEvent {
            id,
            mod_id,
            event_type,
            date_added: Utc::now(),
        }
    }
}
