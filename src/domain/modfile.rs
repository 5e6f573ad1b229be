use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One released build of a mod.
///
/// Modfile records are content-addressed by id and immutable once written
/// to disk; a new release always arrives as a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modfile {
    /// Remote modfile id
    pub id: u64,

    /// Owning mod
    pub mod_id: u64,

    /// Author-supplied version string
    pub version: Option<String>,

    pub changelog: Option<String>,

    /// Archive size in bytes
    pub filesize: u64,

    /// Lowercase hex SHA-256 of the archive, as reported by the remote
    /// service. Empty when the remote record carries no hash.
    pub filehash: String,

    /// Where the binary archive can be fetched from
    pub download_url: String,

    pub date_added: DateTime<Utc>,
}

impl Modfile {
    /// Hash to verify a download against, if the remote supplied one.
    pub fn expected_hash(&self) -> Option<String> {
        if self.filehash.is_empty() {
            None
        } else {
            Some(self.filehash.to_lowercase())
        }
    }
}
