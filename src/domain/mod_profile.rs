use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One catalog entry (a "mod") as mirrored from the remote service.
/// This is the root entity for all per-mod data on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModProfile {
    /// Remote identifier, unique and stable across the mod's lifetime
    pub id: u64,

    /// Display name
    pub name: String,

    /// URL-safe name
    pub name_id: String,

    /// One-line summary
    pub summary: String,

    /// Long-form description (if set by the author)
    pub description: Option<String>,

    /// Author-assigned tags
    pub tags: Vec<String>,

    /// Logo image sources, one URL per size
    pub logo: LogoLocator,

    /// Gallery image sources uploaded by the author. Absent in records
    /// persisted before galleries were mirrored.
    #[serde(default)]
    pub media: Vec<GalleryImageLocator>,

    /// Id of the modfile currently marked as the live build
    pub primary_modfile_id: u64,

    /// When the mod was registered remotely
    pub date_added: DateTime<Utc>,

    /// Last remote modification
    pub date_updated: DateTime<Utc>,

    /// Free-form key/value metadata attached by the author
    pub metadata: serde_json::Value,
}

impl ModProfile {
    /// Gallery image locator by its remote file name, if the mod has one.
    pub fn gallery_image(&self, file_name: &str) -> Option<&GalleryImageLocator> {
        self.media.iter().find(|l| l.file_name == file_name)
    }
}

/// Remote image sources for a mod logo, one per rendered size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogoLocator {
    pub original: String,
    pub thumb_320x180: String,
    pub thumb_640x360: String,
    pub thumb_1280x720: String,
}

/// Rendered logo size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoVersion {
    Thumb320x180,
    Thumb640x360,
    Thumb1280x720,
    Original,
}

impl LogoLocator {
    pub fn url_for(&self, version: LogoVersion) -> &str {
        match version {
            LogoVersion::Thumb320x180 => &self.thumb_320x180,
            LogoVersion::Thumb640x360 => &self.thumb_640x360,
            LogoVersion::Thumb1280x720 => &self.thumb_1280x720,
            LogoVersion::Original => &self.original,
        }
    }
}

impl std::fmt::Display for LogoVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogoVersion::Thumb320x180 => write!(f, "320x180"),
            LogoVersion::Thumb640x360 => write!(f, "640x360"),
            LogoVersion::Thumb1280x720 => write!(f, "1280x720"),
            LogoVersion::Original => write!(f, "original"),
        }
    }
}

/// Remote sources for one gallery image, keyed by its remote file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryImageLocator {
    pub file_name: String,
    pub original: String,
    pub thumb_320x180: String,
}

/// Rendered gallery image size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryImageVersion {
    Thumb320x180,
    Original,
}

impl GalleryImageLocator {
    pub fn url_for(&self, version: GalleryImageVersion) -> &str {
        match version {
            GalleryImageVersion::Thumb320x180 => &self.thumb_320x180,
            GalleryImageVersion::Original => &self.original,
        }
    }
}

impl std::fmt::Display for GalleryImageVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GalleryImageVersion::Thumb320x180 => write!(f, "320x180"),
            GalleryImageVersion::Original => write!(f, "original"),
        }
    }
}

/// State of a mod's downloaded binary relative to its primary modfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModBinaryStatus {
    /// No artifact downloaded at all
    Missing,
    /// An older artifact exists, but not the primary one
    RequiresUpdate,
    /// The primary artifact is on disk
    UpToDate,
}
