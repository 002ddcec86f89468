//! Media metadata types, URL validation and display formatting

mod catalog;
mod format;
mod validate;

pub use catalog::*;
pub use format::*;
pub use validate::*;

use serde::{Deserialize, Serialize};

/// Kind of Instagram content a descriptor points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Image,
    Story,
    Profile,
}

/// Whether a format carries video or only audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Extension used when the format URL does not carry one
    pub fn default_extension(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }
}

/// One selectable quality variant of a media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOption {
    pub quality: String,

    #[serde(rename = "size")]
    pub size_bytes: u64,

    pub url: String,

    #[serde(rename = "type")]
    pub media_kind: MediaKind,
}

/// Metadata bundle describing a downloadable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub id: String,

    #[serde(rename = "type")]
    pub media_type: MediaType,

    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,

    pub title: String,

    /// Length in seconds, for playable media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(rename = "views", default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,

    pub author: String,

    pub formats: Vec<FormatOption>,
}

impl MediaDescriptor {
    /// Look up a format by its quality label
    pub fn format(&self, quality: &str) -> Option<&FormatOption> {
        self.formats.iter().find(|f| f.quality == quality)
    }
}

/// A descriptor together with the URL it was resolved from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMedia {
    #[serde(flatten)]
    pub media: MediaDescriptor,

    pub original_url: String,
}
