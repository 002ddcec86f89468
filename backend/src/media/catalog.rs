//! Mock media catalog
//!
//! Stands in for a real Instagram lookup: every valid URL resolves to the
//! same sample descriptor with the content ID echoed back.

use super::{extract_id, is_valid_url, FormatOption, MediaDescriptor, MediaKind, MediaType, ResolvedMedia};
use thiserror::Error;

/// Reasons a URL cannot be resolved to media
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Invalid Instagram URL")]
    InvalidUrl,

    #[error("Could not extract Instagram ID")]
    ExtractionFailure,
}

/// Source of synthetic media descriptors
#[derive(Debug, Clone)]
pub struct MockCatalog {
    template: MediaDescriptor,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(sample_descriptor())
    }
}

impl MockCatalog {
    pub fn new(template: MediaDescriptor) -> Self {
        Self { template }
    }

    /// Resolve an Instagram URL into mock media metadata
    pub fn resolve(&self, url: &str) -> Result<ResolvedMedia, LookupError> {
        if !is_valid_url(url) {
            return Err(LookupError::InvalidUrl);
        }
        let id = extract_id(url).ok_or(LookupError::ExtractionFailure)?;

        let mut media = self.template.clone();
        media.id = id.to_string();

        Ok(ResolvedMedia {
            media,
            original_url: url.to_string(),
        })
    }
}

/// Build the file name a format would be saved under
pub fn download_file_name(media: &MediaDescriptor, format: &FormatOption) -> String {
    let extension = extension_from_url(&format.url)
        .unwrap_or_else(|| format.media_kind.default_extension().to_string());
    let quality = format
        .quality
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();

    format!("instagram_{}_{}.{}", media.id, quality, extension)
}

fn extension_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let last = parsed.path_segments()?.last()?;
    let decoded = urlencoding::decode(last)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last.to_string());
    let (stem, ext) = decoded.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_lowercase())
}

/// The sample item every lookup returns
pub fn sample_descriptor() -> MediaDescriptor {
    MediaDescriptor {
        id: "sample123".to_string(),
        media_type: MediaType::Video,
        thumbnail_url: "https://images.pexels.com/photos/1851415/pexels-photo-1851415.jpeg?auto=compress&cs=tinysrgb&w=400".to_string(),
        title: "Amazing Instagram Content".to_string(),
        duration: Some(45),
        view_count: Some(12_500),
        author: "@sample_user".to_string(),
        formats: vec![
            format_option("1080p", 15_728_640, "https://example.com/video_1080p.mp4", MediaKind::Video),
            format_option("720p", 10_485_760, "https://example.com/video_720p.mp4", MediaKind::Video),
            format_option("480p", 5_242_880, "https://example.com/video_480p.mp4", MediaKind::Video),
            format_option("MP3", 2_097_152, "https://example.com/audio.mp3", MediaKind::Audio),
        ],
    }
}

fn format_option(quality: &str, size_bytes: u64, url: &str, media_kind: MediaKind) -> FormatOption {
    FormatOption {
        quality: quality.to_string(),
        size_bytes,
        url: url.to_string(),
        media_kind,
    }
}
