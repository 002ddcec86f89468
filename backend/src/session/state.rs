//! The download session state machine: input -> preview -> downloading

use crate::config::Language;
use crate::media::{self, FormatOption, LookupError, ResolvedMedia};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Which view the session is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Input,
    Preview,
    Downloading,
}

/// Progress state while in [`Phase::Downloading`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Downloading,
    Completed,
    Error,
}

impl DownloadStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Downloading)
    }
}

/// Rejected session transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    /// Carries the message to display, already localized
    #[error("{0}")]
    InvalidUrl(String),

    #[error("Session is in {actual:?}, expected {expected:?}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("A lookup is already in progress")]
    LookupInProgress,

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Download is still in progress")]
    DownloadInProgress,

    #[error("No download is running")]
    NotDownloading,

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Lookup task failed: {0}")]
    LookupTask(String),
}

/// One user's walk through the downloader views
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSession {
    id: String,
    phase: Phase,
    loading: bool,
    error: Option<String>,
    media: Option<ResolvedMedia>,
    format: Option<FormatOption>,
    file_name: Option<String>,
    progress: u8,
    status: DownloadStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for DownloadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            phase: Phase::Input,
            loading: false,
            error: None,
            media: None,
            format: None,
            file_name: None,
            progress: 0,
            status: DownloadStatus::Downloading,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn media(&self) -> Option<&ResolvedMedia> {
        self.media.as_ref()
    }

    pub fn selected_format(&self) -> Option<&FormatOption> {
        self.format.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn status(&self) -> DownloadStatus {
        self.status
    }

    /// Validate a submitted URL and mark the lookup as in flight.
    ///
    /// On rejection the session stays in input with a display message set.
    pub fn begin_lookup(&mut self, url: &str, language: Language) -> Result<(), SessionError> {
        self.expect_phase(Phase::Input)?;
        if self.loading {
            return Err(SessionError::LookupInProgress);
        }

        self.error = None;
        if url.trim().is_empty() || !media::is_valid_url(url) {
            let message = language.invalid_url_message().to_string();
            self.error = Some(message.clone());
            self.touch();
            return Err(SessionError::InvalidUrl(message));
        }

        self.loading = true;
        self.touch();
        Ok(())
    }

    /// Finish a lookup and move to the preview
    pub fn complete_lookup(&mut self, media: ResolvedMedia) -> Result<(), SessionError> {
        self.expect_phase(Phase::Input)?;
        self.loading = false;
        self.media = Some(media);
        self.phase = Phase::Preview;
        self.touch();
        Ok(())
    }

    /// Give up on a lookup, staying in input
    pub fn abort_lookup(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
        self.touch();
    }

    /// Pick a format from the preview and start downloading it
    pub fn select_format(&mut self, quality: &str) -> Result<FormatOption, SessionError> {
        self.expect_phase(Phase::Preview)?;
        let resolved = self.media.as_ref().ok_or(SessionError::WrongPhase {
            expected: Phase::Preview,
            actual: self.phase,
        })?;
        let format = resolved
            .media
            .format(quality)
            .cloned()
            .ok_or_else(|| SessionError::UnknownFormat(quality.to_string()))?;

        self.file_name = Some(media::download_file_name(&resolved.media, &format));
        self.format = Some(format.clone());
        self.phase = Phase::Downloading;
        self.progress = 0;
        self.status = DownloadStatus::Downloading;
        self.error = None;
        self.touch();
        Ok(format)
    }

    /// Add `step` percentage points, completing the download at 100
    pub fn advance(&mut self, step: u8) -> Result<DownloadStatus, SessionError> {
        self.expect_running()?;

        self.progress = self.progress.saturating_add(step).min(100);
        if self.progress == 100 {
            self.status = DownloadStatus::Completed;
        }
        self.touch();
        Ok(self.status)
    }

    /// Mark the running download as failed
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        self.expect_running()?;
        self.status = DownloadStatus::Error;
        self.error = Some(message.into());
        self.touch();
        Ok(())
    }

    /// Return to input, clearing everything but identity
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.loading {
            return Err(SessionError::LookupInProgress);
        }
        if self.phase == Phase::Downloading && !self.status.is_terminal() {
            return Err(SessionError::DownloadInProgress);
        }

        self.phase = Phase::Input;
        self.error = None;
        self.media = None;
        self.format = None;
        self.file_name = None;
        self.progress = 0;
        self.status = DownloadStatus::Downloading;
        self.touch();
        Ok(())
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), SessionError> {
        if self.phase != expected {
            return Err(SessionError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn expect_running(&self) -> Result<(), SessionError> {
        if self.phase != Phase::Downloading || self.status.is_terminal() {
            return Err(SessionError::NotDownloading);
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
