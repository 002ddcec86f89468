//! Download sessions: the view state machine, its progress ticker and the manager owning them

mod manager;
mod state;
pub mod ticker;

pub use manager::{SessionManager, SessionStats};
pub use state::{DownloadSession, DownloadStatus, Phase, SessionError};

use serde::Serialize;

/// Progress update sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub session_id: String,
    pub progress: u8,
    pub status: DownloadStatus,
    pub error: Option<String>,
    pub file_name: Option<String>,
}

impl ProgressUpdate {
    pub fn from_session(session: &DownloadSession) -> Self {
        Self {
            session_id: session.id().to_string(),
            progress: session.progress(),
            status: session.status(),
            error: session.error().map(str::to_string),
            file_name: session.file_name().map(str::to_string),
        }
    }
}
