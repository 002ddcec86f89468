//! Session manager: owns live sessions, runs lookups and drives progress tickers

use super::state::{DownloadSession, DownloadStatus, Phase, SessionError};
use super::ticker::{self, ProgressSignal, ProgressSource, SimulatedTransfer, TickerHandle};
use super::ProgressUpdate;
use crate::config::{Language, SimulationSettings};
use crate::media::MockCatalog;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Inner state shared with the tickers
struct SessionManagerInner {
    /// Live sessions by id
    sessions: RwLock<HashMap<String, DownloadSession>>,

    /// Running progress tickers by session id
    tickers: RwLock<HashMap<String, TickerHandle>>,

    catalog: MockCatalog,
    simulation: SimulationSettings,
}

/// Owns every download session and fans out their progress
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,

    /// Broadcast channel for progress updates
    progress_tx: broadcast::Sender<ProgressUpdate>,
}

impl SessionManager {
    pub fn new(catalog: MockCatalog, simulation: SimulationSettings) -> Self {
        let (progress_tx, _) = broadcast::channel(1000);

        Self {
            inner: Arc::new(SessionManagerInner {
                sessions: RwLock::new(HashMap::new()),
                tickers: RwLock::new(HashMap::new()),
                catalog,
                simulation,
            }),
            progress_tx,
        }
    }

    /// Subscribe to progress updates
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdate> {
        self.progress_tx.subscribe()
    }

    /// Open a new session in the input view
    pub fn create(&self) -> DownloadSession {
        let session = DownloadSession::new();
        self.inner
            .sessions
            .write()
            .insert(session.id().to_string(), session.clone());
        debug!("Session {} created", session.id());
        session
    }

    /// Snapshot of a session
    pub fn get(&self, id: &str) -> Option<DownloadSession> {
        self.inner.sessions.read().get(id).cloned()
    }

    /// Discard a session, stopping its ticker if one is running
    pub fn remove(&self, id: &str) -> bool {
        self.inner.tickers.write().remove(id);
        let removed = self.inner.sessions.write().remove(id).is_some();
        if removed {
            debug!("Session {} removed", id);
        }
        removed
    }

    /// Submit a URL: validate, wait out the lookup delay, then show the preview
    ///
    /// The delay and completion run on their own task, so the session still
    /// settles if the caller stops waiting.
    pub async fn submit(
        &self,
        id: &str,
        url: &str,
        language: Language,
    ) -> Result<DownloadSession, SessionError> {
        self.with_session(id, |session| session.begin_lookup(url, language))?;
        info!("Looking up {} for session {}", url, id);

        let manager = self.clone();
        let (id, url) = (id.to_string(), url.to_string());
        tokio::spawn(async move { manager.finish_lookup(&id, &url).await })
            .await
            .map_err(|e| SessionError::LookupTask(e.to_string()))?
    }

    async fn finish_lookup(&self, id: &str, url: &str) -> Result<DownloadSession, SessionError> {
        tokio::time::sleep(self.inner.simulation.lookup_delay()).await;
        let lookup = self.inner.catalog.resolve(url);

        self.with_session(id, |session| {
            match lookup {
                Ok(media) => session.complete_lookup(media)?,
                Err(e) => {
                    session.abort_lookup(e.to_string());
                    return Err(e.into());
                }
            }
            Ok(session.clone())
        })
    }

    /// Select a format and start the simulated download
    pub fn start_download(&self, id: &str, quality: &str) -> Result<DownloadSession, SessionError> {
        let source = SimulatedTransfer::new(self.inner.simulation.progress_step);
        self.start_download_with(id, quality, source)
    }

    /// Select a format and drive its progress from `source`
    pub fn start_download_with<S: ProgressSource>(
        &self,
        id: &str,
        quality: &str,
        source: S,
    ) -> Result<DownloadSession, SessionError> {
        let snapshot = self.with_session(id, |session| {
            session.select_format(quality)?;
            Ok(session.clone())
        })?;
        info!(
            "Session {} downloading {}",
            id,
            snapshot.file_name().unwrap_or_default()
        );

        let _ = self.progress_tx.send(ProgressUpdate::from_session(&snapshot));

        // Held across spawn so a fast first tick cannot look for the handle before it exists
        let mut tickers = self.inner.tickers.write();
        let handle = ticker::spawn(
            self.inner.simulation.tick_interval(),
            progress_callback(
                Arc::downgrade(&self.inner),
                self.progress_tx.clone(),
                id.to_string(),
                source,
            ),
        );
        tickers.insert(id.to_string(), handle);

        Ok(snapshot)
    }

    /// Return a finished session to the input view
    pub fn reset(&self, id: &str) -> Result<DownloadSession, SessionError> {
        self.with_session(id, |session| {
            session.reset()?;
            Ok(session.clone())
        })
    }

    /// Get current statistics
    pub fn stats(&self) -> SessionStats {
        let sessions = self.inner.sessions.read();
        let active = sessions
            .values()
            .filter(|s| s.phase() == Phase::Downloading && s.status() == DownloadStatus::Downloading)
            .count();

        SessionStats {
            sessions: sessions.len(),
            active,
        }
    }

    fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut DownloadSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut sessions = self.inner.sessions.write();
        let session = sessions.get_mut(id).ok_or(SessionError::NotFound)?;
        f(session)
    }
}

fn progress_callback<S: ProgressSource>(
    inner: Weak<SessionManagerInner>,
    progress_tx: broadcast::Sender<ProgressUpdate>,
    id: String,
    mut source: S,
) -> impl FnMut(u32) -> ControlFlow<()> + Send + 'static {
    move |tick| {
        let Some(inner) = inner.upgrade() else {
            return ControlFlow::Break(());
        };

        let mut sessions = inner.sessions.write();
        let Some(session) = sessions.get_mut(&id) else {
            return ControlFlow::Break(());
        };

        let outcome = match source.poll() {
            ProgressSignal::Advance(step) => session.advance(step).map(|_| ()),
            ProgressSignal::Failed(message) => session.fail(message),
        };
        if let Err(e) = outcome {
            debug!("Session {} stopped ticking: {}", id, e);
            return ControlFlow::Break(());
        }

        let update = ProgressUpdate::from_session(session);
        debug!("Session {} tick {}: {}%", id, tick, update.progress);

        let finished = update.status.is_terminal();
        if finished {
            // Still under the sessions lock, so a restarted download cannot be unregistered here
            inner.tickers.write().remove(&id);
            info!("Session {} download {:?}", id, update.status);
        }
        drop(sessions);

        let _ = progress_tx.send(update);

        if finished {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Session statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionStats {
    pub sessions: usize,
    pub active: usize,
}
