//! Process-wide registry of live browser sessions.
//!
//! Sessions are created on the first page load that carries no (or an
//! unknown) session cookie, refreshed on every access and discarded once
//! they have been idle for longer than the configured TTL.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::config::SessionConfig;

use super::state::{ChatSession, SessionId, SharedSession};

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// Concurrent map of [`SessionId`] → [`SharedSession`].
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionEntry>,
    idle_ttl: Duration,
    audio_dir: PathBuf,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration, audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_ttl,
            audio_dir: audio_dir.into(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            Duration::from_secs(config.idle_ttl_secs),
            config.audio_dir.clone(),
        )
    }

    /// Resolve the session named by `cookie`, or start a fresh one.
    ///
    /// Returns the session handle and `true` when a new session was created
    /// (the caller must then hand the new id back to the browser).
    pub fn resolve(&self, cookie: Option<&str>) -> (SessionId, SharedSession, bool) {
        self.prune_expired();

        if let Some(id) = cookie.and_then(|c| c.parse::<SessionId>().ok()) {
            if let Some(mut entry) = self.sessions.get_mut(&id) {
                entry.last_seen = Instant::now();
                return (id, Arc::clone(&entry.session), false);
            }
        }

        let id = SessionId::generate();
        let session = Arc::new(Mutex::new(ChatSession::new(id, self.audio_path(&id))));
        self.sessions.insert(
            id,
            SessionEntry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );
        log::debug!("session {id}: created");
        (id, session, true)
    }

    /// Drop every session idle for longer than the TTL, along with any
    /// recording it left behind.
    pub fn prune_expired(&self) {
        let ttl = self.idle_ttl;
        let mut expired = Vec::new();
        self.sessions.retain(|id, entry| {
            let keep = entry.last_seen.elapsed() <= ttl;
            if !keep {
                expired.push(*id);
            }
            keep
        });

        for id in expired {
            log::debug!("session {id}: expired");
            let path = self.audio_path(&id);
            if path.exists() {
                if let Err(e) = std::fs::remove_file(&path) {
                    log::warn!("could not remove stale recording {}: {e}", path.display());
                }
            }
        }
    }

    /// Where the recorder upload of session `id` is stored until transcribed.
    pub fn audio_path(&self, id: &SessionId) -> PathBuf {
        self.audio_dir.join(format!("recorded_audio-{id}.wav"))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn unknown_cookie_creates_session() {
        let store = SessionStore::new(Duration::from_secs(60), "/tmp");
        let (id, session, created) = store.resolve(None);

        assert!(created);
        let session = session.lock().await;
        assert_eq!(session.id(), id);
        assert_eq!(session.recording_path(), store.audio_path(&id));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn known_cookie_returns_same_session() {
        let store = SessionStore::new(Duration::from_secs(60), "/tmp");
        let (id, first, _) = store.resolve(None);
        first.lock().await.transcript.append_exchange("a", "b");

        let cookie = id.to_string();
        let (again, second, created) = store.resolve(Some(&cookie));

        assert!(!created);
        assert_eq!(again, id);
        assert_eq!(second.lock().await.transcript.len(), 2);
    }

    #[test]
    fn malformed_cookie_starts_fresh_session() {
        let store = SessionStore::new(Duration::from_secs(60), "/tmp");
        let (_, _, created) = store.resolve(Some("%%%"));
        assert!(created);
    }

    #[test]
    fn idle_sessions_expire() {
        let store = SessionStore::new(Duration::ZERO, "/tmp");
        let (id, _, _) = store.resolve(None);
        std::thread::sleep(Duration::from_millis(5));

        let (other, _, created) = store.resolve(Some(&id.to_string()));
        assert!(created);
        assert_ne!(other, id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn expiry_removes_leftover_recording() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(Duration::ZERO, dir.path());
        let (id, _, _) = store.resolve(None);
        let path = store.audio_path(&id);
        std::fs::write(&path, b"RIFF").unwrap();
        std::thread::sleep(Duration::from_millis(5));

        store.prune_expired();

        assert!(!path.exists());
        assert!(store.is_empty());
    }

    #[test]
    fn audio_paths_are_unique_per_session() {
        let store = SessionStore::new(Duration::from_secs(60), "/var/tmp/voice-chat");
        let (a, _, _) = store.resolve(None);
        let (b, _, _) = store.resolve(None);

        let pa = store.audio_path(&a);
        let pb = store.audio_path(&b);
        assert_ne!(pa, pb);
        assert!(pa.starts_with("/var/tmp/voice-chat"));
        assert!(pa.to_string_lossy().ends_with(".wav"));
    }
}
