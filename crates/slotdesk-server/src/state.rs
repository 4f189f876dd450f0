use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use slotdesk_core::config::Config;
use slotdesk_core::context::{BoundSession, SessionContext};
use slotdesk_core::editor::SlotEditor;
use slotdesk_core::notify::Notifier;
use slotdesk_core::session::MemorySessionStore;
use slotdesk_core::store::SlotDb;
use slotdesk_core::types::{Collection, SessionToken};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

pub type Sessions = SessionContext<MemorySessionStore>;
pub type PageEditor<N> = SlotEditor<SlotDb, BoundSession<MemorySessionStore>, N>;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub slots: SlotDb,
    pub sessions: Sessions,
}

impl AppState {
    /// Build state from an already loaded config. Opens the slot database
    /// and, inside a Tokio runtime, starts the expired-session sweeper.
    pub fn new(root: PathBuf, config: Config) -> slotdesk_core::Result<Self> {
        let sessions = SessionContext::new(MemorySessionStore::from_config(&config.auth)?);
        let slots = SlotDb::open(&config.db_path(&root))?;
        let state = Self {
            root,
            config: Arc::new(config),
            slots,
            sessions,
        };

        // Expired sessions are only noticed on lookup otherwise; sweep them
        // so open event streams hear about the sign-out.
        if tokio::runtime::Handle::try_current().is_ok() {
            let sessions = state.sessions.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(PURGE_INTERVAL);
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let purged = sessions.store().purge_expired().await;
                    if purged > 0 {
                        let active = sessions.store().active_sessions().await;
                        tracing::info!(purged, active, "expired sessions removed");
                    }
                }
            });
        }

        Ok(state)
    }

    pub fn load(root: PathBuf) -> slotdesk_core::Result<Self> {
        let config = Config::load(&root)?;
        Self::new(root, config)
    }

    /// A fresh editor for one request, bound to the caller's session.
    pub fn editor<N: Notifier>(
        &self,
        collection: Collection,
        token: Option<SessionToken>,
        notifier: N,
    ) -> PageEditor<N> {
        SlotEditor::new(
            collection,
            self.slots.clone(),
            self.sessions.bind(token),
            notifier,
        )
        .with_saved_pulse(self.config.editor.saved_pulse())
        .with_load_policy(self.config.errors.load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn new_state_opens_database_under_root() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(dir.path().to_path_buf(), Config::new()).unwrap();
        assert_eq!(state.root, dir.path());
        assert!(dir.path().join(".slotdesk/slots.redb").exists());
    }

    #[test]
    fn out_of_range_session_ttl_is_rejected_at_startup() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new();
        config.auth.session_ttl_minutes = 200_000_000_000_000;
        let err = AppState::new(dir.path().to_path_buf(), config).err().unwrap();
        assert!(matches!(err, slotdesk_core::SlotError::Session(_)));
    }

    #[test]
    fn load_without_config_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        let err = AppState::load(dir.path().to_path_buf()).err().unwrap();
        assert!(matches!(err, slotdesk_core::SlotError::NotInitialized));
    }
}
