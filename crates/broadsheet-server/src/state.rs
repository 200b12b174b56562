use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use tokio::sync::Mutex;

use broadsheet_core::analytics::AnalyticsSource;
use broadsheet_core::config::Config;

use crate::links;
use crate::session::{Session, SessionIds, SessionLog};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// The analytics platform. The HTTP client in production.
    pub source: Arc<dyn AnalyticsSource>,

    pub sessions: SessionIds,

    /// CSV log appended to by every session.
    pub log: Arc<SessionLog>,

    /// Held for the whole of a report build, so builds run one at a time.
    pub build_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn AnalyticsSource>) -> Self {
        let log = SessionLog::new(config.log_file(), config.timezone);
        Self {
            config: Arc::new(config),
            source,
            sessions: SessionIds::new(),
            log: Arc::new(log),
            build_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Current wall-clock time in the configured time zone.
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.config.timezone).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.local_now().date()
    }

    pub fn start_session(&self, organisation: &str, project: &str) -> Session {
        Session::new(self.sessions.next_id(), self.local_now(), organisation, project)
    }

    pub fn session_dir(&self, session: &Session) -> PathBuf {
        self.config.cache_root.join(session.dir_name())
    }

    /// Path the browser is redirected to for one file of a session's bundle.
    pub fn bundle_path(&self, session: &Session, file: &str) -> String {
        links::path_of(&[
            self.config.cache_mount().as_str(),
            session.dir_name().as_str(),
            file,
        ])
    }
}
