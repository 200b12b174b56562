//! Session ids, per-session directories and the CSV session log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use rand::RngCore;
use serde::Serialize;

use broadsheet_core::analytics::ProgressSink;

pub const STATUS_INSIGHTS_ACQUIRED: &str = "SEO Insights acquired";
pub const STATUS_BROADSHEET_GENERATED: &str = "Broadsheet generated";
pub const STATUS_BROADSHEET_FAILED: &str = "Broadsheet generation failed";

const TOKEN_BYTES: usize = 8;

/// Mints `<counter>-<token>` ids. The counter starts at 1 for each process.
#[derive(Debug, Default)]
pub struct SessionIds {
    counter: AtomicU64,
}

impl SessionIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let mut buf = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut buf);
        format!("{n}-{}", URL_SAFE_NO_PAD.encode(buf))
    }
}

/// One submission.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub started_at: NaiveDateTime,
    pub organisation: String,
    pub project: String,
}

impl Session {
    pub fn new(id: String, started_at: NaiveDateTime, organisation: &str, project: &str) -> Self {
        Self {
            id,
            started_at,
            organisation: organisation.trim().to_string(),
            project: project.trim().to_string(),
        }
    }

    /// Name of the bundle directory under the cache root.
    pub fn dir_name(&self) -> String {
        format!("{}{}", self.id, sanitise(&self.organisation))
    }
}

/// Make `raw` safe as part of a single path component.
pub fn sanitise(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    mapped.trim_start_matches('.').to_string()
}

#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    #[serde(rename = "SessionID")]
    session_id: &'a str,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Organisation")]
    organisation: &'a str,
    #[serde(rename = "Project")]
    project: &'a str,
    #[serde(rename = "AnalyticsID")]
    analytics_id: &'a str,
    #[serde(rename = "Status")]
    status: &'a str,
}

/// Append-only CSV log shared by every session.
///
/// The header is written when the file is empty. Each record is encoded
/// into one buffer and appended with a single write under the lock.
#[derive(Debug)]
pub struct SessionLog {
    path: PathBuf,
    timezone: Tz,
    lock: Mutex<()>,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>, timezone: Tz) -> Self {
        Self {
            path: path.into(),
            timezone,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(
        &self,
        session: &Session,
        analytics_id: &str,
        status: &str,
    ) -> anyhow::Result<()> {
        let record = LogRecord {
            session_id: &session.id,
            date: chrono::Utc::now()
                .with_timezone(&self.timezone)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            organisation: &session.organisation,
            project: &session.project,
            analytics_id: if analytics_id.is_empty() { "-" } else { analytics_id },
            status,
        };

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(Vec::with_capacity(128));
        wtr.serialize(&record)?;
        let buf = wtr.into_inner().map_err(|e| e.into_error())?;
        file.write_all(&buf)?;
        Ok(())
    }
}

/// Writes collector milestones as rows of one session.
/// Appends run on the blocking pool.
pub struct LogSink {
    log: Arc<SessionLog>,
    session: Session,
}

impl LogSink {
    pub fn new(log: Arc<SessionLog>, session: Session) -> Self {
        Self { log, session }
    }
}

#[async_trait]
impl ProgressSink for LogSink {
    async fn progress(&self, analytics_id: &str, status: &str) {
        let log = Arc::clone(&self.log);
        let session = self.session.clone();
        let analytics_id = analytics_id.to_string();
        let status = status.to_string();
        let appended =
            tokio::task::spawn_blocking(move || log.append(&session, &analytics_id, &status))
                .await
                .map_err(|e| anyhow::anyhow!("log task failed: {e}"))
                .and_then(|r| r);
        if let Err(e) = appended {
            tracing::error!(
                session = %self.session.id,
                path = %self.log.path().display(),
                error = %e,
                "Failed to append session log record"
            );
        }
    }
}
