//! # Event Log
//!
//! Append-only JSON-lines record of startup, cycle and shutdown events.
//!
//! The file is only ever appended to; nothing reads it back on restart.

use super::{StartupSummary, SweepNotifier};
use crate::domain::entities::SweepCycleResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Startup {
        at: DateTime<Utc>,
        #[serde(flatten)]
        summary: &'a StartupSummary,
    },
    Cycle(&'a SweepCycleResult),
    Shutdown {
        at: DateTime<Utc>,
    },
}

/// Appends one JSON object per line to a file.
#[derive(Debug)]
pub struct EventLogNotifier {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl EventLogNotifier {
    /// Creates a notifier writing to `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, event: &Event<'_>) {
        if let Err(err) = self.try_append(event).await {
            warn!(path = %self.path.display(), "failed to append event log entry: {}", err);
        }
    }

    async fn try_append(&self, event: &Event<'_>) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await
    }
}

#[async_trait]
impl SweepNotifier for EventLogNotifier {
    async fn notify_startup(&self, summary: &StartupSummary) {
        self.append(&Event::Startup {
            at: Utc::now(),
            summary,
        })
        .await;
    }

    async fn notify_shutdown(&self) {
        self.append(&Event::Shutdown { at: Utc::now() }).await;
    }

    async fn notify_cycle(&self, result: &SweepCycleResult) {
        self.append(&Event::Cycle(result)).await;
    }
}
