use crate::core::db;
use crate::core::error::KbError;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Serializes database access from the CLI and records one audit event per
/// operation.
pub struct DbBroker {
    audit_log_path: Option<PathBuf>,
    actor: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub db_id: String,
    pub table: String,
    pub rows: usize,
    pub status: String,
}

/// Row count reported in the audit event for a successful operation.
pub trait Affected {
    fn affected(&self) -> usize;
}

impl Affected for () {
    fn affected(&self) -> usize {
        0
    }
}

impl Affected for usize {
    fn affected(&self) -> usize {
        *self
    }
}

impl<T> Affected for Vec<T> {
    fn affected(&self) -> usize {
        self.len()
    }
}

impl DbBroker {
    /// `audit_log_path = None` disables the audit log.
    pub fn new(audit_log_path: Option<PathBuf>, actor: impl Into<String>) -> Self {
        Self {
            audit_log_path,
            actor: actor.into(),
        }
    }

    pub fn audit_log_path(&self) -> Option<&Path> {
        self.audit_log_path.as_deref()
    }

    /// Execute a closure with a serialized connection to the specified DB.
    pub fn with_conn<F, R>(&self, db_path: &Path, op: &str, table: &str, f: F) -> Result<R, KbError>
    where
        F: FnOnce(&Connection) -> Result<R, KbError>,
        R: Affected,
    {
        static DB_LOCK: Mutex<()> = Mutex::new(());
        let _lock = DB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let db_id = db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let conn = db::db_connect(&db_path.to_string_lossy())?;

        let result = f(&conn);

        let (status, rows) = match &result {
            Ok(value) => ("success", value.affected()),
            Err(_) => ("error", 0),
        };
        // The operation's own outcome wins over an audit failure.
        if let Err(audit_err) = self.log_event(op, &db_id, table, rows, status) {
            if result.is_ok() {
                eprintln!("warning: audit event for {} not recorded: {}", op, audit_err);
            }
        }

        result
    }

    fn log_event(
        &self,
        op: &str,
        db_id: &str,
        table: &str,
        rows: usize,
        status: &str,
    ) -> Result<(), KbError> {
        let Some(path) = &self.audit_log_path else {
            return Ok(());
        };

        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            actor: self.actor.clone(),
            op: op.to_string(),
            db_id: db_id.to_string(),
            table: table.to_string(),
            rows,
            status: status.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut f = OpenOptions::new().create(true).append(true).open(path)?;
        let line = serde_json::to_string(&ev)
            .map_err(|e| KbError::ConfigError(format!("cannot encode audit event: {}", e)))?;
        writeln!(f, "{}", line)?;
        Ok(())
    }
}

/// Reads back every event in an audit log.
pub fn read_events(path: &Path) -> Result<Vec<BrokerEvent>, KbError> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            serde_json::from_str(l)
                .map_err(|e| KbError::ParseError(format!("bad audit event: {}", e)))
        })
        .collect()
}
