//! Application-root state shared by every command handler.
//!
//! `CoreState` owns the doctor directory, the appointment book, the session
//! and the notification slot. The book sits behind a single `RwLock`, so
//! concurrent readers are fine and every mutation (create, status change)
//! is serialised through one writer.

use std::collections::VecDeque;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use chrono::{Local, NaiveDate};

use crate::config::{self, AppConfig};
use crate::directory::{self, DoctorDirectory};
use crate::error::CareError;
use crate::identity::IdentityResolver;
use crate::lifecycle::{Actor, AppointmentBook};
use crate::models::User;
use crate::notify::{Notification, Notifier};
use crate::session::{FileStore, KeyValueStore, MemoryStore, SessionManager};

/// Maximum audit entries kept in memory; oldest are dropped first.
const AUDIT_CAPACITY: usize = 500;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    config: AppConfig,
    directory: DoctorDirectory,
    book: RwLock<AppointmentBook>,
    session: RwLock<SessionManager>,
    resolver: IdentityResolver,
    notifier: Mutex<Notifier>,
    audit: AuditLogger,
}

impl CoreState {
    /// Seeded demo state for `config`, with appointments placed around today.
    pub fn new(config: AppConfig) -> Self {
        let today = Local::now().date_naive();
        Self::with_seed(config, today)
    }

    /// Seeded demo state with appointments placed around `today`.
    pub fn with_seed(config: AppConfig, today: NaiveDate) -> Self {
        let book = AppointmentBook::from_records(directory::seed_appointments(today));
        Self::from_parts(config, DoctorDirectory::seeded(), book)
    }

    pub fn from_parts(
        config: AppConfig,
        directory: DoctorDirectory,
        book: AppointmentBook,
    ) -> Self {
        let store: Box<dyn KeyValueStore> = match &config.data_dir {
            Some(dir) => Box::new(FileStore::new(dir.join("session"))),
            None => Box::new(MemoryStore::new()),
        };
        tracing::debug!(
            doctors = directory.len(),
            appointments = book.len(),
            "Core state initialised"
        );
        Self {
            resolver: IdentityResolver::new(&config),
            notifier: Mutex::new(Notifier::new(config.notification_ttl)),
            session: RwLock::new(SessionManager::new(store)),
            book: RwLock::new(book),
            directory,
            audit: AuditLogger::new(),
            config,
        }
    }

    /// State for the console binary: environment config, file-backed
    /// session marker under the data dir.
    pub fn from_env() -> Self {
        let mut config = AppConfig::from_env();
        if config.data_dir.is_none() {
            config.data_dir = Some(config::app_data_dir());
        }
        Self::new(config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn directory(&self) -> &DoctorDirectory {
        &self.directory
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    // ── Appointment book ────────────────────────────────────

    pub fn read_book(&self) -> Result<RwLockReadGuard<'_, AppointmentBook>, CoreError> {
        self.book.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_book(&self) -> Result<RwLockWriteGuard<'_, AppointmentBook>, CoreError> {
        self.book.write().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Session ─────────────────────────────────────────────

    pub fn read_session(&self) -> Result<RwLockReadGuard<'_, SessionManager>, CoreError> {
        self.session.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_session(&self) -> Result<RwLockWriteGuard<'_, SessionManager>, CoreError> {
        self.session.write().map_err(|_| CoreError::LockPoisoned)
    }

    /// Owned copy of the logged-in user.
    pub fn current_user(&self) -> Result<User, CoreError> {
        let guard = self.read_session()?;
        guard.current().cloned().ok_or(CoreError::NoActiveSession)
    }

    /// Capability of the logged-in user.
    pub fn current_actor(&self) -> Result<Actor, CoreError> {
        self.current_user().map(|user| Actor::for_user(&user))
    }

    // ── Notifications ───────────────────────────────────────

    pub fn notify(&self, notification: Notification) {
        if let Ok(mut notifier) = self.notifier.lock() {
            notifier.raise(notification);
        }
    }

    /// The notification still visible at `now`, if any.
    pub fn visible_notification(&self, now: Instant) -> Option<Notification> {
        self.notifier
            .lock()
            .ok()
            .and_then(|mut notifier| notifier.current_at(now).cloned())
    }

    /// Take the visible notification so it is shown once.
    pub fn take_notification(&self) -> Option<Notification> {
        self.notifier
            .lock()
            .ok()
            .and_then(|mut notifier| notifier.take_at(Instant::now()))
    }

    pub fn dismiss_notification(&self) {
        if let Ok(mut notifier) = self.notifier.lock() {
            notifier.dismiss();
        }
    }

    // ── Audit ───────────────────────────────────────────────

    pub fn log_action(&self, actor: &Actor, action: &str, entity: &str) {
        self.audit.log(actor.label(), action, entity);
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.entries()
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No active session")]
    NoActiveSession,
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("{0}")]
    Care(#[from] CareError),
}

// ═══════════════════════════════════════════════════════════
// Audit logger
// ═══════════════════════════════════════════════════════════

/// In-memory record of state-changing commands.
pub struct AuditLogger {
    buffer: Mutex<VecDeque<AuditEntry>>,
}

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub actor: String,
    pub action: String,
    pub entity: String,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(AUDIT_CAPACITY)),
        }
    }

    pub fn log(&self, actor: String, action: &str, entity: &str) {
        if let Ok(mut buf) = self.buffer.lock() {
            if buf.len() == AUDIT_CAPACITY {
                buf.pop_front();
            }
            buf.push_back(AuditEntry {
                timestamp: chrono::Utc::now(),
                actor,
                action: action.to_string(),
                entity: entity.to_string(),
            });
        }
    }

    /// Snapshot, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|buf| buf.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
