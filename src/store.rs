//! Record store — the persistence collaborator behind both flows.
//!
//! `RecordStore` is the seam: flows, the dashboard and insights only see these
//! async operations keyed by owner id. `SqliteRecordStore` is the bundled
//! implementation on top of the `db` repository functions.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::db::{self, DatabaseError};
use crate::models::{DailyCheckIn, EpdsAssessment};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only, owner-scoped storage for finalized records.
///
/// Saves always create a new record and return its id; fetches return the
/// record with the latest creation timestamp, or `None`.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    async fn save_questionnaire(
        &self,
        owner_id: &str,
        record: &EpdsAssessment,
    ) -> Result<Uuid, StoreError>;

    async fn fetch_latest_questionnaire(
        &self,
        owner_id: &str,
    ) -> Result<Option<EpdsAssessment>, StoreError>;

    async fn save_check_in(&self, owner_id: &str, record: &DailyCheckIn)
        -> Result<Uuid, StoreError>;

    async fn fetch_latest_check_in(&self, owner_id: &str)
        -> Result<Option<DailyCheckIn>, StoreError>;

    /// Full check-in history, oldest first.
    async fn fetch_all_check_ins(&self, owner_id: &str) -> Result<Vec<DailyCheckIn>, StoreError>;

    /// Full assessment history, oldest first.
    async fn fetch_all_questionnaires(
        &self,
        owner_id: &str,
    ) -> Result<Vec<EpdsAssessment>, StoreError>;
}

/// SQLite-backed store. The connection is guarded by a mutex; every
/// operation is a single short statement, so no await happens under the lock.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Record store opened");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-memory store (for testing and previews).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = db::open_memory_database()?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Whether the EPDS introduction is shown before question 1 (default: yes).
    pub fn show_epds_introduction(&self) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        Ok(db::get_bool_preference(&conn, config::PREF_SHOW_EPDS_INTRODUCTION, true)?)
    }

    pub fn set_show_epds_introduction(&self, show: bool) -> Result<(), StoreError> {
        let conn = self.lock()?;
        db::set_bool_preference(&conn, config::PREF_SHOW_EPDS_INTRODUCTION, show)?;
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore {
    async fn save_questionnaire(
        &self,
        owner_id: &str,
        record: &EpdsAssessment,
    ) -> Result<Uuid, StoreError> {
        let conn = self.lock()?;
        Ok(db::insert_assessment(&conn, owner_id, record)?)
    }

    async fn fetch_latest_questionnaire(
        &self,
        owner_id: &str,
    ) -> Result<Option<EpdsAssessment>, StoreError> {
        let conn = self.lock()?;
        Ok(db::get_latest_assessment(&conn, owner_id)?)
    }

    async fn save_check_in(
        &self,
        owner_id: &str,
        record: &DailyCheckIn,
    ) -> Result<Uuid, StoreError> {
        let conn = self.lock()?;
        Ok(db::insert_checkin(&conn, owner_id, record)?)
    }

    async fn fetch_latest_check_in(
        &self,
        owner_id: &str,
    ) -> Result<Option<DailyCheckIn>, StoreError> {
        let conn = self.lock()?;
        Ok(db::get_latest_checkin(&conn, owner_id)?)
    }

    async fn fetch_all_check_ins(&self, owner_id: &str) -> Result<Vec<DailyCheckIn>, StoreError> {
        let conn = self.lock()?;
        Ok(db::list_checkins(&conn, owner_id)?)
    }

    async fn fetch_all_questionnaires(
        &self,
        owner_id: &str,
    ) -> Result<Vec<EpdsAssessment>, StoreError> {
        let conn = self.lock()?;
        Ok(db::list_assessments(&conn, owner_id)?)
    }
}
