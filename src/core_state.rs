//! Application state shared by every screen.
//!
//! `CoreState` owns the signed-in session, the record store and the signal
//! bus, and hands out flows, the dashboard and the tab navigator wired to
//! them. Wrapped in `Arc` at startup.

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config;
use crate::dashboard::Dashboard;
use crate::flow::{CheckInFlow, QuestionnaireFlow};
use crate::insights::{self, InsightsSummary};
use crate::navigation::TabNavigator;
use crate::signals::{Signal, SignalBus};
use crate::store::{SqliteRecordStore, StoreError};

/// The signed-in user. Authentication itself happens elsewhere; only the
/// resulting id is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: String,
    pub signed_in_at: DateTime<Utc>,
}

pub struct CoreState {
    session: RwLock<Option<UserSession>>,
    store: Arc<SqliteRecordStore>,
    signals: SignalBus,
}

impl CoreState {
    /// Opens (or creates) the record database at `path`.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let store = SqliteRecordStore::open(path)?;
        Ok(Self::with_store(store))
    }

    /// Opens the database at the default location under the app data dir.
    pub fn open_default() -> Result<Self, CoreError> {
        let dir = config::app_data_dir();
        std::fs::create_dir_all(&dir)?;
        Self::open(&config::database_path())
    }

    pub fn in_memory() -> Result<Self, CoreError> {
        Ok(Self::with_store(SqliteRecordStore::open_in_memory()?))
    }

    fn with_store(store: SqliteRecordStore) -> Self {
        Self {
            session: RwLock::new(None),
            store: Arc::new(store),
            signals: SignalBus::new(),
        }
    }

    pub fn store(&self) -> Arc<SqliteRecordStore> {
        self.store.clone()
    }

    pub fn signals(&self) -> &SignalBus {
        &self.signals
    }

    // ── Session ─────────────────────────────────────────────

    pub fn read_session(&self) -> Result<RwLockReadGuard<'_, Option<UserSession>>, CoreError> {
        self.session.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn sign_in(&self, user_id: &str, now: DateTime<Utc>) -> Result<(), CoreError> {
        let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
        *guard = Some(UserSession {
            user_id: user_id.to_string(),
            signed_in_at: now,
        });
        tracing::info!(user_id, "User signed in");
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), CoreError> {
        let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
        *guard = None;
        tracing::info!("User signed out");
        Ok(())
    }

    /// Current user id, if anyone is signed in.
    pub fn current_user_id(&self) -> Result<Option<String>, CoreError> {
        Ok(self.read_session()?.as_ref().map(|s| s.user_id.clone()))
    }

    pub fn require_user_id(&self) -> Result<String, CoreError> {
        self.current_user_id()?.ok_or(CoreError::NoActiveSession)
    }

    // ── Preferences ─────────────────────────────────────────

    pub fn show_epds_introduction(&self) -> Result<bool, CoreError> {
        Ok(self.store.show_epds_introduction()?)
    }

    pub fn set_show_epds_introduction(&self, show: bool) -> Result<(), CoreError> {
        Ok(self.store.set_show_epds_introduction(show)?)
    }

    // ── Factories ───────────────────────────────────────────

    /// A new EPDS run for the current user. Starts on the introduction when
    /// the preference says so.
    ///
    /// A missing user is not an error here; the flow reports it at finalize.
    pub fn start_questionnaire(
        &self,
        now: DateTime<Utc>,
    ) -> Result<QuestionnaireFlow<SqliteRecordStore>, CoreError> {
        let show_introduction = self.show_epds_introduction()?;
        Ok(QuestionnaireFlow::new(
            self.store(),
            self.current_user_id()?,
            now,
            show_introduction,
        ))
    }

    pub fn start_check_in(
        &self,
        now: DateTime<Utc>,
    ) -> Result<CheckInFlow<SqliteRecordStore>, CoreError> {
        Ok(CheckInFlow::new(self.store(), self.current_user_id()?, now))
    }

    /// A dashboard subscribed from now on. Call `refresh_all` before display.
    pub fn dashboard(&self) -> Result<Dashboard<SqliteRecordStore>, CoreError> {
        Ok(Dashboard::new(
            self.store(),
            self.current_user_id()?,
            self.signals.subscribe(),
        ))
    }

    pub fn tab_navigator(&self) -> TabNavigator {
        TabNavigator::new(self.signals.subscribe())
    }

    pub async fn insights(&self) -> Result<InsightsSummary, CoreError> {
        let user_id = self.require_user_id()?;
        Ok(insights::load_insights(self.store.as_ref(), &user_id).await?)
    }

    /// Inbound "force navigate home": resets every subscriber to the home tab.
    pub fn navigate_home(&self) -> usize {
        self.signals.broadcast(Signal::NavigateHome)
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No signed-in user")]
    NoActiveSession,
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
    #[error("Cannot prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::{EpdsCard, MoodCard};
    use crate::flow::{CheckInStepId, QuestionnaireStepId};
    use crate::models::Tab;

    fn signed_in() -> CoreState {
        let core = CoreState::in_memory().unwrap();
        core.sign_in("user-1", Utc::now()).unwrap();
        core
    }

    #[test]
    fn session_lifecycle() {
        let core = CoreState::in_memory().unwrap();
        assert!(matches!(core.require_user_id(), Err(CoreError::NoActiveSession)));
        core.sign_in("user-1", Utc::now()).unwrap();
        assert_eq!(core.current_user_id().unwrap().as_deref(), Some("user-1"));
        core.sign_out().unwrap();
        assert!(core.current_user_id().unwrap().is_none());
    }

    #[test]
    fn questionnaire_starts_on_introduction_by_default() {
        let core = signed_in();
        let flow = core.start_questionnaire(Utc::now()).unwrap();
        assert_eq!(flow.step_id(), QuestionnaireStepId::Introduction);

        core.set_show_epds_introduction(false).unwrap();
        let flow = core.start_questionnaire(Utc::now()).unwrap();
        assert_eq!(flow.step_id(), QuestionnaireStepId::Question(0));
    }

    #[test]
    fn navigate_home_reaches_navigator() {
        let core = signed_in();
        let mut nav = core.tab_navigator();
        nav.select(Tab::Learn);
        assert_eq!(core.navigate_home(), 1);
        assert!(nav.process_signals());
        assert_eq!(nav.selected(), Tab::Home);
    }

    #[tokio::test]
    async fn check_in_end_to_end_updates_dashboard_and_tabs() {
        let core = signed_in();
        let now = Utc::now();
        let mut dashboard = core.dashboard().unwrap();
        let mut nav = core.tab_navigator();
        nav.select(Tab::Tools);
        dashboard.refresh_all(&now).await;
        assert_eq!(dashboard.home_data(&now).eligibility.mood, MoodCard::CheckIn);

        let mut flow = core.start_check_in(now).unwrap();
        flow.advance().unwrap();
        flow.advance().unwrap();
        flow.select_emotion("Calm").unwrap();
        flow.advance().unwrap();
        flow.advance().unwrap();
        assert_eq!(flow.step_id(), CheckInStepId::Affirmation);
        flow.select_affirmation_word("Empathy").unwrap();
        flow.finalize().await.unwrap();
        flow.exit_completion(core.signals()).unwrap();

        dashboard.process_signals().await;
        nav.process_signals();

        let home = dashboard.home_data(&now);
        assert!(matches!(home.eligibility.mood, MoodCard::CheckedIn { ref label, .. } if label == "Calm"));
        assert_eq!(home.affirmation, "My Empathy is my greatest quality as a mother.");
        assert_eq!(nav.selected(), Tab::Home);
    }

    #[tokio::test]
    async fn epds_end_to_end_shows_score() {
        let core = signed_in();
        core.set_show_epds_introduction(false).unwrap();
        let now = Utc::now();
        let mut dashboard = core.dashboard().unwrap();

        let mut flow = core.start_questionnaire(now).unwrap();
        for score in [0, 1, 2, 3, 0, 1, 2, 3, 1, 2] {
            flow.select_answer(score).unwrap();
            flow.advance().unwrap();
        }
        flow.finalize().await.unwrap();
        flow.exit_results(core.signals()).unwrap();

        dashboard.process_signals().await;
        assert_eq!(
            dashboard.home_data(&now).eligibility.epds,
            EpdsCard::Score { total_score: 15 }
        );

        let summary = core.insights().await.unwrap();
        assert_eq!(summary.latest_epds_score(), Some(15));
    }

    #[test]
    fn database_failure_surfaces_as_store_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        let result = CoreState::open(dir.path());
        assert!(matches!(result, Err(CoreError::Store(StoreError::Database(_)))));
    }

    #[tokio::test]
    async fn insights_require_session() {
        let core = CoreState::in_memory().unwrap();
        assert!(matches!(core.insights().await, Err(CoreError::NoActiveSession)));
    }
}
