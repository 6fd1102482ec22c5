//! Home dashboard — cached latest records, the daily affirmation and the
//! navigation intents raised from the two cards.
//!
//! The dashboard is a signal subscriber: completion signals trigger a
//! re-fetch of the matching record, the navigate-home signal clears every
//! pending intent. Fetch failures are logged and the previous cache is kept.

use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::eligibility::{self, EligibilitySnapshot};
use crate::models::{DailyCheckIn, EpdsAssessment};
use crate::signals::{Signal, SignalReceiver};
use crate::store::RecordStore;

pub const DEFAULT_AFFIRMATION: &str = "I release guilt about not being with my child every moment. I provide for and nurture my child in my own unique way.";

/// Fallback affirmation for a check-in saved without one.
pub fn affirmation_for_mood(mood: &str) -> &'static str {
    match mood.to_lowercase().as_str() {
        "happy" | "joyful" | "elated" => {
            "I embrace the joy I feel today and let it guide my actions."
        }
        "sad" | "down" | "depressed" => "It’s okay to feel this way. I am gentle with myself.",
        "anxious" | "worried" => "I release tension with every breath. I am safe in this moment.",
        "angry" | "frustrated" => "I acknowledge my feelings and choose peace moving forward.",
        "tired" | "exhausted" => "Rest is a gift I deserve. I allow myself to recharge.",
        "calm" | "peaceful" => "I am present, balanced, and grounded.",
        "grateful" | "thankful" => "I appreciate the beauty and blessings in my life.",
        _ => "I am strong, resilient, and capable of handling what comes my way.",
    }
}

/// Pending navigation requested from the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntents {
    pub mood_check: bool,
    pub epds_introduction: bool,
    pub direct_epds: bool,
}

/// Everything needed to render the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeData {
    pub eligibility: EligibilitySnapshot,
    pub affirmation: String,
    pub intents: NavigationIntents,
}

pub struct Dashboard<S: RecordStore> {
    store: Arc<S>,
    owner_id: Option<String>,
    signals: SignalReceiver,
    latest_assessment: Option<EpdsAssessment>,
    latest_check_in: Option<DailyCheckIn>,
    affirmation: String,
    intents: NavigationIntents,
}

impl<S: RecordStore> Dashboard<S> {
    /// Empty dashboard. Call `refresh_all` to load the cache.
    pub fn new(store: Arc<S>, owner_id: Option<String>, signals: SignalReceiver) -> Self {
        Self {
            store,
            owner_id,
            signals,
            latest_assessment: None,
            latest_check_in: None,
            affirmation: DEFAULT_AFFIRMATION.to_string(),
            intents: NavigationIntents::default(),
        }
    }

    pub fn latest_assessment(&self) -> Option<&EpdsAssessment> {
        self.latest_assessment.as_ref()
    }

    pub fn latest_check_in(&self) -> Option<&DailyCheckIn> {
        self.latest_check_in.as_ref()
    }

    pub fn affirmation(&self) -> &str {
        &self.affirmation
    }

    pub fn intents(&self) -> NavigationIntents {
        self.intents
    }

    /// Card states and affirmation at `now`.
    pub fn home_data<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> HomeData {
        HomeData {
            eligibility: eligibility::snapshot(
                self.latest_assessment.as_ref(),
                self.latest_check_in.as_ref(),
                now,
            ),
            affirmation: self.affirmation.clone(),
            intents: self.intents,
        }
    }

    // ───────────────────────────────────────
    // Fetching
    // ───────────────────────────────────────

    async fn fetch_latest_check_in(&mut self) {
        let Some(owner_id) = self.owner_id.as_deref() else {
            return;
        };
        match self.store.fetch_latest_check_in(owner_id).await {
            Ok(latest) => {
                if let Some(text) = latest.as_ref().and_then(|c| c.affirmation.clone()) {
                    self.affirmation = text;
                }
                self.latest_check_in = latest;
                tracing::debug!("Fetched latest check-in");
            }
            Err(e) => tracing::error!("Error fetching latest check-in: {e}"),
        }
    }

    async fn fetch_latest_assessment(&mut self) {
        let Some(owner_id) = self.owner_id.as_deref() else {
            return;
        };
        match self.store.fetch_latest_questionnaire(owner_id).await {
            Ok(latest) => {
                tracing::debug!(
                    total_score = latest.as_ref().map(|a| a.total_score),
                    "Fetched latest EPDS assessment"
                );
                self.latest_assessment = latest;
            }
            Err(e) => tracing::error!("Error fetching latest EPDS assessment: {e}"),
        }
    }

    /// Full reload (on appear, pull-to-refresh). A check-in from an earlier
    /// day is dropped from the cache and the affirmation goes back to default.
    pub async fn refresh_all<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        self.fetch_latest_check_in().await;
        self.fetch_latest_assessment().await;

        if !eligibility::has_checked_in_today(self.latest_check_in.as_ref(), now) {
            self.latest_check_in = None;
            self.affirmation = DEFAULT_AFFIRMATION.to_string();
        }
    }

    /// Reload after a check-in: the saved affirmation, or one derived from the mood.
    pub async fn refresh_after_mood_check_in(&mut self) {
        self.fetch_latest_check_in().await;
        if let Some(check_in) = &self.latest_check_in {
            match (&check_in.affirmation, check_in.mood_name()) {
                (Some(text), _) => self.affirmation = text.clone(),
                (None, Some(mood)) => self.affirmation = affirmation_for_mood(mood).to_string(),
                (None, None) => {}
            }
        }
    }

    pub async fn refresh_after_epds(&mut self) {
        self.fetch_latest_assessment().await;
    }

    /// Handles every signal received since the last call, in order.
    /// Returns the signals handled.
    pub async fn process_signals(&mut self) -> Vec<Signal> {
        let signals = self.signals.drain();
        for signal in &signals {
            match signal {
                Signal::MoodCheckInCompleted => self.refresh_after_mood_check_in().await,
                Signal::EpdsAssessmentCompleted => self.refresh_after_epds().await,
                Signal::NavigateHome => {
                    self.reset_navigation();
                    tracing::debug!("Dashboard navigation intents reset");
                }
            }
        }
        signals
    }

    // ───────────────────────────────────────
    // Navigation intents
    // ───────────────────────────────────────

    pub fn navigate_to_mood_check(&mut self) {
        self.intents.mood_check = true;
    }

    /// Routes to the introduction when it is enabled, otherwise straight to
    /// the first question.
    pub fn navigate_to_epds(&mut self, show_introduction: bool) {
        if show_introduction {
            self.intents.epds_introduction = true;
        } else {
            self.intents.direct_epds = true;
        }
    }

    pub fn reset_navigation(&mut self) {
        self.intents = NavigationIntents::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::{EpdsCard, MoodCard};
    use crate::signals::SignalBus;
    use crate::store::{SqliteRecordStore, StoreError};
    use chrono::{Duration, FixedOffset, Utc};
    use uuid::Uuid;

    fn setup() -> (Arc<SqliteRecordStore>, SignalBus, Dashboard<SqliteRecordStore>) {
        let store = Arc::new(SqliteRecordStore::open_in_memory().unwrap());
        let bus = SignalBus::new();
        let dashboard = Dashboard::new(store.clone(), Some("user-1".into()), bus.subscribe());
        (store, bus, dashboard)
    }

    fn check_in(at: DateTime<Utc>, emotion: &str, affirmation: Option<&str>) -> DailyCheckIn {
        let mut record = DailyCheckIn::new(at);
        record.selected_emotion = Some(emotion.into());
        record.affirmation = affirmation.map(String::from);
        record
    }

    #[test]
    fn mood_fallbacks() {
        assert_eq!(
            affirmation_for_mood("Joyful"),
            "I embrace the joy I feel today and let it guide my actions."
        );
        assert_eq!(affirmation_for_mood("CALM"), "I am present, balanced, and grounded.");
        assert_eq!(
            affirmation_for_mood("Curious"),
            "I am strong, resilient, and capable of handling what comes my way."
        );
    }

    #[tokio::test]
    async fn empty_store_shows_prompts_and_default_affirmation() {
        let (_, _, mut dashboard) = setup();
        let now = Utc::now();
        dashboard.refresh_all(&now).await;

        let home = dashboard.home_data(&now);
        assert_eq!(home.eligibility.epds, EpdsCard::StartAssessment);
        assert_eq!(home.eligibility.mood, MoodCard::CheckIn);
        assert_eq!(home.affirmation, DEFAULT_AFFIRMATION);
    }

    #[tokio::test]
    async fn todays_check_in_sets_saved_affirmation() {
        let (store, _, mut dashboard) = setup();
        let now = Utc::now();
        store
            .save_check_in("user-1", &check_in(now, "Happy", Some("My Love is my greatest quality as a mother.")))
            .await
            .unwrap();

        dashboard.refresh_all(&now).await;
        assert_eq!(dashboard.affirmation(), "My Love is my greatest quality as a mother.");
        assert!(dashboard.latest_check_in().is_some());
    }

    #[tokio::test]
    async fn yesterdays_check_in_resets_to_default() {
        let (store, _, mut dashboard) = setup();
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 3, 10, 0, 1, 0).unwrap();
        let yesterday = tz.with_ymd_and_hms(2025, 3, 9, 23, 59, 0).unwrap().with_timezone(&Utc);
        store
            .save_check_in("user-1", &check_in(yesterday, "Sad", Some("My Kindness is my greatest quality as a mother.")))
            .await
            .unwrap();

        dashboard.refresh_all(&now).await;
        assert!(dashboard.latest_check_in().is_none());
        assert_eq!(dashboard.affirmation(), DEFAULT_AFFIRMATION);
        assert_eq!(dashboard.home_data(&now).eligibility.mood, MoodCard::CheckIn);
    }

    #[tokio::test]
    async fn check_in_signal_refreshes_with_mood_fallback() {
        let (store, bus, mut dashboard) = setup();
        store
            .save_check_in("user-1", &check_in(Utc::now(), "Anxious", None))
            .await
            .unwrap();

        bus.broadcast(Signal::MoodCheckInCompleted);
        assert_eq!(dashboard.process_signals().await, vec![Signal::MoodCheckInCompleted]);
        assert_eq!(
            dashboard.affirmation(),
            "I release tension with every breath. I am safe in this moment."
        );
    }

    #[tokio::test]
    async fn epds_signal_refreshes_score_card() {
        let (store, bus, mut dashboard) = setup();
        let now = Utc::now();
        let mut assessment = EpdsAssessment::new(now - Duration::days(2));
        assessment.total_score = 12;
        store.save_questionnaire("user-1", &assessment).await.unwrap();

        bus.broadcast(Signal::EpdsAssessmentCompleted);
        dashboard.process_signals().await;
        assert_eq!(
            dashboard.home_data(&now).eligibility.epds,
            EpdsCard::Score { total_score: 12 }
        );
    }

    #[tokio::test]
    async fn navigate_home_clears_intents() {
        let (_, bus, mut dashboard) = setup();
        dashboard.navigate_to_mood_check();
        dashboard.navigate_to_epds(true);
        assert!(dashboard.intents().mood_check);
        assert!(dashboard.intents().epds_introduction);
        assert!(!dashboard.intents().direct_epds);

        bus.broadcast(Signal::NavigateHome);
        dashboard.process_signals().await;
        assert_eq!(dashboard.intents(), NavigationIntents::default());
    }

    #[test]
    fn epds_without_introduction_goes_direct() {
        let (_, _, mut dashboard) = setup();
        dashboard.navigate_to_epds(false);
        assert!(dashboard.intents().direct_epds);
        assert!(!dashboard.intents().epds_introduction);
    }

    struct BrokenStore;

    impl RecordStore for BrokenStore {
        async fn save_questionnaire(&self, _: &str, _: &EpdsAssessment) -> Result<Uuid, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn fetch_latest_questionnaire(&self, _: &str) -> Result<Option<EpdsAssessment>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn save_check_in(&self, _: &str, _: &DailyCheckIn) -> Result<Uuid, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn fetch_latest_check_in(&self, _: &str) -> Result<Option<DailyCheckIn>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn fetch_all_check_ins(&self, _: &str) -> Result<Vec<DailyCheckIn>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn fetch_all_questionnaires(&self, _: &str) -> Result<Vec<EpdsAssessment>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_cache() {
        let bus = SignalBus::new();
        let mut dashboard = Dashboard::new(Arc::new(BrokenStore), Some("u".into()), bus.subscribe());
        let mut cached = EpdsAssessment::new(Utc::now());
        cached.total_score = 5;
        dashboard.latest_assessment = Some(cached);

        dashboard.refresh_after_epds().await;
        assert_eq!(dashboard.latest_assessment().map(|a| a.total_score), Some(5));
    }

    #[tokio::test]
    async fn signed_out_dashboard_does_not_fetch() {
        let store = Arc::new(SqliteRecordStore::open_in_memory().unwrap());
        store
            .save_check_in("user-1", &check_in(Utc::now(), "Happy", None))
            .await
            .unwrap();
        let bus = SignalBus::new();
        let mut dashboard = Dashboard::new(store, None, bus.subscribe());
        dashboard.refresh_after_mood_check_in().await;
        assert!(dashboard.latest_check_in().is_none());
    }
}
