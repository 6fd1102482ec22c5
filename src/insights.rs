//! Insights tab — history aggregation over every check-in and assessment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DailyCheckIn, EpdsAssessment, Valence};
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValenceBreakdown {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl ValenceBreakdown {
    pub fn total(&self) -> u32 {
        self.positive + self.negative + self.neutral
    }

    /// Share of positive check-ins in `[0.0, 1.0]`, `None` with no data.
    pub fn positive_ratio(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(f64::from(self.positive) / f64::from(total)),
        }
    }

    fn record(&mut self, valence: Valence) {
        match valence {
            Valence::Positive => self.positive += 1,
            Valence::Negative => self.negative += 1,
            Valence::Neutral => self.neutral += 1,
        }
    }
}

/// One check-in on the mood timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodPoint {
    pub created_at: DateTime<Utc>,
    pub emotion: Option<String>,
    pub valence: Valence,
    pub mood_value: Option<f64>,
    pub energy_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub created_at: DateTime<Utc>,
    pub total_score: u32,
}

/// Oldest first in both series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub valence: ValenceBreakdown,
    pub mood_timeline: Vec<MoodPoint>,
    pub epds_history: Vec<ScorePoint>,
}

impl InsightsSummary {
    pub fn latest_epds_score(&self) -> Option<u32> {
        self.epds_history.last().map(|p| p.total_score)
    }
}

/// Builds the summary from full histories. Input order does not matter.
pub fn summarize(check_ins: &[DailyCheckIn], assessments: &[EpdsAssessment]) -> InsightsSummary {
    let mut summary = InsightsSummary::default();

    for check_in in check_ins {
        let valence = check_in.valence();
        summary.valence.record(valence);
        summary.mood_timeline.push(MoodPoint {
            created_at: check_in.created_at,
            emotion: check_in.selected_emotion.clone(),
            valence,
            mood_value: check_in.mood_value,
            energy_value: check_in.energy_value,
        });
    }
    summary.mood_timeline.sort_by_key(|p| p.created_at);

    summary.epds_history = assessments
        .iter()
        .map(|a| ScorePoint {
            created_at: a.created_at,
            total_score: a.total_score,
        })
        .collect();
    summary.epds_history.sort_by_key(|p| p.created_at);

    summary
}

/// Fetches both histories for `owner_id` and summarizes them.
pub async fn load_insights<S: RecordStore>(
    store: &S,
    owner_id: &str,
) -> Result<InsightsSummary, StoreError> {
    let check_ins = store.fetch_all_check_ins(owner_id).await.map_err(|e| {
        tracing::error!("Error fetching check-in history: {e}");
        e
    })?;
    let assessments = store.fetch_all_questionnaires(owner_id).await.map_err(|e| {
        tracing::error!("Error fetching EPDS history: {e}");
        e
    })?;
    tracing::debug!(
        check_ins = check_ins.len(),
        assessments = assessments.len(),
        "Insights loaded"
    );
    Ok(summarize(&check_ins, &assessments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteRecordStore;
    use chrono::Duration;

    fn check_in(emotion: Option<&str>, days_ago: i64) -> DailyCheckIn {
        let mut record = DailyCheckIn::new(Utc::now() - Duration::days(days_ago));
        record.selected_emotion = emotion.map(String::from);
        record
    }

    #[test]
    fn empty_history() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.valence.total(), 0);
        assert!(summary.valence.positive_ratio().is_none());
        assert!(summary.latest_epds_score().is_none());
    }

    #[test]
    fn valence_counts_and_ratio() {
        let check_ins = vec![
            check_in(Some("Happy"), 3),
            check_in(Some("Hopeful"), 2),
            check_in(Some("Lonely"), 1),
            check_in(None, 0),
        ];
        let summary = summarize(&check_ins, &[]);
        assert_eq!(
            summary.valence,
            ValenceBreakdown {
                positive: 2,
                negative: 1,
                neutral: 1
            }
        );
        assert_eq!(summary.valence.positive_ratio(), Some(0.5));
    }

    #[test]
    fn series_are_sorted_oldest_first() {
        let check_ins = vec![check_in(Some("Calm"), 0), check_in(Some("Sad"), 5)];
        let mut older = EpdsAssessment::new(Utc::now() - Duration::days(14));
        older.total_score = 14;
        let mut newer = EpdsAssessment::new(Utc::now());
        newer.total_score = 9;

        let summary = summarize(&check_ins, &[newer, older]);
        assert_eq!(summary.mood_timeline[0].emotion.as_deref(), Some("Sad"));
        assert_eq!(
            summary.epds_history.iter().map(|p| p.total_score).collect::<Vec<_>>(),
            vec![14, 9]
        );
        assert_eq!(summary.latest_epds_score(), Some(9));
    }

    #[tokio::test]
    async fn loads_only_owner_history() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        store.save_check_in("user-1", &check_in(Some("Happy"), 1)).await.unwrap();
        store.save_check_in("user-2", &check_in(Some("Sad"), 1)).await.unwrap();

        let summary = load_insights(&store, "user-1").await.unwrap();
        assert_eq!(summary.valence.positive, 1);
        assert_eq!(summary.valence.total(), 1);
    }
}
