use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Valence;
use crate::emotion;

/// A daily mood check-in, either in progress (draft) or persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCheckIn {
    pub id: Option<Uuid>,
    /// Slider position in `[0.0, 1.0]`.
    pub mood_value: Option<f64>,
    /// Slider position in `[0.0, 1.0]`.
    pub energy_value: Option<f64>,
    pub selected_emotion: Option<String>,
    pub journal_text: Option<String>,
    pub factors: BTreeSet<String>,
    /// Composed on the affirmation step only.
    pub affirmation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DailyCheckIn {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            mood_value: None,
            energy_value: None,
            selected_emotion: None,
            journal_text: None,
            factors: BTreeSet::new(),
            affirmation: None,
            created_at,
        }
    }

    /// Display name of the mood, which is the selected emotion label.
    pub fn mood_name(&self) -> Option<&str> {
        self.selected_emotion.as_deref()
    }

    pub fn valence(&self) -> Valence {
        self.selected_emotion
            .as_deref()
            .map(emotion::valence_of)
            .unwrap_or(Valence::Neutral)
    }
}
