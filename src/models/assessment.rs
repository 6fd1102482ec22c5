use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An EPDS questionnaire, either in progress (draft) or persisted.
///
/// `total_score` is only authoritative once the flow has been finalized;
/// it is recomputed from `answers`, never accumulated per answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpdsAssessment {
    /// Assigned by the record store on first persistence.
    pub id: Option<Uuid>,
    /// Question text -> selected score (0..=3).
    pub answers: BTreeMap<String, u8>,
    pub total_score: u32,
    pub additional_experiences: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl EpdsAssessment {
    /// Empty draft, stamped when the user starts the flow.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            answers: BTreeMap::new(),
            total_score: 0,
            additional_experiences: Vec::new(),
            created_at,
        }
    }
}
