//! EPDS questionnaire flow.
//!
//! Introduction (optional) → ten single-choice questions → checklist of
//! additional experiences → finalize (score, merge, persist) → results.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FlowError, StepController};
use crate::models::EpdsAssessment;
use crate::signals::{Signal, SignalBus};
use crate::store::RecordStore;

// ═══════════════════════════════════════════
// Question bank
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpdsOption {
    pub label: &'static str,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpdsQuestion {
    /// Also the key under which the answer is stored.
    pub text: &'static str,
    pub options: [EpdsOption; 4],
}

const fn opt(label: &'static str, score: u8) -> EpdsOption {
    EpdsOption { label, score }
}

pub const EPDS_QUESTIONS: [EpdsQuestion; 10] = [
    EpdsQuestion {
        text: "I have been able to laugh and see the funny side of things",
        options: [
            opt("As much as I always could", 0),
            opt("Not quite as much now", 1),
            opt("Definitely not as much now", 2),
            opt("Not at all", 3),
        ],
    },
    EpdsQuestion {
        text: "I have looked forward to things",
        options: [
            opt("As much as I ever did", 0),
            opt("Somewhat less than I used to", 1),
            opt("Definitely less than I used to", 2),
            opt("Hardly at all", 3),
        ],
    },
    EpdsQuestion {
        text: "I have blamed myself when things went wrong",
        options: [
            opt("Yes, most of the time", 3),
            opt("Yes, some of the time", 2),
            opt("Not very often", 1),
            opt("No, never", 0),
        ],
    },
    EpdsQuestion {
        text: "I have felt anxious or worried",
        options: [
            opt("Yes, very often", 3),
            opt("Yes, sometimes", 2),
            opt("Hardly ever", 1),
            opt("No, not at all", 0),
        ],
    },
    EpdsQuestion {
        text: "I have felt scared or panicky",
        options: [
            opt("Yes, quite a lot", 3),
            opt("Yes, sometimes", 2),
            opt("No, not much", 1),
            opt("No, not at all", 0),
        ],
    },
    EpdsQuestion {
        text: "I have felt overwhelmed",
        options: [
            opt("Yes, most of the time I haven't been able to cope at all", 3),
            opt("Yes, sometimes I haven't been coping as well as usual", 2),
            opt("No, most of the time I have coped quite well", 1),
            opt("No, I have been coping as well as ever", 0),
        ],
    },
    EpdsQuestion {
        text: "I have had difficulty sleeping even when I have the opportunity to sleep",
        options: [
            opt("Yes, most of the time", 3),
            opt("Yes, quite often", 2),
            opt("Not very often", 1),
            opt("No, not at all", 0),
        ],
    },
    EpdsQuestion {
        text: "I have felt sad or miserable",
        options: [
            opt("Yes, most of the time", 3),
            opt("Yes, sometimes", 2),
            opt("Not very often", 1),
            opt("No, not at all", 0),
        ],
    },
    EpdsQuestion {
        text: "I have felt so unhappy that I have been crying",
        options: [
            opt("Yes, most of the time", 3),
            opt("Yes, sometimes", 2),
            opt("Only occasionally", 1),
            opt("No, never", 0),
        ],
    },
    EpdsQuestion {
        text: "The thought of harming myself has occurred to me",
        options: [
            opt("Yes, quite often", 3),
            opt("Sometimes", 2),
            opt("Hardly ever", 1),
            opt("Never", 0),
        ],
    },
];

pub const CHECKLIST_ITEMS: [&str; 6] = [
    "Feeling restless or unable to sit still",
    "Having trouble concentrating or making decisions",
    "Feeling unusually tired or lacking energy",
    "Having changes in appetite or sleep patterns",
    "Feeling disconnected from your baby or partner",
    "Having thoughts of harming yourself or others",
];

pub fn is_question_key(key: &str) -> bool {
    EPDS_QUESTIONS.iter().any(|q| q.text == key)
}

/// Sum of the recorded scores for the fixed question set. Keys outside the
/// question bank are ignored.
pub fn compute_total_score(answers: &BTreeMap<String, u8>) -> u32 {
    answers
        .iter()
        .filter(|(key, _)| is_question_key(key))
        .map(|(_, score)| u32::from(*score))
        .sum()
}

// ═══════════════════════════════════════════
// Step controllers
// ═══════════════════════════════════════════

/// One question screen. Built once per question with the incoming draft.
#[derive(Debug, Clone)]
pub struct QuestionStep {
    index: usize,
    question: &'static EpdsQuestion,
    draft: EpdsAssessment,
    ready: bool,
}

impl QuestionStep {
    fn new(index: usize, draft: EpdsAssessment) -> Self {
        let question = &EPDS_QUESTIONS[index];
        // Revisiting an answered question keeps it answered.
        let ready = draft.answers.contains_key(question.text);
        Self { index, question, draft, ready }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn question(&self) -> &'static EpdsQuestion {
        self.question
    }

    pub fn current_answer(&self) -> Option<u8> {
        self.draft.answers.get(self.question.text).copied()
    }

    /// Writes `score` under this question's key, replacing any earlier answer.
    pub fn select_answer(&mut self, score: u8) -> Result<(), FlowError> {
        if !self.question.options.iter().any(|o| o.score == score) {
            return Err(FlowError::InvalidAnswer { score });
        }
        self.draft.answers.insert(self.question.text.to_string(), score);
        self.ready = true;
        Ok(())
    }
}

impl StepController for QuestionStep {
    type Draft = EpdsAssessment;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn draft(&self) -> &EpdsAssessment {
        &self.draft
    }

    fn into_draft(self) -> EpdsAssessment {
        self.draft
    }
}

/// Additional-experiences checklist. Any selection (including none) is valid.
#[derive(Debug, Clone)]
pub struct ChecklistStep {
    draft: EpdsAssessment,
    selected: Vec<&'static str>,
}

impl ChecklistStep {
    fn new(draft: EpdsAssessment) -> Self {
        let selected = CHECKLIST_ITEMS
            .iter()
            .copied()
            .filter(|item| draft.additional_experiences.iter().any(|e| e == item))
            .collect();
        Self { draft, selected }
    }

    pub fn items(&self) -> &'static [&'static str] {
        &CHECKLIST_ITEMS
    }

    pub fn is_selected(&self, item: &str) -> bool {
        self.selected.contains(&item)
    }

    /// Adds or removes an item. Returns false for text not on the checklist.
    pub fn toggle_experience(&mut self, item: &str) -> bool {
        let Some(known) = CHECKLIST_ITEMS.iter().copied().find(|i| *i == item) else {
            return false;
        };
        if let Some(pos) = self.selected.iter().position(|s| *s == known) {
            self.selected.remove(pos);
        } else {
            self.selected.push(known);
        }
        true
    }

    /// Selected items in checklist order.
    pub fn selected_experiences(&self) -> Vec<String> {
        CHECKLIST_ITEMS
            .iter()
            .filter(|item| self.selected.contains(item))
            .map(|item| item.to_string())
            .collect()
    }
}

impl StepController for ChecklistStep {
    type Draft = EpdsAssessment;

    fn is_ready(&self) -> bool {
        true
    }

    fn draft(&self) -> &EpdsAssessment {
        &self.draft
    }

    fn into_draft(mut self) -> EpdsAssessment {
        self.draft.additional_experiences = self.selected_experiences();
        self.draft
    }
}

// ═══════════════════════════════════════════
// Coordinator
// ═══════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum QuestionnaireStage {
    Introduction(EpdsAssessment),
    Question(QuestionStep),
    Checklist(ChecklistStep),
    /// Finalized and persisted; the record carries its store id.
    Results(EpdsAssessment),
}

/// Step identifier, for routing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "index", rename_all = "snake_case")]
pub enum QuestionnaireStepId {
    Introduction,
    Question(usize),
    Checklist,
    Results,
}

impl std::fmt::Display for QuestionnaireStepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Introduction => f.write_str("introduction"),
            Self::Question(i) => write!(f, "question {}", i + 1),
            Self::Checklist => f.write_str("checklist"),
            Self::Results => f.write_str("results"),
        }
    }
}

/// Owns the current step and the draft for one run of the questionnaire.
pub struct QuestionnaireFlow<S: RecordStore> {
    store: Arc<S>,
    owner_id: Option<String>,
    stage: QuestionnaireStage,
    ready_to_show_results: bool,
}

impl<S: RecordStore> QuestionnaireFlow<S> {
    /// Starts a new run with an empty draft stamped `now`.
    pub fn new(
        store: Arc<S>,
        owner_id: Option<String>,
        now: DateTime<Utc>,
        show_introduction: bool,
    ) -> Self {
        let draft = EpdsAssessment::new(now);
        let stage = if show_introduction {
            QuestionnaireStage::Introduction(draft)
        } else {
            QuestionnaireStage::Question(QuestionStep::new(0, draft))
        };
        tracing::info!(show_introduction, "EPDS assessment started");
        Self {
            store,
            owner_id,
            stage,
            ready_to_show_results: false,
        }
    }

    pub fn stage(&self) -> &QuestionnaireStage {
        &self.stage
    }

    pub fn step_id(&self) -> QuestionnaireStepId {
        match &self.stage {
            QuestionnaireStage::Introduction(_) => QuestionnaireStepId::Introduction,
            QuestionnaireStage::Question(step) => QuestionnaireStepId::Question(step.index()),
            QuestionnaireStage::Checklist(_) => QuestionnaireStepId::Checklist,
            QuestionnaireStage::Results(_) => QuestionnaireStepId::Results,
        }
    }

    pub fn draft(&self) -> &EpdsAssessment {
        match &self.stage {
            QuestionnaireStage::Introduction(draft) | QuestionnaireStage::Results(draft) => draft,
            QuestionnaireStage::Question(step) => step.draft(),
            QuestionnaireStage::Checklist(step) => step.draft(),
        }
    }

    /// Raised only after a successful persist.
    pub fn ready_to_show_results(&self) -> bool {
        self.ready_to_show_results
    }

    /// The persisted record, once finalized.
    pub fn result(&self) -> Option<&EpdsAssessment> {
        match &self.stage {
            QuestionnaireStage::Results(record) => Some(record),
            _ => None,
        }
    }

    fn wrong_step(&self, operation: &'static str) -> FlowError {
        FlowError::WrongStep {
            operation,
            step: self.step_id().to_string(),
        }
    }

    /// Answers the current question.
    pub fn select_answer(&mut self, score: u8) -> Result<(), FlowError> {
        match &mut self.stage {
            QuestionnaireStage::Question(step) => step.select_answer(score),
            _ => Err(self.wrong_step("select_answer")),
        }
    }

    pub fn toggle_experience(&mut self, item: &str) -> Result<bool, FlowError> {
        match &mut self.stage {
            QuestionnaireStage::Checklist(step) => Ok(step.toggle_experience(item)),
            _ => Err(self.wrong_step("toggle_experience")),
        }
    }

    /// Moves forward one step. Questions must be answered first; the
    /// checklist is left only through `finalize`.
    pub fn advance(&mut self) -> Result<QuestionnaireStepId, FlowError> {
        let next = match &self.stage {
            QuestionnaireStage::Introduction(draft) => {
                QuestionnaireStage::Question(QuestionStep::new(0, draft.clone()))
            }
            QuestionnaireStage::Question(step) => {
                if !step.is_ready() {
                    return Err(FlowError::NotReady);
                }
                let next_index = step.index() + 1;
                let draft = step.clone().into_draft();
                if next_index < EPDS_QUESTIONS.len() {
                    QuestionnaireStage::Question(QuestionStep::new(next_index, draft))
                } else {
                    QuestionnaireStage::Checklist(ChecklistStep::new(draft))
                }
            }
            QuestionnaireStage::Checklist(_) => return Err(self.wrong_step("advance")),
            QuestionnaireStage::Results(_) => return Err(FlowError::AlreadyFinalized),
        };
        self.stage = next;
        tracing::debug!(step = %self.step_id(), "EPDS step advanced");
        Ok(self.step_id())
    }

    /// Moves back one step, keeping every answer already in the draft.
    pub fn back(&mut self) -> Result<QuestionnaireStepId, FlowError> {
        let previous = match &self.stage {
            QuestionnaireStage::Introduction(_) => return Err(FlowError::AtFirstStep),
            QuestionnaireStage::Question(step) if step.index() == 0 => {
                return Err(FlowError::AtFirstStep)
            }
            QuestionnaireStage::Question(step) => {
                QuestionnaireStage::Question(QuestionStep::new(step.index() - 1, step.clone().into_draft()))
            }
            QuestionnaireStage::Checklist(step) => QuestionnaireStage::Question(QuestionStep::new(
                EPDS_QUESTIONS.len() - 1,
                step.clone().into_draft(),
            )),
            QuestionnaireStage::Results(_) => return Err(FlowError::AlreadyFinalized),
        };
        self.stage = previous;
        tracing::debug!(step = %self.step_id(), "EPDS step went back");
        Ok(self.step_id())
    }

    /// Scores the draft, merges the checklist and persists it once.
    ///
    /// On failure the error is logged and returned, the flow stays on the
    /// checklist and `ready_to_show_results` stays false. After success,
    /// further calls return `AlreadyFinalized`.
    pub async fn finalize(&mut self) -> Result<&EpdsAssessment, FlowError> {
        let mut record = match &self.stage {
            QuestionnaireStage::Checklist(step) => step.clone().into_draft(),
            QuestionnaireStage::Results(_) => return Err(FlowError::AlreadyFinalized),
            _ => return Err(self.wrong_step("finalize")),
        };
        record.total_score = compute_total_score(&record.answers);
        tracing::debug!(
            total_score = record.total_score,
            answered = record.answers.len(),
            "Calculated EPDS total score"
        );

        let Some(owner_id) = self.owner_id.as_deref() else {
            tracing::error!("Error saving assessment: no user signed in");
            return Err(FlowError::NotAuthenticated);
        };

        match self.store.save_questionnaire(owner_id, &record).await {
            Ok(id) => {
                record.id = Some(id);
                tracing::info!(%id, total_score = record.total_score, "EPDS assessment saved");
                self.stage = QuestionnaireStage::Results(record);
                self.ready_to_show_results = true;
                match &self.stage {
                    QuestionnaireStage::Results(saved) => Ok(saved),
                    _ => Err(FlowError::AlreadyFinalized),
                }
            }
            Err(e) => {
                tracing::error!("Error saving assessment: {e}");
                Err(FlowError::Persistence(e))
            }
        }
    }

    /// Exit action of the results screen: refresh the dashboard, then go home.
    pub fn exit_results(&self, bus: &SignalBus) -> Result<(), FlowError> {
        if !matches!(self.stage, QuestionnaireStage::Results(_)) {
            return Err(self.wrong_step("exit_results"));
        }
        bus.broadcast(Signal::EpdsAssessmentCompleted);
        bus.broadcast(Signal::NavigateHome);
        Ok(())
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
