//! Daily mood check-in flow.
//!
//! Mood level → energy level → emotion → journal and factors → affirmation
//! → finalize (compose affirmation, persist) → completion.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FlowError, StepController};
use crate::emotion::{self, CategoryInfo};
use crate::models::DailyCheckIn;
use crate::signals::{Signal, SignalBus};
use crate::store::RecordStore;

/// Slider starting position for mood and energy.
pub const DEFAULT_LEVEL: f64 = 0.5;

pub const CONTRIBUTING_FACTORS: [&str; 6] = [
    "Better sleep",
    "Journaled",
    "Meditated",
    "Baby blues",
    "Therapy",
    "Medication",
];

pub const AFFIRMATION_WORDS: [&str; 5] = ["Strength", "Empathy", "Love", "Kindness", "Tenacity"];

/// The sentence saved with the check-in. Any keyword is accepted, including
/// an empty one.
pub fn compose_affirmation(keyword: &str) -> String {
    format!("My {keyword} is my greatest quality as a mother.")
}

// ═══════════════════════════════════════════
// Level step (mood, energy)
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSlot {
    Mood,
    Energy,
}

/// A slider in `[0.0, 1.0]`. Always ready: the default position is a valid answer.
#[derive(Debug, Clone)]
pub struct LevelStep {
    slot: LevelSlot,
    value: f64,
    draft: DailyCheckIn,
}

impl LevelStep {
    fn new(slot: LevelSlot, draft: DailyCheckIn) -> Self {
        let existing = match slot {
            LevelSlot::Mood => draft.mood_value,
            LevelSlot::Energy => draft.energy_value,
        };
        Self {
            slot,
            value: existing.unwrap_or(DEFAULT_LEVEL),
            draft,
        }
    }

    pub fn slot(&self) -> LevelSlot {
        self.slot
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Moves the slider. Out-of-range values are clamped; NaN is ignored.
    pub fn select_answer(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.value = value.clamp(0.0, 1.0);
    }
}

impl StepController for LevelStep {
    type Draft = DailyCheckIn;

    fn is_ready(&self) -> bool {
        true
    }

    fn draft(&self) -> &DailyCheckIn {
        &self.draft
    }

    fn into_draft(mut self) -> DailyCheckIn {
        match self.slot {
            LevelSlot::Mood => self.draft.mood_value = Some(self.value),
            LevelSlot::Energy => self.draft.energy_value = Some(self.value),
        }
        self.draft
    }
}

// ═══════════════════════════════════════════
// Emotion step
// ═══════════════════════════════════════════

/// Primary emotion pick plus the expanded search over the whole palette.
/// Exactly one emotion must be selected to move on.
#[derive(Debug, Clone)]
pub struct EmotionStep {
    selected: Option<String>,
    search_text: String,
    draft: DailyCheckIn,
}

impl EmotionStep {
    fn new(draft: DailyCheckIn) -> Self {
        Self {
            selected: draft.selected_emotion.clone(),
            search_text: String::new(),
            draft,
        }
    }

    /// Category heads shown on the primary screen.
    pub fn primary_emotions(&self) -> Vec<&'static str> {
        emotion::primary_emotions()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select_answer(&mut self, label: &str) -> Result<(), FlowError> {
        if !emotion::is_known_emotion(label) {
            return Err(FlowError::UnknownEmotion(label.to_string()));
        }
        self.selected = Some(label.to_string());
        Ok(())
    }

    /// Expanded-screen tap: selecting the current emotion again clears it.
    pub fn toggle_emotion(&mut self, label: &str) -> Result<(), FlowError> {
        if self.selected.as_deref() == Some(label) {
            self.selected = None;
            return Ok(());
        }
        self.select_answer(label)
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Palette filtered by the current search text.
    pub fn filtered(&self) -> Vec<CategoryInfo> {
        emotion::search(&self.search_text)
    }
}

impl StepController for EmotionStep {
    type Draft = DailyCheckIn;

    fn is_ready(&self) -> bool {
        self.selected.is_some()
    }

    fn draft(&self) -> &DailyCheckIn {
        &self.draft
    }

    fn into_draft(mut self) -> DailyCheckIn {
        self.draft.selected_emotion = self.selected;
        self.draft
    }
}

// ═══════════════════════════════════════════
// Journal step
// ═══════════════════════════════════════════

/// Free-form text with emotion-templated prompts, plus contributing factors.
#[derive(Debug, Clone)]
pub struct JournalStep {
    text: String,
    factors: BTreeSet<String>,
    draft: DailyCheckIn,
}

impl JournalStep {
    fn new(draft: DailyCheckIn) -> Self {
        Self {
            text: draft.journal_text.clone().unwrap_or_default(),
            factors: draft.factors.clone(),
            draft,
        }
    }

    /// Sentence starters built from the selected emotion.
    pub fn prompts(&self) -> [String; 3] {
        let emotion = self
            .draft
            .selected_emotion
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_else(|| "feeling".to_string());
        [
            format!("I'm {emotion} that..."),
            "In this moment...".to_string(),
            format!("I felt {emotion} when..."),
        ]
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Appends a prompt, separated from existing text by one space.
    pub fn select_prompt(&mut self, prompt: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(prompt);
    }

    pub fn factors(&self) -> &BTreeSet<String> {
        &self.factors
    }

    /// Returns false for a label outside the factor list.
    pub fn toggle_factor(&mut self, factor: &str) -> bool {
        if !CONTRIBUTING_FACTORS.contains(&factor) {
            return false;
        }
        if !self.factors.remove(factor) {
            self.factors.insert(factor.to_string());
        }
        true
    }
}

impl StepController for JournalStep {
    type Draft = DailyCheckIn;

    fn is_ready(&self) -> bool {
        true
    }

    fn draft(&self) -> &DailyCheckIn {
        &self.draft
    }

    fn into_draft(mut self) -> DailyCheckIn {
        self.draft.journal_text = (!self.text.is_empty()).then_some(self.text);
        self.draft.factors = self.factors;
        self.draft
    }
}

// ═══════════════════════════════════════════
// Affirmation step
// ═══════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct AffirmationStep {
    keyword: String,
    draft: DailyCheckIn,
}

impl AffirmationStep {
    fn new(draft: DailyCheckIn, keyword: String) -> Self {
        Self { keyword, draft }
    }

    pub fn suggested_words(&self) -> &'static [&'static str] {
        &AFFIRMATION_WORDS
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// A suggested word or anything typed. No validation.
    pub fn select_answer(&mut self, keyword: &str) {
        self.keyword = keyword.to_string();
    }

    pub fn preview(&self) -> String {
        compose_affirmation(&self.keyword)
    }
}

impl StepController for AffirmationStep {
    type Draft = DailyCheckIn;

    fn is_ready(&self) -> bool {
        true
    }

    fn draft(&self) -> &DailyCheckIn {
        &self.draft
    }

    /// The affirmation is only written at finalize, so nothing is committed here.
    fn into_draft(self) -> DailyCheckIn {
        self.draft
    }
}

// ═══════════════════════════════════════════
// Coordinator
// ═══════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum CheckInStage {
    Mood(LevelStep),
    Energy(LevelStep),
    Emotion(EmotionStep),
    Journal(JournalStep),
    Affirmation(AffirmationStep),
    /// Persisted; the record carries its store id.
    Complete(DailyCheckIn),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStepId {
    Mood,
    Energy,
    Emotion,
    Journal,
    Affirmation,
    Complete,
}

impl std::fmt::Display for CheckInStepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Mood => "mood",
            Self::Energy => "energy",
            Self::Emotion => "emotion",
            Self::Journal => "journal",
            Self::Affirmation => "affirmation",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Owns the current step and the draft for one check-in.
pub struct CheckInFlow<S: RecordStore> {
    store: Arc<S>,
    owner_id: Option<String>,
    stage: CheckInStage,
    /// Word typed on the affirmation step, kept while the user goes back.
    affirmation_keyword: String,
    ready_to_show_completion: bool,
}

impl<S: RecordStore> CheckInFlow<S> {
    pub fn new(store: Arc<S>, owner_id: Option<String>, now: DateTime<Utc>) -> Self {
        tracing::info!("Mood check-in started");
        Self {
            store,
            owner_id,
            stage: CheckInStage::Mood(LevelStep::new(LevelSlot::Mood, DailyCheckIn::new(now))),
            affirmation_keyword: String::new(),
            ready_to_show_completion: false,
        }
    }

    pub fn stage(&self) -> &CheckInStage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut CheckInStage {
        &mut self.stage
    }

    pub fn step_id(&self) -> CheckInStepId {
        match &self.stage {
            CheckInStage::Mood(_) => CheckInStepId::Mood,
            CheckInStage::Energy(_) => CheckInStepId::Energy,
            CheckInStage::Emotion(_) => CheckInStepId::Emotion,
            CheckInStage::Journal(_) => CheckInStepId::Journal,
            CheckInStage::Affirmation(_) => CheckInStepId::Affirmation,
            CheckInStage::Complete(_) => CheckInStepId::Complete,
        }
    }

    pub fn draft(&self) -> &DailyCheckIn {
        match &self.stage {
            CheckInStage::Mood(step) | CheckInStage::Energy(step) => step.draft(),
            CheckInStage::Emotion(step) => step.draft(),
            CheckInStage::Journal(step) => step.draft(),
            CheckInStage::Affirmation(step) => step.draft(),
            CheckInStage::Complete(record) => record,
        }
    }

    pub fn ready_to_show_completion(&self) -> bool {
        self.ready_to_show_completion
    }

    pub fn result(&self) -> Option<&DailyCheckIn> {
        match &self.stage {
            CheckInStage::Complete(record) => Some(record),
            _ => None,
        }
    }

    fn wrong_step(&self, operation: &'static str) -> FlowError {
        FlowError::WrongStep {
            operation,
            step: self.step_id().to_string(),
        }
    }

    /// Slider value on the mood or energy step.
    pub fn set_level(&mut self, value: f64) -> Result<(), FlowError> {
        match &mut self.stage {
            CheckInStage::Mood(step) | CheckInStage::Energy(step) => {
                step.select_answer(value);
                Ok(())
            }
            _ => Err(self.wrong_step("set_level")),
        }
    }

    pub fn select_emotion(&mut self, label: &str) -> Result<(), FlowError> {
        match &mut self.stage {
            CheckInStage::Emotion(step) => step.select_answer(label),
            _ => Err(self.wrong_step("select_emotion")),
        }
    }

    /// Expanded emotion screen: tapping the selected emotion clears it.
    pub fn toggle_emotion(&mut self, label: &str) -> Result<(), FlowError> {
        match &mut self.stage {
            CheckInStage::Emotion(step) => step.toggle_emotion(label),
            _ => Err(self.wrong_step("toggle_emotion")),
        }
    }

    /// Updates the emotion search and returns the filtered palette.
    pub fn set_emotion_search(&mut self, text: &str) -> Result<Vec<CategoryInfo>, FlowError> {
        match &mut self.stage {
            CheckInStage::Emotion(step) => {
                step.set_search_text(text);
                Ok(step.filtered())
            }
            _ => Err(self.wrong_step("set_emotion_search")),
        }
    }

    pub fn set_journal_text(&mut self, text: &str) -> Result<(), FlowError> {
        match &mut self.stage {
            CheckInStage::Journal(step) => {
                step.set_text(text);
                Ok(())
            }
            _ => Err(self.wrong_step("set_journal_text")),
        }
    }

    pub fn select_journal_prompt(&mut self, prompt: &str) -> Result<(), FlowError> {
        match &mut self.stage {
            CheckInStage::Journal(step) => {
                step.select_prompt(prompt);
                Ok(())
            }
            _ => Err(self.wrong_step("select_journal_prompt")),
        }
    }

    pub fn toggle_factor(&mut self, factor: &str) -> Result<bool, FlowError> {
        match &mut self.stage {
            CheckInStage::Journal(step) => Ok(step.toggle_factor(factor)),
            _ => Err(self.wrong_step("toggle_factor")),
        }
    }

    pub fn select_affirmation_word(&mut self, keyword: &str) -> Result<(), FlowError> {
        match &mut self.stage {
            CheckInStage::Affirmation(step) => {
                step.select_answer(keyword);
                Ok(())
            }
            _ => Err(self.wrong_step("select_affirmation_word")),
        }
    }

    /// Moves forward one step. The affirmation step is left only through
    /// `finalize`.
    pub fn advance(&mut self) -> Result<CheckInStepId, FlowError> {
        let next = match &self.stage {
            CheckInStage::Mood(step) => {
                CheckInStage::Energy(LevelStep::new(LevelSlot::Energy, step.clone().into_draft()))
            }
            CheckInStage::Energy(step) => {
                CheckInStage::Emotion(EmotionStep::new(step.clone().into_draft()))
            }
            CheckInStage::Emotion(step) => {
                if !step.is_ready() {
                    return Err(FlowError::EmotionRequired);
                }
                CheckInStage::Journal(JournalStep::new(step.clone().into_draft()))
            }
            CheckInStage::Journal(step) => {
                CheckInStage::Affirmation(AffirmationStep::new(
                    step.clone().into_draft(),
                    self.affirmation_keyword.clone(),
                ))
            }
            CheckInStage::Affirmation(_) => return Err(self.wrong_step("advance")),
            CheckInStage::Complete(_) => return Err(FlowError::AlreadyFinalized),
        };
        self.stage = next;
        tracing::debug!(step = %self.step_id(), "Check-in step advanced");
        Ok(self.step_id())
    }

    /// Moves back one step, keeping everything already entered.
    pub fn back(&mut self) -> Result<CheckInStepId, FlowError> {
        let previous = match &self.stage {
            CheckInStage::Mood(_) => return Err(FlowError::AtFirstStep),
            CheckInStage::Energy(step) => {
                CheckInStage::Mood(LevelStep::new(LevelSlot::Mood, step.clone().into_draft()))
            }
            CheckInStage::Emotion(step) => {
                CheckInStage::Energy(LevelStep::new(LevelSlot::Energy, step.clone().into_draft()))
            }
            CheckInStage::Journal(step) => {
                CheckInStage::Emotion(EmotionStep::new(step.clone().into_draft()))
            }
            CheckInStage::Affirmation(step) => {
                self.affirmation_keyword = step.keyword().to_string();
                CheckInStage::Journal(JournalStep::new(step.clone().into_draft()))
            }
            CheckInStage::Complete(_) => return Err(FlowError::AlreadyFinalized),
        };
        self.stage = previous;
        tracing::debug!(step = %self.step_id(), "Check-in step went back");
        Ok(self.step_id())
    }

    /// Composes the affirmation and persists the check-in once.
    ///
    /// Failures are logged and returned; the flow stays on the affirmation
    /// step and `ready_to_show_completion` stays false.
    pub async fn finalize(&mut self) -> Result<&DailyCheckIn, FlowError> {
        let mut record = match &self.stage {
            CheckInStage::Affirmation(step) => {
                let mut record = step.draft().clone();
                record.affirmation = Some(step.preview());
                record
            }
            CheckInStage::Complete(_) => return Err(FlowError::AlreadyFinalized),
            _ => return Err(self.wrong_step("finalize")),
        };

        let Some(owner_id) = self.owner_id.as_deref() else {
            tracing::error!("Error saving final check-in: no user signed in");
            return Err(FlowError::NotAuthenticated);
        };

        match self.store.save_check_in(owner_id, &record).await {
            Ok(id) => {
                record.id = Some(id);
                tracing::info!(%id, emotion = ?record.selected_emotion, "Final check-in saved");
                self.stage = CheckInStage::Complete(record);
                self.ready_to_show_completion = true;
                match &self.stage {
                    CheckInStage::Complete(saved) => Ok(saved),
                    _ => Err(FlowError::AlreadyFinalized),
                }
            }
            Err(e) => {
                tracing::error!("Error saving final check-in: {e}");
                Err(FlowError::Persistence(e))
            }
        }
    }

    /// Exit action of the completion screen.
    pub fn exit_completion(&self, bus: &SignalBus) -> Result<(), FlowError> {
        if !matches!(self.stage, CheckInStage::Complete(_)) {
            return Err(self.wrong_step("exit_completion"));
        }
        bus.broadcast(Signal::MoodCheckInCompleted);
        bus.broadcast(Signal::NavigateHome);
        Ok(())
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
