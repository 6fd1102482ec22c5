//! Guided multi-step flows: the EPDS questionnaire and the daily check-in.
//!
//! Each flow threads one draft record through a fixed, linear sequence of
//! steps. A step controller is built fresh from the incoming draft, writes
//! its own slot, and hands the draft on by value. The coordinator owns the
//! current step and performs the single terminal persist.

pub mod checkin;
pub mod questionnaire;

use thiserror::Error;

use crate::store::StoreError;

pub use checkin::{CheckInFlow, CheckInStage, CheckInStepId};
pub use questionnaire::{QuestionnaireFlow, QuestionnaireStage, QuestionnaireStepId};

#[derive(Error, Debug)]
pub enum FlowError {
    /// No signed-in owner when the flow tried to persist.
    #[error("No signed-in user to save the record for")]
    NotAuthenticated,
    #[error("Failed to save record: {0}")]
    Persistence(#[from] StoreError),
    #[error("Current step has no answer yet")]
    NotReady,
    #[error("Operation '{operation}' is not available on step {step}")]
    WrongStep { operation: &'static str, step: String },
    #[error("Flow already finalized")]
    AlreadyFinalized,
    #[error("An emotion must be selected before continuing")]
    EmotionRequired,
    #[error("Unknown emotion: {0}")]
    UnknownEmotion(String),
    #[error("Score {score} is not an option for this question")]
    InvalidAnswer { score: u8 },
    #[error("Already at the first step")]
    AtFirstStep,
}

/// Common shape of every step: it owns the draft it was built with and
/// knows whether the user may move on.
pub trait StepController {
    type Draft;

    /// True once this step's slot has a value.
    fn is_ready(&self) -> bool;

    fn draft(&self) -> &Self::Draft;

    /// Hands the draft on, with this step's slot committed.
    fn into_draft(self) -> Self::Draft;
}
