use thiserror::Error;

use crate::{
    onboarding::{Slice, WizardStep},
    submission::SubmissionError,
};

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("The previous step is still being processed. Please wait.")]
    Busy,
    #[error("The {step} step cannot change the {slice} answers")]
    ForeignSlice { step: WizardStep, slice: Slice },
    #[error("The {0} step is required and cannot be skipped")]
    StepNotOptional(WizardStep),
    #[error("The onboarding wizard has been cancelled")]
    Cancelled,
    #[error("Onboarding has already been completed")]
    AlreadyCompleted,
    #[error("There is no failed submission to retry")]
    NothingToRetry,
    #[error("Invalid step sequence: {0}")]
    InvalidStepSequence(String),
    #[error("Your order could not be submitted. {0}")]
    SubmissionFailed(#[from] SubmissionError),
}
