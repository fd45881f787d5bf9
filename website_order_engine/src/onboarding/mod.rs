//! # Onboarding wizard
//!
//! A multi-step wizard that collects the answers for a website order into an [`OnboardingDraft`], and hands the
//! completed draft to a [`CompletionHandler`] (normally the order submission gateway).
//!
//! * The steps are a configurable [`StepSequence`] of [`WizardStep`]s. Each step owns a set of draft [`Slice`]s and
//!   a patch that touches any other slice is rejected.
//! * Answers are merged slice by slice, and are never lost: a failed submission leaves the wizard on its last step
//!   with the draft intact, and [`OnboardingWizard::retry_submission`] tries again.
//! * Only one `advance`, `skip` or `retry_submission` can be in flight at a time. A second call fails with
//!   [`OnboardingError::Busy`].
//! * Whether the client already had an account is decided once, when the identity step is entered, and decides
//!   which [`TerminalScreen`] is shown at the end.
mod draft;
mod errors;
mod steps;
mod wizard;

pub use draft::{
    ContactInfo,
    Direction,
    DomainChoice,
    DomainOption,
    DraftPatch,
    Feature,
    FeatureSelection,
    Inspiration,
    MonthlyPlan,
    OnboardingData,
    OnboardingDraft,
    PurposeSelection,
    Slice,
    Timeline,
};
pub use errors::OnboardingError;
pub use steps::{StepSequence, WizardStep};
pub use wizard::{
    CompletedOnboarding,
    CompletionHandler,
    OnboardingCompletion,
    OnboardingWizard,
    StepOutcome,
    TerminalScreen,
};
