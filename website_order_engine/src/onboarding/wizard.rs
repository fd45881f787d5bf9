use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
    MutexGuard,
};

use log::*;
use serde::{Deserialize, Serialize};
use wop_common::Cents;

use crate::{
    db_types::{Identity, Order},
    onboarding::{Direction, DraftPatch, OnboardingData, OnboardingDraft, OnboardingError, StepSequence, WizardStep},
    pricing::calculate_total,
    submission::SubmissionError,
};

/// The screen shown once the order has been submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalScreen {
    /// The client was signed in before reaching the identity step.
    ExistingUser,
    /// A new account was created during onboarding and its email address still needs confirming.
    ConfirmEmailPending,
}

/// What the wizard hands to its [`CompletionHandler`] when the last step is completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingCompletion {
    pub data: OnboardingData,
    pub identity: Option<Identity>,
    pub is_existing_user: bool,
}

impl OnboardingCompletion {
    pub fn terminal_screen(&self) -> TerminalScreen {
        if self.is_existing_user {
            TerminalScreen::ExistingUser
        } else {
            TerminalScreen::ConfirmEmailPending
        }
    }
}

/// Receives the completed draft. Implemented by the order submission gateway.
#[allow(async_fn_in_trait)]
pub trait CompletionHandler {
    async fn on_complete(&self, completion: &OnboardingCompletion) -> Result<Order, SubmissionError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedOnboarding {
    pub order: Order,
    pub screen: TerminalScreen,
    pub is_existing_user: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The wizard moved to the step at `index`.
    Moved { step: WizardStep, index: usize },
    /// The last step was completed and the order was submitted.
    Completed(CompletedOnboarding),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Active,
    /// The last step was completed but submission failed. The draft is kept so submission can be retried.
    SubmissionFailed(String),
    Completed(CompletedOnboarding),
    Cancelled,
}

#[derive(Debug)]
struct WizardState {
    draft: OnboardingDraft,
    identity: Option<Identity>,
    is_existing_user: Option<bool>,
    status: Status,
}

impl WizardState {
    fn ensure_open(&self) -> Result<(), OnboardingError> {
        match self.status {
            Status::Active | Status::SubmissionFailed(_) => Ok(()),
            Status::Completed(_) => Err(OnboardingError::AlreadyCompleted),
            Status::Cancelled => Err(OnboardingError::Cancelled),
        }
    }

    /// Records whether the client already had an account. Only the first call has any effect.
    fn latch_existing_user(&mut self) {
        if self.is_existing_user.is_none() {
            let existing = self.identity.is_some();
            debug!("🧙️ Identity step reached. Existing user: {existing}");
            self.is_existing_user = Some(existing);
        }
    }
}

/// Releases the processing flag when dropped, including when the owning future is dropped mid-flight.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A single client's onboarding session.
///
/// All methods take `&self`. The draft lives behind a mutex that is never held across an `await`, and a separate
/// flag marks an operation as in flight.
pub struct OnboardingWizard<H> {
    steps: StepSequence,
    handler: H,
    processing: AtomicBool,
    state: Mutex<WizardState>,
}

impl<H> OnboardingWizard<H>
where H: CompletionHandler
{
    /// Starts a wizard with the default six steps.
    pub fn new(handler: H, identity: Option<Identity>) -> Self {
        Self::with_steps(StepSequence::default(), handler, identity, DraftPatch::default())
    }

    /// Starts a wizard over `steps`, pre-filling the draft from `seed`.
    pub fn with_steps(steps: StepSequence, handler: H, identity: Option<Identity>, seed: DraftPatch) -> Self {
        let mut state = WizardState {
            draft: OnboardingDraft { accumulated: OnboardingData::from(seed), ..Default::default() },
            identity,
            is_existing_user: None,
            status: Status::Active,
        };
        // a sequence that starts with (or lacks) the identity step decides up front
        if !matches!(steps.position(WizardStep::Identity), Some(i) if i > 0) {
            state.latch_existing_user();
        }
        Self { steps, handler, processing: AtomicBool::new(false), state: Mutex::new(state) }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn steps(&self) -> &StepSequence {
        &self.steps
    }

    /// Attaches the identity of a client that signed in or signed up part way through the wizard. This does not
    /// change the existing-user decision if it has already been made.
    pub fn sign_in(&self, identity: Identity) {
        let mut state = self.state();
        info!("🧙️ Client {} signed in to the onboarding wizard", identity.id);
        state.identity = Some(identity);
    }

    /// Applies the patch for the current step and moves forward. On the last step, submits the order instead.
    pub async fn advance(&self, patch: DraftPatch) -> Result<StepOutcome, OnboardingError> {
        let _guard = self.begin_processing()?;
        self.advance_locked(patch).await
    }

    /// Moves past an optional step without changing the draft.
    pub async fn skip(&self) -> Result<StepOutcome, OnboardingError> {
        let _guard = self.begin_processing()?;
        let step = {
            let state = self.state();
            state.ensure_open()?;
            self.step_at(state.draft.current_step_index)
        };
        if !step.is_optional() {
            return Err(OnboardingError::StepNotOptional(step));
        }
        debug!("🧙️ Skipping the {step} step");
        self.advance_locked(DraftPatch::default()).await
    }

    /// Moves back one step. Does nothing on the first step. Leaving the last step after a failed submission puts
    /// the wizard back in its normal state, so the order is only submitted again by completing the last step.
    pub fn retreat(&self) -> Result<WizardStep, OnboardingError> {
        if self.processing.load(Ordering::Acquire) {
            return Err(OnboardingError::Busy);
        }
        let mut state = self.state();
        state.ensure_open()?;
        if let Status::SubmissionFailed(_) = state.status {
            debug!("🧙️ Leaving the last step after a failed submission. The error is cleared.");
            state.status = Status::Active;
        }
        let draft = &mut state.draft;
        if draft.current_step_index > 0 {
            draft.current_step_index -= 1;
            draft.direction = Direction::Backward;
        }
        let index = draft.current_step_index;
        let step = self.step_at(index);
        trace!("🧙️ Retreated to step {index} ({step})");
        Ok(step)
    }

    /// Re-submits the completed draft after a failed submission, without walking through the steps again.
    pub async fn retry_submission(&self) -> Result<CompletedOnboarding, OnboardingError> {
        let _guard = self.begin_processing()?;
        let completion = {
            let state = self.state();
            match &state.status {
                Status::SubmissionFailed(_) if state.draft.current_step_index == self.steps.last_index() => {
                    self.completion_for(&state)
                },
                Status::SubmissionFailed(_) => return Err(OnboardingError::NothingToRetry),
                Status::Active => return Err(OnboardingError::NothingToRetry),
                Status::Completed(_) => return Err(OnboardingError::AlreadyCompleted),
                Status::Cancelled => return Err(OnboardingError::Cancelled),
            }
        };
        info!("🧙️ Retrying order submission");
        self.submit(completion).await
    }

    /// Discards the draft. Every later call fails with [`OnboardingError::Cancelled`].
    pub fn cancel(&self) -> Result<(), OnboardingError> {
        if self.processing.load(Ordering::Acquire) {
            return Err(OnboardingError::Busy);
        }
        let mut state = self.state();
        if let Status::Completed(_) = state.status {
            return Err(OnboardingError::AlreadyCompleted);
        }
        state.draft = OnboardingDraft::default();
        state.status = Status::Cancelled;
        info!("🧙️ Onboarding cancelled. Draft discarded.");
        Ok(())
    }

    pub fn current_step(&self) -> WizardStep {
        let index = self.state().draft.current_step_index;
        self.step_at(index)
    }

    pub fn direction(&self) -> Direction {
        self.state().draft.direction
    }

    /// `(current, total)` with `current` counted from 1.
    pub fn progress(&self) -> (usize, usize) {
        let index = self.state().draft.current_step_index;
        (index + 1, self.steps.len())
    }

    pub fn draft(&self) -> OnboardingDraft {
        self.state().draft.clone()
    }

    /// The price of the answers given so far.
    pub fn estimated_total(&self) -> Cents {
        calculate_total(&self.state().draft.accumulated)
    }

    pub fn is_existing_user(&self) -> Option<bool> {
        self.state().is_existing_user
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.state().status, Status::Cancelled)
    }

    /// The message of the most recent failed submission, if the wizard is waiting for a retry.
    pub fn last_error(&self) -> Option<String> {
        match &self.state().status {
            Status::SubmissionFailed(msg) => Some(msg.clone()),
            _ => None,
        }
    }

    pub fn completed(&self) -> Option<CompletedOnboarding> {
        match &self.state().status {
            Status::Completed(done) => Some(done.clone()),
            _ => None,
        }
    }

    //--------------------------------------   Private methods   -------------------------------------------------------
    fn state(&self) -> MutexGuard<'_, WizardState> {
        // the state is always left consistent, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_processing(&self) -> Result<ProcessingGuard<'_>, OnboardingError> {
        self.processing.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).map_err(|_| {
            warn!("🧙️ Ignoring a request while the previous one is still in flight");
            OnboardingError::Busy
        })?;
        Ok(ProcessingGuard(&self.processing))
    }

    fn step_at(&self, index: usize) -> WizardStep {
        self.steps.get(index).unwrap_or(WizardStep::Identity)
    }

    fn completion_for(&self, state: &WizardState) -> OnboardingCompletion {
        let is_existing_user = state.is_existing_user.unwrap_or(state.identity.is_some());
        OnboardingCompletion {
            data: state.draft.accumulated.clone(),
            identity: state.identity.clone(),
            is_existing_user,
        }
    }

    /// The body of `advance`. The caller must hold the processing guard.
    async fn advance_locked(&self, patch: DraftPatch) -> Result<StepOutcome, OnboardingError> {
        let completion = {
            let mut state = self.state();
            state.ensure_open()?;
            let index = state.draft.current_step_index;
            let step = self.step_at(index);
            if let Some(slice) = patch.touched_slices().into_iter().find(|s| !step.owns(*s)) {
                warn!("🧙️ The {step} step tried to write the {slice} slice. Rejected.");
                return Err(OnboardingError::ForeignSlice { step, slice });
            }
            state.draft.accumulated.merge(patch);
            state.draft.direction = Direction::Forward;
            if index < self.steps.last_index() {
                let index = index + 1;
                let next = self.step_at(index);
                state.draft.current_step_index = index;
                if next == WizardStep::Identity {
                    state.latch_existing_user();
                }
                debug!("🧙️ Completed the {step} step. Moving on to {next}");
                return Ok(StepOutcome::Moved { step: next, index });
            }
            state.latch_existing_user();
            self.completion_for(&state)
        };
        info!("🧙️ All onboarding steps complete. Submitting the order.");
        self.submit(completion).await.map(StepOutcome::Completed)
    }

    async fn submit(&self, completion: OnboardingCompletion) -> Result<CompletedOnboarding, OnboardingError> {
        let result = self.handler.on_complete(&completion).await;
        let mut state = self.state();
        match result {
            Ok(order) => {
                let done = CompletedOnboarding {
                    order,
                    screen: completion.terminal_screen(),
                    is_existing_user: completion.is_existing_user,
                };
                info!("🧙️ Order {} submitted. Showing the {:?} screen.", done.order.id, done.screen);
                state.status = Status::Completed(done.clone());
                Ok(done)
            },
            Err(e) => {
                warn!("🧙️ Order submission failed: {e}. The draft has been kept for a retry.");
                state.status = Status::SubmissionFailed(e.to_string());
                Err(e.into())
            },
        }
    }
}
