use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::onboarding::{draft::Slice, OnboardingError};

/// The wizard steps. Each step owns a fixed set of draft slices and may only write those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Purpose,
    Features,
    Inspiration,
    DomainHosting,
    Maintenance,
    /// Confirms (or creates) the account the order is placed under. Collects contact details.
    Identity,
}

impl WizardStep {
    pub fn owned_slices(&self) -> &'static [Slice] {
        match self {
            WizardStep::Purpose => &[Slice::Purpose],
            WizardStep::Features => &[Slice::Features],
            WizardStep::Inspiration => &[Slice::Inspiration],
            WizardStep::DomainHosting => &[Slice::Domain, Slice::Hosting],
            WizardStep::Maintenance => &[Slice::Maintenance],
            WizardStep::Identity => &[Slice::ContactInfo],
        }
    }

    pub fn owns(&self, slice: Slice) -> bool {
        self.owned_slices().contains(&slice)
    }

    /// Optional steps may be skipped.
    pub fn is_optional(&self) -> bool {
        matches!(self, WizardStep::Features | WizardStep::Inspiration | WizardStep::Maintenance)
    }
}

impl Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WizardStep::Purpose => "purpose",
            WizardStep::Features => "features",
            WizardStep::Inspiration => "inspiration",
            WizardStep::DomainHosting => "domain & hosting",
            WizardStep::Maintenance => "maintenance",
            WizardStep::Identity => "identity",
        };
        f.write_str(name)
    }
}

/// An ordered, non-empty list of distinct wizard steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSequence(Vec<WizardStep>);

impl StepSequence {
    pub fn new(steps: Vec<WizardStep>) -> Result<Self, OnboardingError> {
        if steps.is_empty() {
            return Err(OnboardingError::InvalidStepSequence("a wizard needs at least one step".into()));
        }
        for (i, step) in steps.iter().enumerate() {
            if steps[..i].contains(step) {
                return Err(OnboardingError::InvalidStepSequence(format!("the {step} step appears more than once")));
            }
        }
        Ok(Self(steps))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, since an empty sequence cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<WizardStep> {
        self.0.get(index).copied()
    }

    pub fn last_index(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn position(&self, step: WizardStep) -> Option<usize> {
        self.0.iter().position(|s| *s == step)
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.0
    }
}

impl Default for StepSequence {
    fn default() -> Self {
        Self(vec![
            WizardStep::Purpose,
            WizardStep::Features,
            WizardStep::Inspiration,
            WizardStep::DomainHosting,
            WizardStep::Maintenance,
            WizardStep::Identity,
        ])
    }
}
