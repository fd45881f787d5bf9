//! The client-held order draft and the patches that wizard steps apply to it.
//!
//! The draft is split into named slices. A slice is either absent or wholly present, and a patch replaces whole
//! slices (last write wins per slice). A patch can never remove a slice.
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use wop_common::Cents;

//--------------------------------------     Slice payloads    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeline {
    #[default]
    Standard,
    /// Expedited delivery. Attracts the rush fee.
    Rush,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeSelection {
    /// Catalogue key, e.g. `business`, `portfolio` or `ecommerce`.
    pub purpose_type: String,
    pub base_price: Cents,
    #[serde(default)]
    pub timeline: Timeline,
}

impl PurposeSelection {
    pub fn new<S: Into<String>>(purpose_type: S, base_price: Cents) -> Self {
        Self { purpose_type: purpose_type.into(), base_price, timeline: Timeline::Standard }
    }

    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    pub price: Cents,
}

impl Feature {
    pub fn new<S: Into<String>>(id: S, name: S, price: Cents) -> Self {
        Self { id: id.into(), name: name.into(), price }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSelection {
    pub additional_features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspiration {
    pub reference_sites: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainOption {
    /// Register a new domain on the client's behalf. Attracts the domain fee.
    NewDomain,
    ExistingDomain,
    #[default]
    Undecided,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainChoice {
    pub option: DomainOption,
    pub domain_name: Option<String>,
}

impl DomainChoice {
    pub fn requests_new_domain(&self) -> bool {
        self.option == DomainOption::NewDomain
    }
}

/// A recurring plan (hosting or maintenance), billed monthly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPlan {
    pub plan: String,
    pub monthly_price: Cents,
}

impl MonthlyPlan {
    pub fn new<S: Into<String>>(plan: S, monthly_price: Cents) -> Self {
        Self { plan: plan.into(), monthly_price }
    }

    pub fn annual_price(&self) -> Cents {
        self.monthly_price.non_negative() * 12
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

impl ContactInfo {
    pub fn new<S: Into<String>>(name: S, email: S) -> Self {
        Self { name: name.into(), email: email.into(), phone: None, company: None }
    }
}

//--------------------------------------         Slice         ---------------------------------------------------------
/// The names of the draft slices. Every slice is owned by exactly one wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slice {
    Purpose,
    Features,
    Inspiration,
    Domain,
    Hosting,
    Maintenance,
    ContactInfo,
}

impl Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Slice::Purpose => "purpose",
            Slice::Features => "features",
            Slice::Inspiration => "inspiration",
            Slice::Domain => "domain",
            Slice::Hosting => "hosting",
            Slice::Maintenance => "maintenance",
            Slice::ContactInfo => "contact_info",
        };
        f.write_str(name)
    }
}

//--------------------------------------     OnboardingData    ---------------------------------------------------------
/// The accumulated answers of the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingData {
    pub purpose: Option<PurposeSelection>,
    pub features: Option<FeatureSelection>,
    pub inspiration: Option<Inspiration>,
    pub domain: Option<DomainChoice>,
    pub hosting: Option<MonthlyPlan>,
    pub maintenance: Option<MonthlyPlan>,
    pub contact_info: Option<ContactInfo>,
}

impl OnboardingData {
    /// Overwrites every slice present in the patch. Slices absent from the patch are left as they are.
    pub fn merge(&mut self, patch: DraftPatch) {
        let DraftPatch { purpose, features, inspiration, domain, hosting, maintenance, contact_info } = patch;
        if purpose.is_some() {
            self.purpose = purpose;
        }
        if features.is_some() {
            self.features = features;
        }
        if inspiration.is_some() {
            self.inspiration = inspiration;
        }
        if domain.is_some() {
            self.domain = domain;
        }
        if hosting.is_some() {
            self.hosting = hosting;
        }
        if maintenance.is_some() {
            self.maintenance = maintenance;
        }
        if contact_info.is_some() {
            self.contact_info = contact_info;
        }
    }

    pub fn present_slices(&self) -> Vec<Slice> {
        let mut slices = Vec::with_capacity(7);
        push_if(&mut slices, self.purpose.is_some(), Slice::Purpose);
        push_if(&mut slices, self.features.is_some(), Slice::Features);
        push_if(&mut slices, self.inspiration.is_some(), Slice::Inspiration);
        push_if(&mut slices, self.domain.is_some(), Slice::Domain);
        push_if(&mut slices, self.hosting.is_some(), Slice::Hosting);
        push_if(&mut slices, self.maintenance.is_some(), Slice::Maintenance);
        push_if(&mut slices, self.contact_info.is_some(), Slice::ContactInfo);
        slices
    }

    pub fn purpose_type(&self) -> Option<&str> {
        self.purpose.as_ref().map(|p| p.purpose_type.as_str())
    }

    pub fn additional_features(&self) -> &[Feature] {
        self.features.as_ref().map(|f| f.additional_features.as_slice()).unwrap_or_default()
    }
}

fn push_if(slices: &mut Vec<Slice>, present: bool, slice: Slice) {
    if present {
        slices.push(slice);
    }
}

//--------------------------------------       DraftPatch      ---------------------------------------------------------
/// A partial update produced by a single wizard step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPatch {
    pub purpose: Option<PurposeSelection>,
    pub features: Option<FeatureSelection>,
    pub inspiration: Option<Inspiration>,
    pub domain: Option<DomainChoice>,
    pub hosting: Option<MonthlyPlan>,
    pub maintenance: Option<MonthlyPlan>,
    pub contact_info: Option<ContactInfo>,
}

impl DraftPatch {
    pub fn is_empty(&self) -> bool {
        self.touched_slices().is_empty()
    }

    /// The slices this patch would write.
    pub fn touched_slices(&self) -> Vec<Slice> {
        let mut slices = Vec::with_capacity(7);
        push_if(&mut slices, self.purpose.is_some(), Slice::Purpose);
        push_if(&mut slices, self.features.is_some(), Slice::Features);
        push_if(&mut slices, self.inspiration.is_some(), Slice::Inspiration);
        push_if(&mut slices, self.domain.is_some(), Slice::Domain);
        push_if(&mut slices, self.hosting.is_some(), Slice::Hosting);
        push_if(&mut slices, self.maintenance.is_some(), Slice::Maintenance);
        push_if(&mut slices, self.contact_info.is_some(), Slice::ContactInfo);
        slices
    }

    pub fn with_purpose(mut self, purpose: PurposeSelection) -> Self {
        self.purpose = Some(purpose);
        self
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = Some(FeatureSelection { additional_features: features });
        self
    }

    pub fn with_inspiration(mut self, inspiration: Inspiration) -> Self {
        self.inspiration = Some(inspiration);
        self
    }

    pub fn with_domain(mut self, domain: DomainChoice) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_hosting(mut self, hosting: MonthlyPlan) -> Self {
        self.hosting = Some(hosting);
        self
    }

    pub fn with_maintenance(mut self, maintenance: MonthlyPlan) -> Self {
        self.maintenance = Some(maintenance);
        self
    }

    pub fn with_contact_info(mut self, contact_info: ContactInfo) -> Self {
        self.contact_info = Some(contact_info);
        self
    }
}

/// A seed is just a patch applied to an empty draft, without any ownership checks.
impl From<DraftPatch> for OnboardingData {
    fn from(patch: DraftPatch) -> Self {
        let mut data = OnboardingData::default();
        data.merge(patch);
        data
    }
}

//--------------------------------------    OnboardingDraft    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// A snapshot of the wizard position and answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingDraft {
    pub current_step_index: usize,
    pub accumulated: OnboardingData,
    /// Which way the last move went. Presentation only.
    pub direction: Direction,
}

/// Builds a patch that writes a random subset of `slices` with random values.
#[cfg(test)]
pub(crate) fn random_patch<R: rand::Rng>(rng: &mut R, slices: &[Slice]) -> DraftPatch {
    let mut patch = DraftPatch::default();
    for slice in slices {
        if !rng.gen_bool(0.6) {
            continue;
        }
        let price = Cents::from(rng.gen_range(0..100_000i64));
        let tag = rng.gen_range(0..1000u32);
        patch = match slice {
            Slice::Purpose => patch.with_purpose(PurposeSelection::new(format!("purpose-{tag}"), price)),
            Slice::Features => {
                patch.with_features(vec![Feature::new(format!("f{tag}"), format!("Feature {tag}"), price)])
            },
            Slice::Inspiration => {
                patch.with_inspiration(Inspiration { reference_sites: vec![format!("site{tag}.com")], notes: None })
            },
            Slice::Domain => patch.with_domain(DomainChoice { option: DomainOption::NewDomain, domain_name: None }),
            Slice::Hosting => patch.with_hosting(MonthlyPlan::new(format!("hosting-{tag}"), price)),
            Slice::Maintenance => patch.with_maintenance(MonthlyPlan::new(format!("care-{tag}"), price)),
            Slice::ContactInfo => {
                patch.with_contact_info(ContactInfo::new(format!("Client {tag}"), format!("c{tag}@example.com")))
            },
        };
    }
    patch
}
