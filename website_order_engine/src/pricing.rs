//! # Pricing
//!
//! Turns a (possibly partial) onboarding draft into a price. The calculation is a pure function of the draft and a
//! [`PriceSchedule`]: no clock, no I/O, and absent answers simply count as zero, so the wizard can show a running
//! estimate at any step.
//!
//! ```text
//! total = base price of the purpose
//!       + sum of additional feature prices
//!       + hosting monthly price × 12
//!       + maintenance monthly price × 12
//!       + new domain fee (if a new domain is requested)
//!       + rush fee (if the expedited timeline is chosen)
//! ```
//!
//! All amounts are integer [`Cents`], so the total is exact to two decimal places. Negative catalogue prices are
//! treated as zero, so the total is never negative.
use serde::{Deserialize, Serialize};
use wop_common::Cents;

use crate::onboarding::{OnboardingData, Timeline};

/// Fixed fees that do not come from the catalogue selections themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSchedule {
    pub new_domain_fee: Cents,
    pub rush_fee: Cents,
}

impl Default for PriceSchedule {
    fn default() -> Self {
        Self { new_domain_fee: Cents::from_dollars(15), rush_fee: Cents::from_dollars(250) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLineItem {
    pub label: String,
    pub amount: Cents,
}

impl PriceLineItem {
    fn new<S: Into<String>>(label: S, amount: Cents) -> Self {
        Self { label: label.into(), amount: amount.non_negative() }
    }
}

/// The total for the draft using the default fee schedule.
pub fn calculate_total(data: &OnboardingData) -> Cents {
    calculate_total_with(data, &PriceSchedule::default())
}

pub fn calculate_total_with(data: &OnboardingData, schedule: &PriceSchedule) -> Cents {
    price_breakdown(data, schedule).iter().map(|item| item.amount).sum()
}

/// The itemised price of the draft. The amounts always sum to [`calculate_total_with`] for the same inputs.
pub fn price_breakdown(data: &OnboardingData, schedule: &PriceSchedule) -> Vec<PriceLineItem> {
    let mut items = Vec::new();
    if let Some(purpose) = &data.purpose {
        items.push(PriceLineItem::new(format!("Base price ({})", purpose.purpose_type), purpose.base_price));
    }
    for feature in data.additional_features() {
        items.push(PriceLineItem::new(feature.name.as_str(), feature.price));
    }
    if let Some(hosting) = &data.hosting {
        items.push(PriceLineItem::new(format!("Hosting: {} (12 months)", hosting.plan), hosting.annual_price()));
    }
    if let Some(maintenance) = &data.maintenance {
        items.push(PriceLineItem::new(
            format!("Maintenance: {} (12 months)", maintenance.plan),
            maintenance.annual_price(),
        ));
    }
    if data.domain.as_ref().map(|d| d.requests_new_domain()).unwrap_or(false) {
        items.push(PriceLineItem::new("New domain registration", schedule.new_domain_fee));
    }
    if data.purpose.as_ref().map(|p| p.timeline == Timeline::Rush).unwrap_or(false) {
        items.push(PriceLineItem::new("Rush delivery", schedule.rush_fee));
    }
    items
}
