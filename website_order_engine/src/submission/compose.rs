//! Human-readable order title and description, composed from the draft at submission time.
use wop_common::Cents;

use crate::{
    onboarding::{DomainOption, OnboardingData},
    pricing::{price_breakdown, PriceSchedule},
};

pub fn order_title(data: &OnboardingData) -> String {
    let purpose = data.purpose_type().map(title_case).unwrap_or_else(|| "Custom".to_string());
    match data.contact_info.as_ref().and_then(|c| c.company.as_deref()).filter(|c| !c.trim().is_empty()) {
        Some(company) => format!("{purpose} website for {}", company.trim()),
        None => format!("{purpose} website"),
    }
}

pub fn order_description(data: &OnboardingData, schedule: &PriceSchedule, total: Cents) -> String {
    let mut lines = price_breakdown(data, schedule)
        .into_iter()
        .map(|item| format!("- {}: {}", item.label, item.amount))
        .collect::<Vec<_>>();
    lines.push(format!("Total: {total}"));
    if let Some(domain) = &data.domain {
        let name = domain.domain_name.as_deref().unwrap_or("not chosen yet");
        let kind = match domain.option {
            DomainOption::NewDomain => "new",
            DomainOption::ExistingDomain => "existing",
            DomainOption::Undecided => "undecided",
        };
        lines.push(format!("Domain ({kind}): {name}"));
    }
    if let Some(inspiration) = &data.inspiration {
        if !inspiration.reference_sites.is_empty() {
            lines.push(format!("Inspiration: {}", inspiration.reference_sites.join(", ")));
        }
        if let Some(notes) = inspiration.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            lines.push(format!("Notes: {}", notes.trim()));
        }
    }
    lines.join("\n")
}

fn title_case(s: &str) -> String {
    s.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
