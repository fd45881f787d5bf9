use std::sync::OnceLock;

use regex::Regex;
use wop_common::Cents;

use crate::{
    onboarding::OnboardingData,
    pricing::{calculate_total_with, PriceSchedule},
    submission::FieldViolation,
};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// A plain syntax check. Deliverability is confirmed out of band by the confirmation email.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref().map(|re| re.is_match(email.trim())).unwrap_or(false)
}

/// Checks a completed draft and returns its total. Every violation is collected, not just the first.
pub fn validate_draft(data: &OnboardingData, schedule: &PriceSchedule) -> Result<Cents, Vec<FieldViolation>> {
    let mut violations = Vec::new();
    match &data.purpose {
        None => {
            violations.push(FieldViolation::new("purpose_type", "is required"));
            violations.push(FieldViolation::new("base_price", "must be greater than zero"));
        },
        Some(purpose) => {
            if purpose.purpose_type.trim().is_empty() {
                violations.push(FieldViolation::new("purpose_type", "is required"));
            }
            if !purpose.base_price.is_positive() {
                violations.push(FieldViolation::new("base_price", "must be greater than zero"));
            }
        },
    }
    match &data.contact_info {
        Some(contact) if is_valid_email(&contact.email) => {},
        Some(_) => violations.push(FieldViolation::new("contact_email", "is not a valid email address")),
        None => violations.push(FieldViolation::new("contact_email", "is required")),
    }
    let total = calculate_total_with(data, schedule);
    if !total.is_positive() {
        violations.push(FieldViolation::new("total_amount", "must be greater than zero"));
    }
    if violations.is_empty() {
        Ok(total)
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::onboarding::{ContactInfo, DraftPatch, PurposeSelection};

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("  jane.doe+web@mail.example.co.uk "));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@mail.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn all_violations_are_reported() {
        let data = OnboardingData::from(
            DraftPatch::default()
                .with_purpose(PurposeSelection::new(" ", Cents::default()))
                .with_contact_info(ContactInfo::new("Jane", "not-an-email")),
        );
        let violations = validate_draft(&data, &PriceSchedule::default()).unwrap_err();
        let fields = violations.iter().map(|v| v.field.as_str()).collect::<Vec<_>>();
        assert_eq!(fields, vec!["purpose_type", "base_price", "contact_email", "total_amount"]);
    }

    #[test]
    fn empty_draft() {
        let violations = validate_draft(&OnboardingData::default(), &PriceSchedule::default()).unwrap_err();
        let fields = violations.iter().map(|v| v.field.as_str()).collect::<Vec<_>>();
        assert_eq!(fields, vec!["purpose_type", "base_price", "contact_email", "total_amount"]);
    }

    #[test]
    fn missing_purpose_reports_both_purpose_fields() {
        let data = OnboardingData::from(
            DraftPatch::default().with_contact_info(ContactInfo::new("Jane", "jane@example.com")),
        );
        let violations = validate_draft(&data, &PriceSchedule::default()).unwrap_err();
        let fields = violations.iter().map(|v| v.field.as_str()).collect::<Vec<_>>();
        assert_eq!(fields, vec!["purpose_type", "base_price", "total_amount"]);
    }

    #[test]
    fn valid_draft_returns_its_total() {
        let data = OnboardingData::from(
            DraftPatch::default()
                .with_purpose(PurposeSelection::new("business", Cents::from_dollars(650)))
                .with_contact_info(ContactInfo::new("Jane", "jane@example.com")),
        );
        assert_eq!(validate_draft(&data, &PriceSchedule::default()), Ok(Cents::from_dollars(650)));
    }
}
