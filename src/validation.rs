//! Field rules for [`SendMessageRequest`].

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Language, SendMessageRequest, ValidationResult};

pub const PATIENT_NAME_MAX_CHARS: usize = 20;
pub const LANGUAGE_CODE_MAX_CHARS: usize = 2;

/// Seconds since the Unix epoch of `0001-01-01T00:00:00Z`, the zero timestamp
/// some clients send for "not set".
const ZERO_TIMESTAMP: i64 = -62_135_596_800;

// E.164: optional '+', no leading zero, 2 to 15 digits
static PHONE_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{1,14}$").expect("phone number pattern is valid"));

pub fn is_valid_phone_number(phone: &str) -> bool {
    PHONE_NUMBER_REGEX.is_match(phone)
}

/// Validates against the current time.
pub fn validate(request: &SendMessageRequest) -> ValidationResult {
    validate_at(request, Utc::now())
}

/// Collects every violation in field order. A missing field skips the
/// remaining rules for that field only.
pub fn validate_at(request: &SendMessageRequest, now: DateTime<Utc>) -> ValidationResult {
    let mut result = ValidationResult::default();

    match non_blank(request.patient_name.as_deref()) {
        None => result.push("patientName", "Patient name is required."),
        Some(name) => {
            if name.chars().count() > PATIENT_NAME_MAX_CHARS {
                result.push("patientName", "Patient name cannot exceed 20 characters.");
            }
        }
    }

    match non_blank(request.phone_number.as_deref()) {
        None => result.push("phoneNumber", "Phone number is required."),
        Some(phone) => {
            if !is_valid_phone_number(phone) {
                result.push("phoneNumber", "Phone number is invalid.");
            }
        }
    }

    match non_blank(request.language_code.as_deref()) {
        None => result.push("languageCode", "Language code is required."),
        Some(code) => {
            if code.chars().count() > LANGUAGE_CODE_MAX_CHARS {
                result.push("languageCode", "Language code cannot exceed 2 characters.");
            }
            if !Language::SUPPORTED_CODES.contains(&code) {
                result.push("languageCode", "Language code must be 'es' or 'en'.");
            }
        }
    }

    match request.scheduled_at {
        Some(at) if at.timestamp() != ZERO_TIMESTAMP => {
            if at.with_timezone(&Utc) <= now {
                result.push("scheduledAt", "Date and time must be in the future.");
            }
        }
        _ => result.push("scheduledAt", "Date and time are required."),
    }

    result
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
