//! Appointment reminder rendering.

use chrono::{DateTime, FixedOffset, Locale};

use crate::error::FormatError;
use crate::types::Language;

const SPANISH_DATE_FORMAT: &str = "%d de %B de %Y a las %H:%M";
const ENGLISH_DATE_FORMAT: &str = "%A, %B %-d, %Y %-I:%M %p";

/// Renders the reminder sentence for a patient in the requested language.
///
/// The timestamp is rendered in its own offset, so the patient sees the
/// wall-clock time the caller scheduled.
pub fn render(
    patient_name: &str,
    language_code: &str,
    scheduled_at: DateTime<FixedOffset>,
) -> Result<String, FormatError> {
    let language: Language = language_code.parse()?;
    let name = title_case(patient_name.trim(), language);
    let date = format_date(scheduled_at, language);

    Ok(match language {
        Language::Spanish => {
            format!("Hola {name}, su cita médica está programada para el {date}.")
        }
        Language::English => {
            format!("Hello {name}, your medical appointment is scheduled for {date}.")
        }
    })
}

pub fn format_date(scheduled_at: DateTime<FixedOffset>, language: Language) -> String {
    let (pattern, locale) = match language {
        Language::Spanish => (SPANISH_DATE_FORMAT, Locale::es_ES),
        Language::English => (ENGLISH_DATE_FORMAT, Locale::en_US),
    };
    scheduled_at.format_localized(pattern, locale).to_string()
}

/// Upper-cases the first letter of every word and lower-cases the rest,
/// keeping the original spacing.
///
/// Spanish and English share the default Unicode case mapping, so the
/// language only selects the rule set and never the process locale.
pub fn title_case(text: &str, language: Language) -> String {
    match language {
        Language::Spanish | Language::English => unicode_title_case(text),
    }
}

fn unicode_title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}
