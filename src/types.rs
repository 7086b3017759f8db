use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Languages a reminder can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub const SUPPORTED_CODES: [&'static str; 2] = ["es", "en"];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = crate::error::FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" => Ok(Language::Spanish),
            "en" => Ok(Language::English),
            _ => Err(crate::error::FormatError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Body of `POST /v1/sms/send` and `POST /v1/whatsapp/send`.
///
/// Every field is optional on the wire so that an absent field is reported
/// by the validator alongside the other violations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[schema(example = "maria lopez")]
    pub patient_name: Option<String>,
    #[schema(example = "+34654321789")]
    pub phone_number: Option<String>,
    #[schema(example = "es")]
    pub language_code: Option<String>,
    /// RFC 3339. A value without an offset is read as UTC.
    #[serde(default, alias = "dateTime", deserialize_with = "deserialize_scheduled_at")]
    pub scheduled_at: Option<DateTime<FixedOffset>>,
}

const OFFSETLESS_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an appointment timestamp. Offset-less values are taken as UTC.
pub fn parse_scheduled_at(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }
    OFFSETLESS_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

fn deserialize_scheduled_at<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_scheduled_at(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date and time '{raw}'"))),
    }
}

impl SendMessageRequest {
    /// Builds a request from a decoded JSON body, reporting every field with
    /// the wrong JSON type or an unreadable date instead of stopping at the first.
    pub fn from_json(value: &Value) -> Result<Self, ValidationResult> {
        let mut result = ValidationResult::default();
        let Some(body) = value.as_object() else {
            result.push("body", "Request body must be a JSON object.");
            return Err(result);
        };

        let patient_name = string_field(body, "patientName", &mut result);
        let phone_number = string_field(body, "phoneNumber", &mut result);
        let language_code = string_field(body, "languageCode", &mut result);

        let scheduled_at = match body.get("scheduledAt").or_else(|| body.get("dateTime")) {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => {
                let parsed = parse_scheduled_at(raw);
                if parsed.is_none() {
                    result.push("scheduledAt", "Date and time are not a valid date.");
                }
                parsed
            }
            Some(_) => {
                result.push("scheduledAt", "Date and time are not a valid date.");
                None
            }
        };

        if !result.is_valid() {
            return Err(result);
        }
        Ok(Self {
            patient_name,
            phone_number,
            language_code,
            scheduled_at,
        })
    }
}

fn string_field(body: &Map<String, Value>, field: &str, result: &mut ValidationResult) -> Option<String> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            result.push(field, &format!("{field} must be a string."));
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub is_message_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered field violations. Empty means the request is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenQuery {
    pub user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
