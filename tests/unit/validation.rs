use appointment_notify::types::SendMessageRequest;
use appointment_notify::validation::{validate, validate_at};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

fn in_future() -> DateTime<FixedOffset> {
    (now() + Duration::days(1)).fixed_offset()
}

fn valid_request() -> SendMessageRequest {
    SendMessageRequest {
        patient_name: Some("test".to_string()),
        phone_number: Some("+34654321789".to_string()),
        language_code: Some("es".to_string()),
        scheduled_at: Some(in_future()),
    }
}

#[test]
fn test_valid_request() {
    let result = validate_at(&valid_request(), now());
    assert!(result.is_valid(), "{:?}", result.errors);
}

#[test]
fn test_validate_uses_current_time() {
    let mut req = valid_request();
    req.scheduled_at = Some((Utc::now() + Duration::hours(1)).fixed_offset());
    assert!(validate(&req).is_valid());
}

#[test]
fn test_patient_name_required() {
    for name in [None, Some(""), Some("   ")] {
        let mut req = valid_request();
        req.patient_name = name.map(str::to_string);
        let result = validate_at(&req, now());
        let messages: Vec<_> = result.messages_for("patientName").collect();
        assert_eq!(messages, vec!["Patient name is required."]);
    }
}

#[test]
fn test_patient_name_too_long() {
    let mut req = valid_request();
    req.patient_name = Some("a".repeat(21));
    let result = validate_at(&req, now());
    assert!(result.has_error_for("patientName"));
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn test_patient_name_twenty_chars_accepted() {
    let mut req = valid_request();
    req.patient_name = Some("ñ".repeat(20));
    assert!(validate_at(&req, now()).is_valid());
}

#[test]
fn test_phone_number_invalid() {
    for phone in ["phone", "+0123456789", "1", "+34 654 321 789", "+1234567890123456"] {
        let mut req = valid_request();
        req.phone_number = Some(phone.to_string());
        let result = validate_at(&req, now());
        let messages: Vec<_> = result.messages_for("phoneNumber").collect();
        assert_eq!(messages, vec!["Phone number is invalid."], "phone {phone}");
    }
}

#[test]
fn test_phone_number_required() {
    for phone in [None, Some("")] {
        let mut req = valid_request();
        req.phone_number = phone.map(str::to_string);
        let result = validate_at(&req, now());
        let messages: Vec<_> = result.messages_for("phoneNumber").collect();
        assert_eq!(messages, vec!["Phone number is required."]);
    }
}

#[test]
fn test_phone_number_without_plus_accepted() {
    let mut req = valid_request();
    req.phone_number = Some("34654321789".to_string());
    assert!(validate_at(&req, now()).is_valid());
}

#[test]
fn test_language_code_not_allowed() {
    let mut req = valid_request();
    req.language_code = Some("xy".to_string());
    let result = validate_at(&req, now());
    let messages: Vec<_> = result.messages_for("languageCode").collect();
    assert_eq!(messages, vec!["Language code must be 'es' or 'en'."]);
}

#[test]
fn test_language_code_too_long_reports_both_rules() {
    let mut req = valid_request();
    req.language_code = Some("english".to_string());
    let result = validate_at(&req, now());
    let messages: Vec<_> = result.messages_for("languageCode").collect();
    assert_eq!(
        messages,
        vec![
            "Language code cannot exceed 2 characters.",
            "Language code must be 'es' or 'en'."
        ]
    );
}

#[test]
fn test_language_code_required() {
    for code in [None, Some("")] {
        let mut req = valid_request();
        req.language_code = code.map(str::to_string);
        let result = validate_at(&req, now());
        let messages: Vec<_> = result.messages_for("languageCode").collect();
        assert_eq!(messages, vec!["Language code is required."]);
    }
}

#[test]
fn test_language_code_is_case_sensitive() {
    let mut req = valid_request();
    req.language_code = Some("ES".to_string());
    assert!(validate_at(&req, now()).has_error_for("languageCode"));
}

#[test]
fn test_scheduled_at_in_past() {
    let mut req = valid_request();
    req.scheduled_at = Some((now() - Duration::minutes(1)).fixed_offset());
    let result = validate_at(&req, now());
    let messages: Vec<_> = result.messages_for("scheduledAt").collect();
    assert_eq!(messages, vec!["Date and time must be in the future."]);
}

#[test]
fn test_scheduled_at_equal_to_now_rejected() {
    let mut req = valid_request();
    req.scheduled_at = Some(now().fixed_offset());
    assert!(validate_at(&req, now()).has_error_for("scheduledAt"));
}

#[test]
fn test_scheduled_at_compared_across_offsets() {
    let mut req = valid_request();
    // 13:30 at +02:00 is 11:30 UTC, before now
    req.scheduled_at = Some(DateTime::parse_from_rfc3339("2026-10-19T13:30:00+02:00").unwrap());
    assert!(validate_at(&req, now()).has_error_for("scheduledAt"));
}

#[test]
fn test_scheduled_at_required() {
    let zero = DateTime::parse_from_rfc3339("0001-01-01T00:00:00Z").unwrap();
    for at in [None, Some(zero)] {
        let mut req = valid_request();
        req.scheduled_at = at;
        let result = validate_at(&req, now());
        let messages: Vec<_> = result.messages_for("scheduledAt").collect();
        assert_eq!(messages, vec!["Date and time are required."]);
    }
}

#[test]
fn test_all_violations_collected_in_field_order() {
    let result = validate_at(&SendMessageRequest::default(), now());
    let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        vec!["patientName", "phoneNumber", "languageCode", "scheduledAt"]
    );
}
