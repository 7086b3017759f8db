use appointment_notify::config::{
    apply_overrides, expand_tilde, load_config_file, Config,
};
use appointment_notify::error::ConfigError;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 8091);
    assert_eq!(cfg.server.token_port, 8092);
    assert_eq!(cfg.server.provider_timeout_seconds, 30);
    assert_eq!(cfg.jwt.issuer, "appointment-notify");
    assert_eq!(cfg.jwt.audience, "appointment-notify-clients");
    assert!(cfg.jwt.secret_key.is_none());
    assert!(cfg.sms.connection_string.is_none());
    assert_eq!(cfg.sms.api_version, "2021-03-07");
    assert_eq!(cfg.whatsapp.base_url, "https://api.ultramsg.com/");
    assert!(cfg.whatsapp.instance_id.is_none());
}

#[test]
fn test_jwt_secret_missing() {
    let cfg = Config::default();
    assert_eq!(cfg.jwt_secret(), Err(ConfigError::Missing("jwt.secret_key")));
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let cfg = load_config_file(&dir.path().join("absent.json"));
    assert_eq!(cfg.server.port, 8091);
}

#[test]
fn test_load_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "jwt": {"secret_key": "file-secret"},
            "whatsapp": {"instance_id": "instance42", "token": "tok"}
        }"#,
    )
    .unwrap();

    let cfg = load_config_file(&path);
    assert_eq!(cfg.jwt_secret(), Ok("file-secret"));
    assert_eq!(cfg.jwt.issuer, "appointment-notify");
    assert_eq!(cfg.whatsapp.instance_id.as_deref(), Some("instance42"));
    assert_eq!(cfg.whatsapp.base_url, "https://api.ultramsg.com/");
    assert_eq!(cfg.server.port, 8091);
}

#[test]
fn test_load_invalid_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();
    let cfg = load_config_file(&path);
    assert!(cfg.jwt.secret_key.is_none());
}

#[test]
fn test_env_overrides() {
    let vars: HashMap<&str, &str> = [
        ("NOTIFY_PORT", "9000"),
        ("NOTIFY_TOKEN_PORT", "9001"),
        ("NOTIFY_JWT_ISSUER", "issuer"),
        ("NOTIFY_JWT_AUDIENCE", "audience"),
        ("NOTIFY_JWT_SECRET", "env-secret"),
        ("NOTIFY_SMS_CONNECTION_STRING", "endpoint=https://x/;accesskey=eA=="),
        ("NOTIFY_SMS_SENDER", "+15550001111"),
        ("NOTIFY_WHATSAPP_BASE_URL", "http://localhost:1234/"),
        ("NOTIFY_WHATSAPP_INSTANCE_ID", "instance7"),
        ("NOTIFY_WHATSAPP_TOKEN", "wa-token"),
    ]
    .into_iter()
    .collect();

    let cfg = apply_overrides(Config::default(), |k| vars.get(k).map(|v| v.to_string()));
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.token_port, 9001);
    assert_eq!(cfg.jwt.issuer, "issuer");
    assert_eq!(cfg.jwt.audience, "audience");
    assert_eq!(cfg.jwt_secret(), Ok("env-secret"));
    assert_eq!(
        cfg.sms.connection_string.as_deref(),
        Some("endpoint=https://x/;accesskey=eA==")
    );
    assert_eq!(cfg.sms.sender_phone_number.as_deref(), Some("+15550001111"));
    assert_eq!(cfg.whatsapp.base_url, "http://localhost:1234/");
    assert_eq!(cfg.whatsapp.instance_id.as_deref(), Some("instance7"));
    assert_eq!(cfg.whatsapp.token.as_deref(), Some("wa-token"));
}

#[test]
fn test_env_overrides_win_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"jwt": {"secret_key": "file-secret"}}"#).unwrap();

    let cfg = apply_overrides(load_config_file(&path), |k| {
        (k == "NOTIFY_JWT_SECRET").then(|| "env-secret".to_string())
    });
    assert_eq!(cfg.jwt_secret(), Ok("env-secret"));
}

#[test]
fn test_expand_tilde_no_tilde() {
    let expanded = expand_tilde("/absolute/path");
    assert_eq!(expanded.to_string_lossy(), "/absolute/path");
}
