use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "~/.appointment-notify/config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub sms: AzureSmsConfig,
    pub whatsapp: UltramsgConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub token_port: u16,
    pub provider_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8091,
            token_port: 8092,
            provider_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub secret_key: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "appointment-notify".to_string(),
            audience: "appointment-notify-clients".to_string(),
            secret_key: None,
        }
    }
}

/// Azure Communication Services SMS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSmsConfig {
    /// `endpoint=https://<resource>.communication.azure.com/;accesskey=<base64 key>`
    pub connection_string: Option<String>,
    pub sender_phone_number: Option<String>,
    pub api_version: String,
}

impl Default for AzureSmsConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            sender_phone_number: None,
            api_version: "2021-03-07".to_string(),
        }
    }
}

/// Ultramsg WhatsApp gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UltramsgConfig {
    pub base_url: String,
    pub instance_id: Option<String>,
    pub token: Option<String>,
}

impl Default for UltramsgConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.ultramsg.com/".to_string(),
            instance_id: None,
            token: None,
        }
    }
}

impl Config {
    pub fn jwt_secret(&self) -> Result<&str, ConfigError> {
        required(self.jwt.secret_key.as_deref(), "jwt.secret_key")
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn token_server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.token_port)
    }
}

pub(crate) fn required<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn resolve_config_path() -> PathBuf {
    env::var("NOTIFY_CONFIG")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| expand_tilde(DEFAULT_CONFIG_PATH))
}

/// Reads the JSON config file, falling back to defaults when it is absent or unreadable.
pub fn load_config_file(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<Config>(&raw) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("ignoring unparsable config {}: {err}", path.display());
                Config::default()
            }
        },
        Err(err) => {
            warn!("cannot read config {}: {err}", path.display());
            Config::default()
        }
    }
}

/// Applies `NOTIFY_*` overrides. Blank values are ignored.
pub fn apply_overrides<F>(mut cfg: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("NOTIFY_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = get("NOTIFY_PORT") {
        match port.parse() {
            Ok(port) => cfg.server.port = port,
            Err(_) => warn!("ignoring invalid NOTIFY_PORT '{port}'"),
        }
    }
    if let Some(port) = get("NOTIFY_TOKEN_PORT") {
        match port.parse() {
            Ok(port) => cfg.server.token_port = port,
            Err(_) => warn!("ignoring invalid NOTIFY_TOKEN_PORT '{port}'"),
        }
    }
    if let Some(issuer) = get("NOTIFY_JWT_ISSUER") {
        cfg.jwt.issuer = issuer;
    }
    if let Some(audience) = get("NOTIFY_JWT_AUDIENCE") {
        cfg.jwt.audience = audience;
    }
    if let Some(secret) = get("NOTIFY_JWT_SECRET") {
        cfg.jwt.secret_key = Some(secret);
    }
    if let Some(conn) = get("NOTIFY_SMS_CONNECTION_STRING") {
        cfg.sms.connection_string = Some(conn);
    }
    if let Some(sender) = get("NOTIFY_SMS_SENDER") {
        cfg.sms.sender_phone_number = Some(sender);
    }
    if let Some(url) = get("NOTIFY_WHATSAPP_BASE_URL") {
        cfg.whatsapp.base_url = url;
    }
    if let Some(instance) = get("NOTIFY_WHATSAPP_INSTANCE_ID") {
        cfg.whatsapp.instance_id = Some(instance);
    }
    if let Some(token) = get("NOTIFY_WHATSAPP_TOKEN") {
        cfg.whatsapp.token = Some(token);
    }

    cfg
}

pub fn load_config() -> Config {
    let cfg = load_config_file(&resolve_config_path());
    apply_overrides(cfg, |key| env::var(key).ok())
}
