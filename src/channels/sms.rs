//! SMS delivery through the Azure Communication Services REST API.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use super::NotificationChannel;
use crate::config::{required, AzureSmsConfig};
use crate::error::ProviderError;

type HmacSha256 = Hmac<Sha256>;

const SIGNED_HEADERS: &str = "x-ms-date;host;x-ms-content-sha256";

/// Endpoint and decoded access key taken from an ACS connection string.
#[derive(Debug, Clone)]
pub struct AcsCredentials {
    pub endpoint: Url,
    pub access_key: Vec<u8>,
}

/// Parses `endpoint=https://...;accesskey=<base64>`. Keys are case-insensitive.
pub fn parse_connection_string(raw: &str) -> Result<AcsCredentials, ProviderError> {
    let mut endpoint = None;
    let mut access_key = None;
    for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, value)) = part.split_once('=') else {
            return Err(ProviderError::InvalidConfig(format!(
                "malformed connection string segment '{part}'"
            )));
        };
        match key.trim().to_lowercase().as_str() {
            "endpoint" => endpoint = Some(value.trim()),
            "accesskey" => access_key = Some(value.trim()),
            _ => {}
        }
    }

    let endpoint = endpoint
        .ok_or_else(|| ProviderError::InvalidConfig("connection string has no endpoint".to_string()))?;
    let access_key = access_key
        .ok_or_else(|| ProviderError::InvalidConfig("connection string has no accesskey".to_string()))?;

    let mut endpoint = Url::parse(endpoint)
        .map_err(|e| ProviderError::InvalidConfig(format!("invalid endpoint: {e}")))?;
    if endpoint.host_str().is_none() {
        return Err(ProviderError::InvalidConfig("endpoint has no host".to_string()));
    }
    if !endpoint.path().ends_with('/') {
        let path = format!("{}/", endpoint.path());
        endpoint.set_path(&path);
    }
    let access_key = STANDARD
        .decode(access_key)
        .map_err(|e| ProviderError::InvalidConfig(format!("accesskey is not base64: {e}")))?;

    Ok(AcsCredentials {
        endpoint,
        access_key,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SmsSendRequest<'a> {
    from: &'a str,
    sms_recipients: Vec<SmsRecipient<'a>>,
    message: &'a str,
    sms_send_options: SmsSendOptions,
}

#[derive(Debug, Serialize)]
struct SmsRecipient<'a> {
    to: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SmsSendOptions {
    enable_delivery_report: bool,
}

#[derive(Debug, Deserialize)]
struct SmsSendResponse {
    value: Vec<SmsSendResult>,
}

/// Per-recipient outcome reported by ACS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsSendResult {
    pub to: String,
    pub message_id: Option<String>,
    pub http_status_code: u16,
    pub successful: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AzureSmsChannel {
    client: Client,
    credentials: AcsCredentials,
    sender: String,
    api_version: String,
}

impl AzureSmsChannel {
    pub fn from_config(client: Client, cfg: &AzureSmsConfig) -> Result<Self, ProviderError> {
        let connection_string = required(cfg.connection_string.as_deref(), "sms.connection_string")?;
        let sender = required(cfg.sender_phone_number.as_deref(), "sms.sender_phone_number")?;
        Ok(Self {
            client,
            credentials: parse_connection_string(connection_string)?,
            sender: sender.to_string(),
            api_version: cfg.api_version.clone(),
        })
    }

    pub fn send_url(&self) -> Result<Url, ProviderError> {
        let mut url = self
            .credentials
            .endpoint
            .join("sms")
            .map_err(|e| ProviderError::InvalidConfig(format!("invalid endpoint: {e}")))?;
        url.query_pairs_mut().append_pair("api-version", &self.api_version);
        Ok(url)
    }

    pub async fn send_detailed(&self, to: &str, message: &str) -> Result<SmsSendResult, ProviderError> {
        let url = self.send_url()?;
        let body = serde_json::to_vec(&SmsSendRequest {
            from: &self.sender,
            sms_recipients: vec![SmsRecipient { to }],
            message,
            sms_send_options: SmsSendOptions {
                enable_delivery_report: false,
            },
        })
        .map_err(|e| ProviderError::InvalidResponse(format!("cannot encode request: {e}")))?;

        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let content_hash = content_hash(&body);
        let signature = sign(
            &self.credentials.access_key,
            "POST",
            &path_and_query(&url),
            &date,
            &host_header(&url),
            &content_hash,
        )?;

        debug!("posting sms to {}", url);
        let resp = self
            .client
            .post(url)
            .header("x-ms-date", date)
            .header("x-ms-content-sha256", content_hash)
            .header(
                AUTHORIZATION,
                format!("HMAC-SHA256 SignedHeaders={SIGNED_HEADERS}&Signature={signature}"),
            )
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(err) => {
                    debug!("could not read sms rejection body: {err}");
                    String::new()
                }
            };
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SmsSendResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        parsed
            .value
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("no recipient result in response".to_string()))
    }
}

#[async_trait]
impl NotificationChannel for AzureSmsChannel {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn send(&self, phone_number: &str, message: &str) -> Result<bool, ProviderError> {
        let result = self.send_detailed(phone_number, message).await?;
        if !result.successful {
            debug!(
                "sms to {} not accepted: {}",
                result.to,
                result.error_message.as_deref().unwrap_or("no reason given")
            );
        }
        Ok(result.successful)
    }
}

pub fn content_hash(body: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(body))
}

/// Computes the ACS request signature over method, path, date, host and body hash.
pub fn sign(
    key: &[u8],
    method: &str,
    path_and_query: &str,
    date: &str,
    host: &str,
    content_hash: &str,
) -> Result<String, ProviderError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| ProviderError::InvalidConfig("invalid access key".to_string()))?;
    mac.update(format!("{method}\n{path_and_query}\n{date};{host};{content_hash}").as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}
