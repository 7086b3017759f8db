use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::NotificationChannel;
use crate::config::{required, UltramsgConfig};
use crate::error::ProviderError;

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Raw answer of the gateway's chat endpoint.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub body: String,
}

impl GatewayResponse {
    /// The gateway acknowledges a message with a 200 and a non-empty body.
    pub fn is_delivered(&self) -> bool {
        self.status == StatusCode::OK && !self.body.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct UltramsgChannel {
    client: Client,
    chat_url: String,
    token: String,
}

impl UltramsgChannel {
    pub fn from_config(client: Client, cfg: &UltramsgConfig) -> Result<Self, ProviderError> {
        let instance_id = required(cfg.instance_id.as_deref(), "whatsapp.instance_id")?;
        let token = required(cfg.token.as_deref(), "whatsapp.token")?;
        if cfg.base_url.trim().is_empty() {
            return Err(ProviderError::InvalidConfig("whatsapp.base_url is empty".to_string()));
        }
        Ok(Self {
            client,
            chat_url: chat_url(&cfg.base_url, instance_id),
            token: token.to_string(),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub async fn send_raw(&self, to: &str, body: &str) -> Result<GatewayResponse, ProviderError> {
        debug!("posting whatsapp message to {}", self.chat_url);
        let resp = self
            .client
            .post(&self.chat_url)
            .form(&[("token", self.token.as_str()), ("to", to), ("body", body)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        Ok(GatewayResponse { status, body })
    }
}

#[async_trait]
impl NotificationChannel for UltramsgChannel {
    fn name(&self) -> &'static str {
        "whatsapp"
    }

    async fn send(&self, phone_number: &str, message: &str) -> Result<bool, ProviderError> {
        let response = self.send_raw(phone_number, message).await?;
        if !response.is_delivered() {
            debug!(
                "whatsapp gateway did not acknowledge message: status {} body {:?}",
                response.status, response.body
            );
        }
        Ok(response.is_delivered())
    }
}

pub fn chat_url(base_url: &str, instance_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let instance = utf8_percent_encode(instance_id.trim(), PATH_SEGMENT);
    format!("{base}/{instance}/messages/chat")
}
