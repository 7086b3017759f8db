pub mod sms;
pub mod whatsapp;

use async_trait::async_trait;

use crate::error::ProviderError;

/// An outbound provider able to deliver a text to a phone number.
///
/// `Ok(false)` means the provider answered but did not accept the message;
/// transport and protocol failures are errors.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, phone_number: &str, message: &str) -> Result<bool, ProviderError>;
}

pub use sms::AzureSmsChannel;
pub use whatsapp::UltramsgChannel;
