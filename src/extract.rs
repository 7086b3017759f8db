use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::types::{SendMessageRequest, ValidationResult};

/// JSON body of the send endpoints. Bodies that cannot be read become a 400
/// validation response instead of axum's default rejection.
#[derive(Debug, Clone)]
pub struct SendBody(pub SendMessageRequest);

#[async_trait]
impl<S> FromRequest<S> for SendBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!("unreadable send body: {rejection}");
                let mut result = ValidationResult::default();
                result.push("body", "Request body must be a JSON object.");
                ApiError::Validation(result)
            })?;

        SendMessageRequest::from_json(&value)
            .map(SendBody)
            .map_err(|result| {
                debug!("send body rejected with {} decode errors", result.errors.len());
                ApiError::Validation(result)
            })
    }
}
