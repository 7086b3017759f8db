pub mod auth;
pub mod channels;
pub mod config;
pub mod error;
pub mod extract;
pub mod message;
pub mod types;
pub mod validation;

pub use config::Config;

use self::auth::JwtService;
use self::channels::{AzureSmsChannel, NotificationChannel, UltramsgChannel};
use self::error::ApiError;
use self::extract::SendBody;
use self::types::{
    FieldError, HealthResponse, SendMessageRequest, SendMessageResponse, TokenQuery, TokenResponse,
    ValidationResult,
};

use anyhow::Context;
use axum::{
    extract::{Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

#[derive(OpenApi)]
#[openapi(
    info(title = "Appointment notification API"),
    paths(send_sms, send_whatsapp, health),
    components(schemas(
        SendMessageRequest,
        SendMessageResponse,
        ValidationResult,
        FieldError,
        HealthResponse
    )),
    modifiers(&BearerAuth),
    tags((name = "notifications", description = "Appointment reminders over SMS and WhatsApp"))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jwt: JwtService,
    pub sms: Arc<dyn NotificationChannel>,
    pub whatsapp: Arc<dyn NotificationChannel>,
}

pub fn build_http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.provider_timeout_seconds))
        .build()
        .context("failed to build provider HTTP client")
}

/// Builds the notification API from a loaded configuration.
pub fn create_app(config: Config) -> anyhow::Result<(AppState, Router)> {
    let http = build_http_client(&config)?;
    let jwt = JwtService::from_config(&config).context("JWT settings are incomplete")?;
    let sms = AzureSmsChannel::from_config(http.clone(), &config.sms)
        .context("SMS provider settings are incomplete")?;
    let whatsapp = UltramsgChannel::from_config(http, &config.whatsapp)
        .context("WhatsApp gateway settings are incomplete")?;

    let state = AppState {
        config,
        jwt,
        sms: Arc::new(sms),
        whatsapp: Arc::new(whatsapp),
    };
    Ok((state.clone(), notification_router(state)))
}

pub fn notification_router(state: AppState) -> Router {
    let authed_routes = Router::new()
        .route("/v1/sms/send", post(send_sms))
        .route("/v1/whatsapp/send", post(send_whatsapp))
        .layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth::require_bearer,
        ));

    let public_routes = Router::new()
        .route("/v1/health", get(health))
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()));

    Router::new()
        .merge(authed_routes)
        .merge(public_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Builds the demo token service.
pub fn create_token_app(config: &Config) -> anyhow::Result<Router> {
    let jwt = JwtService::from_config(config).context("JWT settings are incomplete")?;
    Ok(token_router(jwt))
}

pub fn token_router(jwt: JwtService) -> Router {
    Router::new()
        .route("/v1/token", get(issue_token))
        .route("/v1/health", get(health))
        .with_state(jwt)
        .layer(TraceLayer::new_for_http())
}

#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "notifications",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/v1/sms/send",
    tag = "notifications",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Reminder handed to the SMS provider", body = SendMessageResponse),
        (status = 400, description = "Request failed validation", body = ValidationResult),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Rendering or provider failure", body = String)
    ),
    security(("bearer" = []))
)]
async fn send_sms(
    State(state): State<AppState>,
    SendBody(req): SendBody,
) -> Result<Json<SendMessageResponse>, ApiError> {
    deliver(state.sms.as_ref(), req).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/v1/whatsapp/send",
    tag = "notifications",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Reminder handed to the WhatsApp gateway", body = SendMessageResponse),
        (status = 400, description = "Request failed validation", body = ValidationResult),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Rendering or provider failure", body = String)
    ),
    security(("bearer" = []))
)]
async fn send_whatsapp(
    State(state): State<AppState>,
    SendBody(req): SendBody,
) -> Result<Json<SendMessageResponse>, ApiError> {
    deliver(state.whatsapp.as_ref(), req).await.map(Json)
}

/// Validates the request, renders the reminder and hands it to `channel` once.
pub async fn deliver(
    channel: &dyn NotificationChannel,
    req: SendMessageRequest,
) -> Result<SendMessageResponse, ApiError> {
    let result = validation::validate(&req);
    if !result.is_valid() {
        debug!("{} request rejected with {} errors", channel.name(), result.errors.len());
        return Err(ApiError::Validation(result));
    }

    let (Some(name), Some(phone), Some(language), Some(scheduled_at)) = (
        req.patient_name,
        req.phone_number,
        req.language_code,
        req.scheduled_at,
    ) else {
        error!("{} request passed validation with missing fields", channel.name());
        return Err(ApiError::Internal);
    };

    let text = message::render(&name, &language, scheduled_at).map_err(|err| {
        error!("{} reminder rendering failed: {err}", channel.name());
        ApiError::from(err)
    })?;

    let sent = channel.send(&phone, &text).await.map_err(|err| {
        error!("{} delivery failed: {err}", channel.name());
        ApiError::from(err)
    })?;

    info!("{} reminder handed to provider, sent={sent}", channel.name());
    Ok(SendMessageResponse {
        is_message_sent: sent,
    })
}

async fn issue_token(
    State(jwt): State<JwtService>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = query
        .user
        .filter(|u| !u.trim().is_empty())
        .ok_or(ApiError::Unauthenticated)?;

    let token = jwt.issue(&user).map_err(|err| {
        error!("token signing failed: {err}");
        ApiError::Internal
    })?;
    Ok(Json(TokenResponse { token }))
}
