use crate::config::Config;
use crate::errors::AppError;
use crate::models::{CustomerCreationRequest, FormSubmission, SubmissionResult};
use crate::note::ApplicationNote;
use crate::shopify_client::ShopifyClient;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the Shopify Admin API.
    pub shopify: ShopifyClient,
}

impl AppState {
    /// Builds the state from configuration.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let shopify = ShopifyClient::new(&config)?;
        Ok(Self { config, shopify })
    }
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Wholesale signup endpoint (every method lands here).
///
/// Flow:
/// 1. OPTIONS: answer the preflight with an empty 200.
/// 2. Anything but POST: 405.
/// 3. Parse and validate the form.
/// 4. Build the review note and the Shopify customer payload.
/// 5. Create the customer in Shopify (single call, no retry).
///
/// CORS headers are added by the router for every response.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `method` - Request method.
/// * `body` - Raw request body, parsed here so parse failures share the error shape.
///   A body that could not be read (over the size limit, aborted) only matters for POST.
///
/// # Returns
///
/// * `Result<Response, AppError>` - The response or an error.
pub async fn submit_application(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let body = body.map_err(|rejection| AppError::UnreadableBody {
        status: rejection.status(),
        reason: rejection.body_text(),
    })?;
    let result = create_wholesale_customer(&state, &body).await?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

/// Handles a POSTed signup form end to end.
pub async fn create_wholesale_customer(
    state: &AppState,
    body: &[u8],
) -> Result<SubmissionResult, AppError> {
    let submission: FormSubmission = serde_json::from_slice(body)?;
    let application = submission.validate()?;

    tracing::info!(
        "📨 Wholesale application received: company={}, email={}",
        application.company,
        application.email
    );

    let now = Utc::now();
    let note = ApplicationNote::build(&application, now);
    let request = CustomerCreationRequest::new(&application, note, now);

    let customer_id = state.shopify.create_customer(&request).await.into_result()?;

    tracing::info!(
        "✅ Wholesale application stored as Shopify customer {}",
        customer_id
    );

    Ok(SubmissionResult::created(customer_id))
}
