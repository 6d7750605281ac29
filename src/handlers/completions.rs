//! Completion dispatch handler.
//!
//! Implements `POST /api/process/`, the single protected endpoint. The auth
//! middleware has already validated the caller's key by the time this
//! handler runs.

use axum::{Json, extract::State};

use crate::{
    error::AppError,
    models::completion::{CompletionRequest, CompletionResponse},
    services::dispatch_service,
    state::AppState,
};

/// Dispatch a completion request to its upstream provider.
///
/// # Endpoint
///
/// `POST /api/process/`
///
/// # Authentication
///
/// Requires a valid key in the `api-key` header (enforced by middleware).
///
/// # Request Body
///
/// ```json
/// {
///   "model": "gpt-4o",
///   "prompt": "Say hi",
///   "system_prompt": "You are a helpful assistant.",
///   "max_tokens": 150
/// }
/// ```
///
/// # Responses
///
/// - **200**: `{model, response, total_tokens}` with `total_tokens` null
///   when the upstream reported no usage
/// - **400**: `max_tokens` is 0
/// - **404**: model not in the provider registry
/// - **4xx/5xx passthrough**: upstream answered with that status; its body
///   is relayed in the error message
/// - **500**: upstream unreachable, or answered 2xx with an unusable payload
pub async fn process_completion(
    State(state): State<AppState>,
    Json(request): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    if request.max_tokens == 0 {
        return Err(AppError::InvalidRequest(
            "max_tokens must be positive".to_string(),
        ));
    }

    let result = dispatch_service::dispatch(&state.registry, &state.http, &request).await?;

    Ok(Json(result))
}
