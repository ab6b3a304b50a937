use std::{any::Any, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    config::AppConfig,
    error::ServiceError,
    model::{Diagnostics, GenerationRequest, GenerationResponse},
    provider::ImageProvider,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<dyn ImageProvider>,
}

pub fn build_router(config: Arc<AppConfig>, provider: Arc<dyn ImageProvider>) -> Router {
    let state = AppState { config, provider };

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/generate",
            get(diagnostics)
                .post(generate)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

async fn diagnostics(State(state): State<AppState>) -> Json<Diagnostics> {
    Json(Diagnostics {
        ok: true,
        has_api_key: state.config.has_api_key(),
        provider: state.provider.kind().as_str(),
        model: state.provider.model().to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn generate(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GenerationResponse>, ServiceError> {
    let Some(api_key) = state.config.api_key.as_ref() else {
        let var = state.config.provider.api_key_env();
        error!(var, "refusing generation request, provider key is not configured");
        return Err(ServiceError::MissingServerConfig(var));
    };

    // Oversized or unreadable bodies surface as `{error}` like every other failure.
    let body = body.map_err(|rejection| ServiceError::BadRequest(rejection.body_text()))?;
    let request = GenerationRequest::from_body(&body)?;
    let prompt = request.validate()?;

    info!(
        provider = %state.provider.kind(),
        prompt_len = prompt.len(),
        "generating image"
    );

    let image_base64 = state.provider.generate(api_key, prompt, &request).await?;
    Ok(Json(GenerationResponse { image_base64 }))
}

async fn method_not_allowed() -> ServiceError {
    ServiceError::MethodNotAllowed
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "Unexpected server error".to_string());
    error!(%detail, "handler panicked");
    ServiceError::Internal(detail).into_response()
}
