use axum::{
    routing::{get, post},
    Router,
    extract::{rejection::JsonRejection, Json, State},
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::services::ServeDir;
use std::time::Instant;
use tracing::{error, info};

use crate::error::{AppError, Result};
use crate::api::models::AnalyzeRequest;
use crate::api::response;
use crate::report::{reduce, ReducedResponse};
use crate::AppState;

pub const LIVENESS_MESSAGE: &str = "Lighthouse Analyzer API is running";

pub fn create_router(app_state: AppState) -> Router {
    let public_dir = ServeDir::new(&app_state.config.public_dir);

    Router::new()
        .route("/", get(root_handler))
        .route("/analyze", post(analyze_handler))
        .fallback_service(public_dir)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn root_handler() -> &'static str {
    LIVENESS_MESSAGE
}

async fn analyze_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let err = AppError::InvalidRequest(rejection.body_text());
            error!(error = %err, "rejected analyze request");
            return response::error(&err, state.config.development).into_response();
        }
    };

    info!(url = %req.url, "processing analyze request");
    let start_time = Instant::now();

    let result = process_analyze_request(&state, &req).await;
    let elapsed = start_time.elapsed();

    match result {
        Ok(reduced) => {
            info!(url = %req.url, ?elapsed, "analysis complete");
            response::success(reduced).into_response()
        }
        Err(err) => {
            error!(url = %req.url, ?elapsed, error = %err, "analysis failed");
            response::error(&err, state.config.development).into_response()
        }
    }
}

async fn process_analyze_request(
    state: &AppState,
    req: &AnalyzeRequest,
) -> Result<ReducedResponse> {
    let report = state.invoker.run_audit(&req.url).await?;
    reduce(&report)
}
