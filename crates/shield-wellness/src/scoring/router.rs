use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::{InputError, ScoreRequest};
use super::service::ScoringService;
use crate::advice::SuggestionProvider;

/// Router builder exposing the scoring endpoint.
pub fn scoring_router<P>(service: Arc<ScoringService<P>>) -> Router
where
    P: SuggestionProvider + 'static,
{
    Router::new()
        .route("/api/v1/sleep-score", post(score_handler::<P>))
        .with_state(service)
}

pub(crate) async fn score_handler<P>(
    State(service): State<Arc<ScoringService<P>>>,
    payload: Result<axum::Json<ScoreRequest>, JsonRejection>,
) -> Response
where
    P: SuggestionProvider + 'static,
{
    let request = match payload {
        Ok(axum::Json(request)) => request,
        Err(rejection) => {
            let error = InputError::Malformed {
                detail: rejection.body_text(),
            };
            return validation_failure(&error);
        }
    };

    match service.score(request).await {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => validation_failure(&error),
    }
}

fn validation_failure(error: &InputError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}
