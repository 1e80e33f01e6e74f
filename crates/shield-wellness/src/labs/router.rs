use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use crate::advice::SuggestionProvider;

use super::extractor::LabReportExtractor;
use super::service::LabReportService;

/// Router builder exposing the lab report upload endpoint.
pub fn lab_router<X, P>(service: Arc<LabReportService<X, P>>) -> Router
where
    X: LabReportExtractor + 'static,
    P: SuggestionProvider + 'static,
{
    Router::new()
        .route("/api/v1/lab-report", post(upload_handler::<X, P>))
        .with_state(service)
}

pub(crate) async fn upload_handler<X, P>(
    State(service): State<Arc<LabReportService<X, P>>>,
    mut multipart: Multipart,
) -> Response
where
    X: LabReportExtractor + 'static,
    P: SuggestionProvider + 'static,
{
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let filename = match field.file_name() {
                    Some(name) => name.to_string(),
                    None => return failure(StatusCode::BAD_REQUEST, "A filename is required."),
                };
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((filename, bytes));
                        break;
                    }
                    Err(error) => return failure(error.status(), &error.body_text()),
                }
            }
            Ok(None) => break,
            Err(error) => return failure(error.status(), &error.body_text()),
        }
    }

    let Some((filename, bytes)) = upload else {
        return failure(
            StatusCode::BAD_REQUEST,
            "Upload must include a 'file' field.",
        );
    };
    if !filename.to_ascii_lowercase().ends_with(".pdf") {
        return failure(StatusCode::BAD_REQUEST, "Only PDF files allowed.");
    }

    match service.analyze(filename, &bytes).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => failure(StatusCode::UNPROCESSABLE_ENTITY, &error.to_string()),
    }
}

fn failure(status: StatusCode, detail: &str) -> Response {
    let payload = json!({
        "error": detail,
    });
    (status, axum::Json(payload)).into_response()
}
