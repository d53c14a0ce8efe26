//! Annotation creation endpoint

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::bridge::annotations::{self, CreatedAnnotation};
use crate::error::Result;
use crate::request::NormalizedBody;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateAnnotationResponse {
    pub success: bool,
    pub annotation: CreatedAnnotation,
}

/// POST /mcp/annotations
pub async fn create_annotation(
    State(state): State<AppState>,
    NormalizedBody(request): NormalizedBody,
) -> Result<(StatusCode, Json<CreateAnnotationResponse>)> {
    let annotation = state
        .run(annotations::create_annotation(state.scope(), &request))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAnnotationResponse {
            success: true,
            annotation,
        }),
    ))
}
