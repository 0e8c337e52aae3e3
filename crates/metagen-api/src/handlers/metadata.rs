//! Metadata generation handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};
use metagen_models::{MetadataRecord, MetadataRequest};

use crate::error::ApiResult;
use crate::middleware::RequestId;
use crate::state::AppState;

/// `POST /generate-video-metadata`
///
/// The body is read raw so that malformed JSON is reported as a missing
/// `video_url` instead of an extractor rejection.
pub async fn generate_video_metadata(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Bytes,
) -> ApiResult<Json<MetadataRecord>> {
    let request = MetadataRequest::from_body(&body);
    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();

    let record = state.metadata.generate(&request, &request_id).await?;
    Ok(Json(record))
}
