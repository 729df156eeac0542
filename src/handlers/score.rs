use axum::{Json, extract::rejection::JsonRejection};
use crate::error::FusionError;
use crate::score::{ScoreRequest, ScoreResponse, score_route};

pub async fn score_handler(
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, FusionError> {
    let request = match payload {
        Ok(Json(request)) => request,
        // a body-less call scores an empty route
        Err(JsonRejection::MissingJsonContentType(_)) => ScoreRequest::default(),
        Err(e) => return Err(FusionError::Validation(e.body_text())),
    };
    Ok(Json(ScoreResponse {
        radar: score_route(&request.route),
    }))
}
