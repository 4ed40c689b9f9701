use actix_web::{web, HttpResponse};

use crate::errors::{ApiError, ApiResult};
use crate::models::SearchParams;
use crate::state::AppState;

/// `GET /search?query=...`
///
/// 200 with the envelope whenever the query is non-empty, even if every store
/// lookup failed; 400 otherwise.
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    let query = params
        .query
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Missing 'query' parameter".to_string()))?;

    let options = state.search.options_for(&params);
    let envelope = state.search.search(query, options).await?;

    Ok(HttpResponse::Ok().json(envelope))
}
