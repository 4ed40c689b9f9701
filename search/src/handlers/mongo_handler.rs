use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::document_db::{DocumentFilter, FindOptions};
use crate::errors::ApiResult;
use crate::models::CollectionParams;
use crate::state::AppState;

const DEFAULT_COLLECTION: &str = "products";
const DEFAULT_LIMIT: i64 = 10;

/// `GET /mongo/products?limit=10&collection=products` (also served as `/products`)
pub async fn list_documents(
    state: web::Data<AppState>,
    params: web::Query<CollectionParams>,
) -> ApiResult<HttpResponse> {
    let collection = params
        .collection
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COLLECTION);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).max(0);

    let data = state
        .documents
        .find(collection, &DocumentFilter::All, &FindOptions::default().limit(limit))
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "ok": true,
        "count": data.len(),
        "data": data
    })))
}
