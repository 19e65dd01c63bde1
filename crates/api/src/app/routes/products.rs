use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_products::validation::{validate_new_product, validate_patch, validate_query};
use stockroom_products::{NewProduct, ProductPatch};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

fn parse_id(raw: &str) -> Result<i64, axum::response::Response> {
    raw.trim().parse::<i64>().map_err(|_| errors::invalid_id())
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let input = match body {
        Ok(Json(body)) => NewProduct::from(body),
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    if let Err(violations) = validate_new_product(&input) {
        return errors::violations_to_response(violations);
    }

    match services.products.create(input).await {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    let query = match params.into_query() {
        Ok(q) => q,
        Err(violations) => return errors::violations_to_response(violations),
    };
    if let Err(violations) = validate_query(&query) {
        return errors::violations_to_response(violations);
    }

    match services.products.find_page(query).await {
        Ok(page) => (StatusCode::OK, Json(dto::page_to_json(page))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.products.find_by_id(id).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = match body {
        Ok(Json(body)) => ProductPatch::from(body),
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    if let Err(violations) = validate_patch(&patch) {
        return errors::violations_to_response(violations);
    }

    match services.products.update(id, patch).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.products.remove(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
