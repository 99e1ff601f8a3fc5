use super::common::{map_service_error, no_content_response, success_response, PaginationParams};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};
use tracing::info;
use uuid::Uuid;

/// Creates the router for locally imported production orders
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/by-external-id/{external_id}", get(get_order_by_external_id))
        .route("/{id}", get(get_order))
        .route("/{id}", delete(delete_order))
}

/// List imported orders with pagination
async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let (orders, total) = state
        .services
        .orders
        .list_orders(page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "orders": orders,
        "total": total,
        "page": page,
        "per_page": per_page
    })))
}

/// Get an imported order by ID, lines included
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_order = state
        .services
        .orders
        .get_order(order_id)
        .await
        .map_err(map_service_error)?;

    if let Some(order) = maybe_order {
        Ok(success_response(order))
    } else {
        Err(ApiError::NotFound(format!(
            "Order with ID {} not found",
            order_id
        )))
    }
}

/// Get an imported order by its source-system identifier, lines included
async fn get_order_by_external_id(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_order = state
        .services
        .orders
        .find_by_external_id(&external_id)
        .await
        .map_err(map_service_error)?;

    if let Some(order) = maybe_order {
        Ok(success_response(order))
    } else {
        Err(ApiError::NotFound(format!(
            "Order with external id {} not found",
            external_id
        )))
    }
}

/// Delete an imported order and its lines
async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .orders
        .delete_order(order_id)
        .await
        .map_err(map_service_error)?;

    info!("Order deleted: {}", order_id);

    Ok(no_content_response())
}
