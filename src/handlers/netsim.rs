use super::common::{created_response, map_service_error, success_response};
use crate::{
    errors::{ApiError, ServiceError},
    handlers::AppState,
    netsim::{BridgeError, BridgeStatus},
    services::netsim_import::ImportOutcome,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Creates the router for NetSim bridge endpoints
pub fn netsim_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(bridge_status))
        .route("/connect", post(connect))
        .route("/database/files", get(list_database_files))
        .route("/orders", get(list_orders))
        .route("/orders/count", get(order_count))
        .route("/orders/new", get(new_orders))
        .route("/orders/{order_no}", get(get_order))
        .route("/orders/{order_no}/lines", get(order_lines))
        .route("/orders/{order_no}/delivery-date", put(update_delivery_date))
        .route("/orders/{order_no}/import", post(import_order))
        .route("/customers/{customer_no}", get(get_customer))
        .route("/products/{stock_no}", get(get_product))
        .route("/products/{stock_no}/recipe", get(product_recipe))
        .route("/recipes", get(list_recipes))
        .route("/recipes/count", get(recipe_count))
        .route("/recipes/{recipe_no}/revisions", get(recipe_revisions))
        .route("/recipes/{recipe_no}/details", get(recipe_details_by_recipe))
        .route("/revisions/{revision_no}/details", get(revision_details))
        .route("/details/{detail_no}/sub-details", get(sub_details))
        .route("/tables", get(tables))
        .route("/tables/{table_name}/columns", get(table_columns))
}

fn map_bridge_error(err: BridgeError) -> ApiError {
    ApiError::ServiceError(ServiceError::from(err))
}

// Request and response DTOs

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub only_open: bool,
}

#[derive(Debug, Deserialize)]
pub struct OrderCountParams {
    #[serde(default)]
    pub only_open: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewOrdersParams {
    #[serde(default = "default_minutes")]
    pub minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct RecipeListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilesParams {
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    pub database_file: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryDateRequest {
    pub delivery_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    pub actor_id: Option<Uuid>,
}

fn default_limit() -> i64 {
    50
}

fn default_minutes() -> i64 {
    60
}

// Handler functions

/// Bridge connectivity probe. Always answers, even with the bridge down.
async fn bridge_status(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let status = match state.services.netsim.status().await {
        Ok(status) => status,
        Err(err) => {
            warn!("Bridge status check failed: {}", err);
            BridgeStatus {
                connected: false,
                current_database: None,
            }
        }
    };
    Ok(success_response(status))
}

/// Open a database through the bridge
async fn connect(
    State(state): State<AppState>,
    payload: Option<Json<ConnectRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let outcome = state
        .services
        .netsim
        .connect(payload.database_file.as_deref())
        .await
        .map_err(map_bridge_error)?;

    info!(
        table_count = ?outcome.table_count,
        "Bridge database connection established"
    );
    Ok(success_response(outcome))
}

/// List database files at the bridge's data directory
async fn list_database_files(
    State(state): State<AppState>,
    Query(params): Query<FilesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let files = state
        .services
        .netsim
        .list_database_files(params.path.as_deref())
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(files))
}

/// List remote orders, newest first
async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .netsim
        .get_orders(params.limit.max(0), params.offset.max(0), params.only_open)
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(orders))
}

/// Count remote orders with the same filter list_orders applies
async fn order_count(
    State(state): State<AppState>,
    Query(params): Query<OrderCountParams>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .services
        .netsim
        .get_order_count(params.only_open)
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(serde_json::json!({ "count": count })))
}

/// Open orders recorded within the given window
async fn new_orders(
    State(state): State<AppState>,
    Query(params): Query<NewOrdersParams>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .netsim
        .get_new_orders(params.minutes.max(0))
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(orders))
}

/// Single remote order header
async fn get_order(
    State(state): State<AppState>,
    Path(order_no): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .netsim
        .get_order(order_no)
        .await
        .map_err(map_bridge_error)?;

    match order {
        Some(order) => Ok(success_response(order)),
        None => Err(ApiError::NotFound(format!("Order {} not found", order_no))),
    }
}

/// Line items of one remote order
async fn order_lines(
    State(state): State<AppState>,
    Path(order_no): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let lines = state
        .services
        .netsim
        .get_order_details(order_no)
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(lines))
}

/// Push a committed delivery date onto a remote order
async fn update_delivery_date(
    State(state): State<AppState>,
    Path(order_no): Path<i64>,
    Json(payload): Json<DeliveryDateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .netsim
        .update_delivery_date(order_no, payload.delivery_date)
        .await
        .map_err(map_bridge_error)?;

    info!(order_no, "Delivery date updated on remote order");
    Ok(success_response(serde_json::json!({
        "message": "Delivery date updated"
    })))
}

/// Import a remote order into the local store
async fn import_order(
    State(state): State<AppState>,
    Path(order_no): Path<i64>,
    payload: Option<Json<ImportRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let order = state
        .services
        .netsim
        .get_order(order_no)
        .await
        .map_err(map_bridge_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Order {} not found", order_no)))?;

    let lines = state
        .services
        .netsim
        .get_order_details(order_no)
        .await
        .map_err(map_bridge_error)?;

    let outcome = state
        .services
        .import
        .import_order(&order, &lines, payload.actor_id)
        .await
        .map_err(map_service_error)?;

    match outcome {
        ImportOutcome::Imported {
            order_id,
            line_count,
        } => {
            info!(order_no, %order_id, line_count, "Remote order imported");
            Ok(created_response(serde_json::json!({
                "id": order_id,
                "lines": line_count,
                "message": "Order imported successfully"
            })))
        }
        ImportOutcome::AlreadyImported { order_id } => Ok((
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "id": order_id,
                "message": "Order already imported"
            })),
        )
            .into_response()),
    }
}

/// Single remote customer record
async fn get_customer(
    State(state): State<AppState>,
    Path(customer_no): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .services
        .netsim
        .get_customer(customer_no)
        .await
        .map_err(map_bridge_error)?;

    match customer {
        Some(customer) => Ok(success_response(customer)),
        None => Err(ApiError::NotFound(format!(
            "Customer {} not found",
            customer_no
        ))),
    }
}

/// Single remote stock record
async fn get_product(
    State(state): State<AppState>,
    Path(stock_no): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .netsim
        .get_product(stock_no)
        .await
        .map_err(map_bridge_error)?;

    match product {
        Some(product) => Ok(success_response(product)),
        None => Err(ApiError::NotFound(format!(
            "Product {} not found",
            stock_no
        ))),
    }
}

/// Recipe lines of the first recipe referencing a stock
async fn product_recipe(
    State(state): State<AppState>,
    Path(stock_no): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let lines = state
        .services
        .netsim
        .get_product_recipe(stock_no)
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(lines))
}

/// List remote recipes by code, optionally searched
async fn list_recipes(
    State(state): State<AppState>,
    Query(params): Query<RecipeListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let recipes = state
        .services
        .netsim
        .get_recipes(
            params.limit.max(0),
            params.offset.max(0),
            params.search.as_deref(),
        )
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(recipes))
}

async fn recipe_count(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let count = state
        .services
        .netsim
        .get_recipe_count()
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(serde_json::json!({ "count": count })))
}

/// Revisions of one recipe, default-first
async fn recipe_revisions(
    State(state): State<AppState>,
    Path(recipe_no): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let revisions = state
        .services
        .netsim
        .get_recipe_revisions(recipe_no)
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(revisions))
}

/// Lines of a recipe's default revision
async fn recipe_details_by_recipe(
    State(state): State<AppState>,
    Path(recipe_no): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let details = state
        .services
        .netsim
        .get_recipe_details_by_recipe_no(recipe_no)
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(details))
}

/// Lines of one revision
async fn revision_details(
    State(state): State<AppState>,
    Path(revision_no): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let details = state
        .services
        .netsim
        .get_recipe_details(revision_no)
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(details))
}

/// Sub-components of one recipe line
async fn sub_details(
    State(state): State<AppState>,
    Path(detail_no): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let subs = state
        .services
        .netsim
        .get_recipe_sub_details(detail_no)
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(subs))
}

/// Remote user table names
async fn tables(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tables = state
        .services
        .netsim
        .get_tables()
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(tables))
}

/// Column descriptors of one remote table
async fn table_columns(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let columns = state
        .services
        .netsim
        .get_table_columns(&table_name)
        .await
        .map_err(map_bridge_error)?;
    Ok(success_response(columns))
}
