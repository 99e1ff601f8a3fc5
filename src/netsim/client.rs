//! HTTP client for the NetSim bridge service.
//!
//! The bridge is a separate process that holds the actual Firebird
//! connection; this client only ever speaks JSON over HTTP to it. Every
//! public operation is a single request/response round trip, attempted
//! exactly once with no retry, and reports failure as a [`BridgeError`]
//! value instead of panicking or bubbling transport errors upward.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::envelope::{
    i64_field, BridgeEnvelope, ConnectData, DatabaseFile, QueryData, StatusData, UpdateData,
};
use super::models::{
    BridgeStatus, ConnectOutcome, RemoteCustomer, RemoteOrder, RemoteOrderLine, RemoteProduct,
    RemoteRecipe, RemoteRecipeLine, RemoteRecipeRevision, RemoteRecipeSubLine, TableColumn,
};
use super::sql;
use crate::config::NetsimConfig;

/// Upper bound on the raw-body excerpt attached to protocol errors.
const BODY_EXCERPT_CHARS: usize = 200;

/// Row cap sent with queries that have no natural page size.
const DEFAULT_MAX_ROWS: i64 = 500;

/// How a bridge call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeErrorKind {
    /// The request could not be sent, or no response arrived.
    Transport,
    /// A response arrived but was empty or not valid JSON.
    Protocol,
    /// The bridge answered with `success: false`; the message is its own.
    Remote,
}

/// Failure value returned by every bridge operation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct BridgeError {
    pub kind: BridgeErrorKind,
    pub message: String,
}

impl BridgeError {
    fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: BridgeErrorKind::Transport,
            message: message.into(),
        }
    }

    fn protocol(message: impl Into<String>) -> Self {
        Self {
            kind: BridgeErrorKind::Protocol,
            message: message.into(),
        }
    }

    fn remote(message: impl Into<String>) -> Self {
        Self {
            kind: BridgeErrorKind::Remote,
            message: message.into(),
        }
    }
}

impl From<BridgeError> for crate::errors::ServiceError {
    fn from(err: BridgeError) -> Self {
        crate::errors::ServiceError::ExternalServiceError(err.message)
    }
}

fn body_excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    #[serde(rename = "Sql")]
    sql: &'a str,
    #[serde(rename = "MaxRows")]
    max_rows: i64,
}

#[derive(Serialize)]
struct ConnectRequest<'a> {
    #[serde(rename = "DatabasePath")]
    database_path: &'a str,
    #[serde(rename = "DatabaseFile")]
    database_file: &'a str,
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
    #[serde(rename = "Charset")]
    charset: &'a str,
}

#[derive(Serialize)]
struct DeliveryDateRequest {
    #[serde(rename = "AlissatisNo")]
    alissatis_no: i64,
    #[serde(rename = "DeliveryDate")]
    delivery_date: String,
}

/// Typed interface over the bridge service.
///
/// Holds no connection state of its own beyond an advisory `connected`
/// flag; the flag is observational and never gates a call, because callers
/// routinely query before the first explicit status check.
pub struct NetsimClient {
    http: Client,
    base_url: String,
    settings: NetsimConfig,
    connected: AtomicBool,
}

impl NetsimClient {
    /// Builds a client from settings. The reqwest client is left on
    /// transport defaults: the bridge imposes its own statement limits and
    /// callers expect long-running recipe queries not to be cut short here.
    pub fn new(settings: NetsimConfig) -> Self {
        Self::with_client(settings, Client::new())
    }

    /// Builds a client from an existing reqwest client (useful for testing).
    pub fn with_client(settings: NetsimConfig, http: Client) -> Self {
        let base_url = settings.api_url.trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            settings,
            connected: AtomicBool::new(false),
        }
    }

    /// Last connectivity state observed by `status`/`connect`. Advisory only.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<BridgeEnvelope<T>, BridgeError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| BridgeError::transport(format!("request to {path} failed: {e}")))?;
        Self::read_envelope(path, response).await
    }

    async fn post_envelope<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<BridgeEnvelope<T>, BridgeError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BridgeError::transport(format!("request to {path} failed: {e}")))?;
        Self::read_envelope(path, response).await
    }

    async fn read_envelope<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<BridgeEnvelope<T>, BridgeError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::transport(format!("reading response of {path} failed: {e}")))?;

        let text = String::from_utf8_lossy(&body);
        if text.trim().is_empty() {
            return Err(BridgeError::protocol(format!(
                "empty response body (HTTP {status})"
            )));
        }

        serde_json::from_slice::<BridgeEnvelope<T>>(&body).map_err(|_| {
            warn!(%path, %status, "bridge returned a non-JSON body");
            BridgeError::protocol(format!(
                "unparseable response body: {}",
                body_excerpt(&text)
            ))
        })
    }

    fn unwrap_envelope<T>(env: BridgeEnvelope<T>) -> Result<Option<T>, BridgeError> {
        if env.success {
            Ok(env.data)
        } else {
            let message = env
                .error
                .or(env.message)
                .unwrap_or_else(|| "bridge reported failure".to_string());
            Err(BridgeError::remote(message))
        }
    }

    fn scalar_count(data: &QueryData) -> i64 {
        data.rows
            .first()
            .and_then(|row| i64_field(row, "TOPLAM"))
            .unwrap_or(0)
    }

    /// Connectivity probe. Also refreshes the advisory connected flag.
    #[instrument(skip(self))]
    pub async fn status(&self) -> Result<BridgeStatus, BridgeError> {
        let env: BridgeEnvelope<StatusData> = self.get_envelope("/api/status", &[]).await?;
        let data = Self::unwrap_envelope(env)?.unwrap_or_default();
        self.connected.store(data.is_connected, Ordering::Relaxed);
        Ok(BridgeStatus {
            connected: data.is_connected,
            current_database: data.current_database,
        })
    }

    /// Opens a database through the bridge. The directory, credentials and
    /// charset come from settings; only the file name varies per call.
    #[instrument(skip(self))]
    pub async fn connect(&self, database_file: Option<&str>) -> Result<ConnectOutcome, BridgeError> {
        let file = database_file
            .map(str::to_string)
            .or_else(|| self.settings.database_file.clone())
            .unwrap_or_default();

        let body = ConnectRequest {
            database_path: &self.settings.database_path,
            database_file: &file,
            username: &self.settings.username,
            password: &self.settings.password,
            charset: &self.settings.charset,
        };

        let env: BridgeEnvelope<ConnectData> =
            self.post_envelope("/api/database/connect", &body).await?;
        let data = Self::unwrap_envelope(env)?.unwrap_or_default();
        self.connected.store(true, Ordering::Relaxed);

        debug!(database_file = %file, "bridge database opened");
        Ok(ConnectOutcome {
            connected: true,
            server_version: data.server_version,
            table_count: data.table_count,
        })
    }

    /// Lists database files visible to the bridge at the given directory
    /// (settings directory when omitted).
    pub async fn list_database_files(
        &self,
        path: Option<&str>,
    ) -> Result<Vec<DatabaseFile>, BridgeError> {
        let path = path.unwrap_or(&self.settings.database_path);
        let env: BridgeEnvelope<Vec<DatabaseFile>> = self
            .get_envelope("/api/database/files", &[("path", path)])
            .await?;
        Ok(Self::unwrap_envelope(env)?.unwrap_or_default())
    }

    /// Central read primitive: ships raw SQL to the bridge with a row cap.
    /// Every other read operation is built on top of this.
    #[instrument(skip(self, sql))]
    pub async fn query(&self, sql: &str, max_rows: i64) -> Result<QueryData, BridgeError> {
        debug!(max_rows, sql, "executing bridge query");
        let env: BridgeEnvelope<QueryData> = self
            .post_envelope("/api/tables/query", &QueryRequest { sql, max_rows })
            .await?;
        Ok(Self::unwrap_envelope(env)?.unwrap_or_default())
    }

    /// Purchase orders, newest first. `only_open` adds a not-closed filter.
    pub async fn get_orders(
        &self,
        limit: i64,
        offset: i64,
        only_open: bool,
    ) -> Result<Vec<RemoteOrder>, BridgeError> {
        let data = self
            .query(&sql::orders_page(limit, offset, only_open), limit)
            .await?;
        Ok(data.rows.iter().map(RemoteOrder::from_row).collect())
    }

    /// Number of orders matching the same filter `get_orders` applies.
    pub async fn get_order_count(&self, only_open: bool) -> Result<i64, BridgeError> {
        let data = self.query(&sql::orders_count(only_open), 1).await?;
        Ok(Self::scalar_count(&data))
    }

    /// Open orders recorded within the last `minutes_ago` minutes,
    /// capped at 50.
    pub async fn get_new_orders(&self, minutes_ago: i64) -> Result<Vec<RemoteOrder>, BridgeError> {
        let data = self
            .query(&sql::new_orders(minutes_ago), sql::NEW_ORDERS_LIMIT)
            .await?;
        Ok(data.rows.iter().map(RemoteOrder::from_row).collect())
    }

    /// Single order header by order number.
    pub async fn get_order(&self, order_no: i64) -> Result<Option<RemoteOrder>, BridgeError> {
        let data = self.query(&sql::order_by_no(order_no), 1).await?;
        Ok(data.rows.first().map(RemoteOrder::from_row))
    }

    /// Line items of one order, by line sequence.
    pub async fn get_order_details(
        &self,
        order_no: i64,
    ) -> Result<Vec<RemoteOrderLine>, BridgeError> {
        let data = self
            .query(&sql::order_lines(order_no), DEFAULT_MAX_ROWS)
            .await?;
        Ok(data.rows.iter().map(RemoteOrderLine::from_row).collect())
    }

    pub async fn get_customer(
        &self,
        customer_no: i64,
    ) -> Result<Option<RemoteCustomer>, BridgeError> {
        let data = self.query(&sql::customer_by_no(customer_no), 1).await?;
        Ok(data.rows.first().map(RemoteCustomer::from_row))
    }

    pub async fn get_product(&self, stock_no: i64) -> Result<Option<RemoteProduct>, BridgeError> {
        let data = self.query(&sql::product_by_no(stock_no), 1).await?;
        Ok(data.rows.first().map(RemoteProduct::from_row))
    }

    /// The one remote write: pushes a committed delivery date onto an order.
    /// A successful call that touches zero rows is reported as a failure.
    #[instrument(skip(self))]
    pub async fn update_delivery_date(
        &self,
        order_no: i64,
        date: NaiveDate,
    ) -> Result<(), BridgeError> {
        let body = DeliveryDateRequest {
            alissatis_no: order_no,
            delivery_date: date.format("%Y-%m-%d").to_string(),
        };
        let env: BridgeEnvelope<UpdateData> = self
            .post_envelope("/api/tables/order/delivery-date", &body)
            .await?;
        let data = Self::unwrap_envelope(env)?.unwrap_or_default();
        if data.rows_affected == 0 {
            return Err(BridgeError::remote("order not found or not updated"));
        }
        Ok(())
    }

    /// User table names, system and view relations excluded.
    pub async fn get_tables(&self) -> Result<Vec<String>, BridgeError> {
        let data = self.query(&sql::tables(), DEFAULT_MAX_ROWS).await?;
        Ok(data
            .rows
            .iter()
            .filter_map(|row| super::envelope::str_field(row, "RELATION_NAME"))
            .collect())
    }

    /// Column descriptors of one table, with type codes decoded to names.
    pub async fn get_table_columns(
        &self,
        table_name: &str,
    ) -> Result<Vec<TableColumn>, BridgeError> {
        let data = self
            .query(&sql::table_columns(table_name), DEFAULT_MAX_ROWS)
            .await?;
        Ok(data.rows.iter().map(TableColumn::from_row).collect())
    }

    /// Recipe headers by code, optionally filtered by a substring search
    /// over code and name.
    pub async fn get_recipes(
        &self,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Result<Vec<RemoteRecipe>, BridgeError> {
        let data = self
            .query(&sql::recipes_page(limit, offset, search), limit)
            .await?;
        Ok(data.rows.iter().map(RemoteRecipe::from_row).collect())
    }

    pub async fn get_recipe_count(&self) -> Result<i64, BridgeError> {
        let data = self.query(&sql::recipes_count(), 1).await?;
        Ok(Self::scalar_count(&data))
    }

    /// Revisions of one recipe, default-first then code ascending.
    pub async fn get_recipe_revisions(
        &self,
        recipe_no: i64,
    ) -> Result<Vec<RemoteRecipeRevision>, BridgeError> {
        let data = self
            .query(&sql::recipe_revisions(recipe_no), DEFAULT_MAX_ROWS)
            .await?;
        Ok(data
            .rows
            .iter()
            .map(RemoteRecipeRevision::from_row)
            .collect())
    }

    /// Lines of one revision, by sequence.
    pub async fn get_recipe_details(
        &self,
        revision_no: i64,
    ) -> Result<Vec<RemoteRecipeLine>, BridgeError> {
        let data = self
            .query(&sql::recipe_details(revision_no), DEFAULT_MAX_ROWS)
            .await?;
        Ok(data.rows.iter().map(RemoteRecipeLine::from_row).collect())
    }

    /// Sub-components of one recipe line, by sequence.
    pub async fn get_recipe_sub_details(
        &self,
        detail_no: i64,
    ) -> Result<Vec<RemoteRecipeSubLine>, BridgeError> {
        let data = self
            .query(&sql::recipe_sub_details(detail_no), DEFAULT_MAX_ROWS)
            .await?;
        Ok(data
            .rows
            .iter()
            .map(RemoteRecipeSubLine::from_row)
            .collect())
    }

    /// Resolves a recipe's default (or else most-active) revision, then
    /// fetches its lines. Two sequential round trips; a recipe with no
    /// revisions yields an empty sequence, not an error.
    pub async fn get_recipe_details_by_recipe_no(
        &self,
        recipe_no: i64,
    ) -> Result<Vec<RemoteRecipeLine>, BridgeError> {
        let resolved = self.query(&sql::default_revision(recipe_no), 1).await?;
        let Some(revision_no) = resolved
            .rows
            .first()
            .and_then(|row| i64_field(row, "REVIZYONNO"))
        else {
            return Ok(Vec::new());
        };
        self.get_recipe_details(revision_no).await
    }

    /// Finds the first recipe revision referencing the stock number as
    /// input or output, then fetches its lines. A stock with no recipe
    /// yields an empty sequence.
    pub async fn get_product_recipe(
        &self,
        stock_no: i64,
    ) -> Result<Vec<RemoteRecipeLine>, BridgeError> {
        let resolved = self.query(&sql::revision_for_stock(stock_no), 1).await?;
        let Some(revision_no) = resolved
            .rows
            .first()
            .and_then(|row| i64_field(row, "REVIZYONNO"))
        else {
            return Ok(Vec::new());
        };
        self.get_recipe_details(revision_no).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_excerpt_truncates_to_two_hundred_chars() {
        let long = "x".repeat(512);
        assert_eq!(body_excerpt(&long).chars().count(), 200);
        assert_eq!(body_excerpt("short"), "short");
    }

    #[test]
    fn body_excerpt_respects_char_boundaries() {
        let turkish = "ş".repeat(300);
        let excerpt = body_excerpt(&turkish);
        assert_eq!(excerpt.chars().count(), 200);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let mut settings = NetsimConfig::default();
        settings.api_url = "http://bridge:5000/".into();
        let client = NetsimClient::new(settings);
        assert_eq!(client.base_url, "http://bridge:5000");
        assert!(!client.is_connected());
    }

    #[test]
    fn request_bodies_use_bridge_field_names() {
        let body = serde_json::to_value(QueryRequest {
            sql: "SELECT 1 FROM RDB$DATABASE",
            max_rows: 10,
        })
        .unwrap();
        assert_eq!(body["Sql"], "SELECT 1 FROM RDB$DATABASE");
        assert_eq!(body["MaxRows"], 10);

        let update = serde_json::to_value(DeliveryDateRequest {
            alissatis_no: 7,
            delivery_date: "2024-05-01".into(),
        })
        .unwrap();
        assert_eq!(update["AlissatisNo"], 7);
        assert_eq!(update["DeliveryDate"], "2024-05-01");
    }
}
