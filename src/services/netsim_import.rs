use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::production_order::{self, Entity as OrderEntity},
    entities::production_order_line::{self, Entity as LineEntity},
    errors::ServiceError,
    netsim::{RemoteOrder, RemoteOrderLine},
};

/// Status every imported line starts in, pending the planning workflow.
const LINE_DRAFT_STATUS: &str = "draft";
const ORDER_IMPORTED_STATUS: &str = "imported";

/// Result of an import attempt.
#[derive(Debug)]
pub enum ImportOutcome {
    Imported { order_id: Uuid, line_count: usize },
    /// The order was imported before and still has lines; the existing
    /// header id is returned so the caller can link to it.
    AlreadyImported { order_id: Uuid },
}

/// Copies a NetSim order into the local store, exactly once per distinct
/// remote order number.
#[derive(Clone)]
pub struct NetsimImportService {
    db_pool: Arc<DbPool>,
}

impl NetsimImportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Imports one remote order with its lines.
    ///
    /// A previously imported header that still owns lines blocks the
    /// import. A header with zero lines is an orphan left behind by an
    /// earlier incomplete import; it is deleted and recreated, and both
    /// the deletion and the creation run in one transaction.
    #[instrument(skip(self, order, lines), fields(order_no = order.order_no))]
    pub async fn import_order(
        &self,
        order: &RemoteOrder,
        lines: &[RemoteOrderLine],
        actor: Option<Uuid>,
    ) -> Result<ImportOutcome, ServiceError> {
        let db = &*self.db_pool;
        let external_id = format!("NETSIM-{}", order.order_no);

        let existing = OrderEntity::find()
            .filter(production_order::Column::ExternalId.eq(&external_id))
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, %external_id, "Failed to check for an existing import");
                ServiceError::DatabaseError(e)
            })?;

        if let Some(existing) = &existing {
            let existing_lines = LineEntity::find()
                .filter(production_order_line::Column::OrderId.eq(existing.id))
                .all(db)
                .await
                .map_err(|e| {
                    error!(error = %e, order_id = %existing.id, "Failed to fetch existing lines");
                    ServiceError::DatabaseError(e)
                })?;

            if !existing_lines.is_empty() {
                info!(
                    order_id = %existing.id,
                    %external_id,
                    "Order already imported with {} lines",
                    existing_lines.len()
                );
                return Ok(ImportOutcome::AlreadyImported {
                    order_id: existing.id,
                });
            }
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, %external_id, "Failed to start import transaction");
            ServiceError::DatabaseError(e)
        })?;

        if let Some(orphan) = &existing {
            warn!(
                order_id = %orphan.id,
                %external_id,
                "Removing orphaned header left by an incomplete import"
            );
            OrderEntity::delete_by_id(orphan.id)
                .exec(&txn)
                .await
                .map_err(|e| {
                    error!(error = %e, order_id = %orphan.id, "Failed to delete orphaned header");
                    ServiceError::DatabaseError(e)
                })?;
        }

        let header = build_header(order_id, &external_id, order, actor, now);
        header.insert(&txn).await.map_err(|e| {
            error!(error = %e, %external_id, "Failed to create order header");
            ServiceError::DatabaseError(e)
        })?;

        let mut line_count = 0;
        for remote_line in lines {
            let line = build_line(order_id, order.order_no, remote_line, now);
            line.insert(&txn).await.map_err(|e| {
                error!(
                    error = %e,
                    %external_id,
                    detail_no = remote_line.detail_no,
                    "Failed to create order line"
                );
                ServiceError::DatabaseError(e)
            })?;
            line_count += 1;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, %external_id, "Failed to commit import transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, %external_id, line_count, "Order imported");

        Ok(ImportOutcome::Imported {
            order_id,
            line_count,
        })
    }
}

fn build_header(
    order_id: Uuid,
    external_id: &str,
    order: &RemoteOrder,
    actor: Option<Uuid>,
    now: DateTime<Utc>,
) -> production_order::ActiveModel {
    let company_name = order
        .customer_name
        .clone()
        .or_else(|| order.customer_no.map(|no| format!("CARI-{}", no)))
        .unwrap_or_else(|| "BILINMEYEN".to_string());

    production_order::ActiveModel {
        id: Set(order_id),
        external_id: Set(external_id.to_string()),
        order_number: Set(order.order_no.to_string()),
        company_name: Set(company_name),
        order_date: Set(order.order_date),
        delivery_date: Set(order.delivery_date),
        total_amount: Set(order.total_amount),
        currency: Set(order.currency.clone().unwrap_or_else(|| "TRY".to_string())),
        status: Set(ORDER_IMPORTED_STATUS.to_string()),
        imported_by: Set(actor),
        created_at: Set(now),
        updated_at: Set(Some(now)),
    }
}

fn build_line(
    order_id: Uuid,
    order_no: i64,
    remote: &RemoteOrderLine,
    now: DateTime<Utc>,
) -> production_order_line::ActiveModel {
    let model_code = remote
        .stock_code
        .clone()
        .unwrap_or_else(|| format!("STOK-{}", remote.stock_no.unwrap_or_default()));
    let name = remote.stock_name.clone().unwrap_or_else(|| model_code.clone());

    production_order_line::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        external_id: Set(format!("NETSIM-DETAY-{}", remote.detail_no)),
        code: Set(format!("NS-{}-{}", order_no, remote.detail_no)),
        name: Set(name),
        model_code: Set(model_code),
        // Remote quantities are decimals; the planning workflow counts pieces.
        quantity: Set(remote.quantity.trunc().to_i32().unwrap_or(0)),
        unit: Set(remote.unit.clone()),
        unit_price: Set(remote.unit_price),
        line_total: Set(remote.line_total),
        note1: Set(remote.note1.clone()),
        note2: Set(remote.note2.clone()),
        note3: Set(remote.note3.clone()),
        note4: Set(remote.note4.clone()),
        recipe_name: Set(remote.recipe_name.clone()),
        delivery_date: Set(remote.delivery_date),
        sequence: Set(remote.sequence as i32),
        status: Set(LINE_DRAFT_STATUS.to_string()),
        created_at: Set(now),
        updated_at: Set(Some(now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn remote_line(detail_no: i64) -> RemoteOrderLine {
        RemoteOrderLine {
            detail_no,
            sequence: 3,
            stock_no: Some(881),
            stock_code: None,
            stock_name: None,
            produced_stock_no: Some(990),
            produced_stock_name: Some("LAKE KAPAK".into()),
            recipe_name: Some("KAPAK RECETESI".into()),
            quantity: dec!(7.90),
            unit: Some("AD".into()),
            unit_price: dec!(120.5),
            line_total: dec!(951.95),
            note1: Some("acil".into()),
            note2: None,
            note3: None,
            note4: None,
            delivery_date: None,
        }
    }

    #[test]
    fn line_quantity_is_integer_truncated() {
        let line = build_line(Uuid::new_v4(), 555, &remote_line(42), Utc::now());
        assert_eq!(line.quantity.clone().unwrap(), 7);
    }

    #[test]
    fn line_model_code_falls_back_to_synthesized_stock_code() {
        let line = build_line(Uuid::new_v4(), 555, &remote_line(42), Utc::now());
        assert_eq!(line.model_code.clone().unwrap(), "STOK-881");
        // Without a remote name the model code doubles as the display name
        assert_eq!(line.name.clone().unwrap(), "STOK-881");
    }

    #[test]
    fn line_model_code_prefers_remote_stock_code() {
        let mut remote = remote_line(42);
        remote.stock_code = Some("MSB-104".into());
        remote.stock_name = Some("MASA AYAGI".into());
        let line = build_line(Uuid::new_v4(), 555, &remote, Utc::now());
        assert_eq!(line.model_code.clone().unwrap(), "MSB-104");
        assert_eq!(line.name.clone().unwrap(), "MASA AYAGI");
    }

    #[test]
    fn line_identifiers_are_synthesized_from_remote_keys() {
        let line = build_line(Uuid::new_v4(), 12345, &remote_line(991), Utc::now());
        assert_eq!(line.external_id.clone().unwrap(), "NETSIM-DETAY-991");
        assert_eq!(line.code.clone().unwrap(), "NS-12345-991");
        assert_eq!(line.status.clone().unwrap(), "draft");
        assert_eq!(line.sequence.clone().unwrap(), 3);
    }

    #[test]
    fn header_carries_denormalized_company_and_amount_fields() {
        let order = RemoteOrder {
            order_no: 12345,
            tracking_no: None,
            operation_code: Some("ALIS".into()),
            order_date: None,
            delivery_date: None,
            approved: true,
            closed: false,
            customer_no: Some(77),
            customer_name: Some("MARISIT MOBILYA A.S.".into()),
            total_amount: dec!(15000.50),
            currency: None,
        };
        let header = build_header(Uuid::new_v4(), "NETSIM-12345", &order, None, Utc::now());
        assert_eq!(header.external_id.clone().unwrap(), "NETSIM-12345");
        assert_eq!(header.order_number.clone().unwrap(), "12345");
        assert_eq!(
            header.company_name.clone().unwrap(),
            "MARISIT MOBILYA A.S."
        );
        assert_eq!(header.total_amount.clone().unwrap(), dec!(15000.50));
        // Legacy rows without a currency default to the factory's own
        assert_eq!(header.currency.clone().unwrap(), "TRY");
        assert_eq!(header.status.clone().unwrap(), "imported");
    }

    #[test]
    fn header_company_falls_back_to_customer_number() {
        let order = RemoteOrder {
            order_no: 9,
            tracking_no: None,
            operation_code: None,
            order_date: None,
            delivery_date: None,
            approved: false,
            closed: false,
            customer_no: Some(31),
            customer_name: None,
            total_amount: Decimal::ZERO,
            currency: Some("EUR".into()),
        };
        let header = build_header(Uuid::new_v4(), "NETSIM-9", &order, None, Utc::now());
        assert_eq!(header.company_name.clone().unwrap(), "CARI-31");
        assert_eq!(header.currency.clone().unwrap(), "EUR");
    }
}
