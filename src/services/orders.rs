use crate::{
    db::DbPool,
    entities::production_order::{
        self, Entity as OrderEntity, Model as OrderModel,
    },
    entities::production_order_line::{self, Entity as LineEntity, Model as LineModel},
    errors::ServiceError,
};
use sea_orm::{
    ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// An imported order together with its owned lines.
#[derive(Debug, Serialize)]
pub struct OrderWithLines {
    pub order: OrderModel,
    pub lines: Vec<LineModel>,
}

/// Service for reading and removing locally imported production orders.
/// Creation happens exclusively through the NetSim import path.
#[derive(Clone)]
pub struct ProductionOrderService {
    db_pool: Arc<DbPool>,
}

impl ProductionOrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Finds an order by its source-system identifier, lines included.
    #[instrument(skip(self))]
    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<OrderWithLines>, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find()
            .filter(production_order::Column::ExternalId.eq(external_id))
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, external_id, "Failed to look up order by external id");
                ServiceError::DatabaseError(e)
            })?;

        match order {
            Some(order) => {
                let lines = self.lines_of(&order).await?;
                Ok(Some(OrderWithLines { order, lines }))
            }
            None => Ok(None),
        }
    }

    /// Retrieves an order by ID, lines included.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderWithLines>, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to fetch order");
                ServiceError::DatabaseError(e)
            })?;

        match order {
            Some(order) => {
                let lines = self.lines_of(&order).await?;
                Ok(Some(OrderWithLines { order, lines }))
            }
            None => Ok(None),
        }
    }

    /// Lists imported orders with pagination, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<OrderModel>, u64), ServiceError> {
        let db = &*self.db_pool;

        let paginator = OrderEntity::find()
            .order_by_desc(production_order::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count orders");
            ServiceError::DatabaseError(e)
        })?;

        let orders = paginator.fetch_page(page.saturating_sub(1)).await.map_err(|e| {
            error!(error = %e, page, per_page, "Failed to fetch orders page");
            ServiceError::DatabaseError(e)
        })?;

        Ok((orders, total))
    }

    /// Deletes an order header; lines go with it via the cascading key.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "Order not found for deletion");
                ServiceError::NotFound("Order not found".to_string())
            })?;

        order.delete(db).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to delete order");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    async fn lines_of(&self, order: &OrderModel) -> Result<Vec<LineModel>, ServiceError> {
        let db = &*self.db_pool;

        LineEntity::find()
            .filter(production_order_line::Column::OrderId.eq(order.id))
            .order_by_asc(production_order_line::Column::Sequence)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order.id, "Failed to fetch order lines");
                ServiceError::DatabaseError(e)
            })
    }
}
