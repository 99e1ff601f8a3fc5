use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "production_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Synthesized identifier carried over from the source system,
    /// e.g. "NETSIM-12345". Uniqueness is enforced by the importer's
    /// pre-check, not by a constraint.
    #[validate(length(min = 1, max = 64))]
    pub external_id: String,

    #[validate(length(min = 1, max = 50))]
    pub order_number: String,

    pub company_name: String,
    pub order_date: Option<NaiveDateTime>,
    pub delivery_date: Option<NaiveDateTime>,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: String,
    pub imported_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::production_order_line::Entity")]
    Lines,
}

impl Related<super::production_order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
