//! Typed projections of the remote ERP schema.
//!
//! These are transient views rebuilt on every query; nothing here owns a
//! lifecycle. Each `from_row` maps one column-keyed bridge row into its
//! projection, tolerating NULL and absent columns.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::envelope::{
    bool_field, decimal_field, i64_field, str_field, timestamp_field, Row,
};
use super::sql::decode_field_type;

/// Order header from `ALSAASIL`, customer name joined in.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteOrder {
    pub order_no: i64,
    pub tracking_no: Option<String>,
    pub operation_code: Option<String>,
    pub order_date: Option<NaiveDateTime>,
    pub delivery_date: Option<NaiveDateTime>,
    pub approved: bool,
    pub closed: bool,
    pub customer_no: Option<i64>,
    pub customer_name: Option<String>,
    pub total_amount: Decimal,
    pub currency: Option<String>,
}

impl RemoteOrder {
    pub fn from_row(row: &Row) -> Self {
        Self {
            order_no: i64_field(row, "ALISSATISNO").unwrap_or_default(),
            tracking_no: str_field(row, "TAKIPNO"),
            operation_code: str_field(row, "ISLEMTIPI"),
            order_date: timestamp_field(row, "TARIH"),
            delivery_date: timestamp_field(row, "TESLIMTARIHI"),
            approved: bool_field(row, "ONAY"),
            closed: bool_field(row, "KAPALI"),
            customer_no: i64_field(row, "CARINO"),
            customer_name: str_field(row, "UNVAN"),
            total_amount: decimal_field(row, "TUTAR").unwrap_or_default(),
            currency: str_field(row, "DOVIZ"),
        }
    }
}

/// Order line from `ALSADETAY`, with source/produced stock names and the
/// produced stock's recipe name joined in.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteOrderLine {
    pub detail_no: i64,
    pub sequence: i64,
    pub stock_no: Option<i64>,
    pub stock_code: Option<String>,
    pub stock_name: Option<String>,
    pub produced_stock_no: Option<i64>,
    pub produced_stock_name: Option<String>,
    pub recipe_name: Option<String>,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub note1: Option<String>,
    pub note2: Option<String>,
    pub note3: Option<String>,
    pub note4: Option<String>,
    pub delivery_date: Option<NaiveDateTime>,
}

impl RemoteOrderLine {
    pub fn from_row(row: &Row) -> Self {
        Self {
            detail_no: i64_field(row, "DETAYNO").unwrap_or_default(),
            sequence: i64_field(row, "SIRANO").unwrap_or_default(),
            stock_no: i64_field(row, "STOKNO"),
            stock_code: str_field(row, "STOKKODU"),
            stock_name: str_field(row, "STOKADI"),
            produced_stock_no: i64_field(row, "URETSTOKNO"),
            produced_stock_name: str_field(row, "URETSTOKADI"),
            recipe_name: str_field(row, "RECETEADI"),
            quantity: decimal_field(row, "MIKTAR").unwrap_or_default(),
            unit: str_field(row, "BIRIM"),
            unit_price: decimal_field(row, "FIYAT").unwrap_or_default(),
            line_total: decimal_field(row, "TUTAR").unwrap_or_default(),
            note1: str_field(row, "NOT1"),
            note2: str_field(row, "NOT2"),
            note3: str_field(row, "NOT3"),
            note4: str_field(row, "NOT4"),
            delivery_date: timestamp_field(row, "TESLIMTARIHI"),
        }
    }
}

/// Counterparty record from `CARIKART`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteCustomer {
    pub customer_no: i64,
    pub code: Option<String>,
    pub name: Option<String>,
    pub tax_office: Option<String>,
    pub tax_number: Option<String>,
}

impl RemoteCustomer {
    pub fn from_row(row: &Row) -> Self {
        Self {
            customer_no: i64_field(row, "CARINO").unwrap_or_default(),
            code: str_field(row, "CARIKODU"),
            name: str_field(row, "UNVAN"),
            tax_office: str_field(row, "VERGIDAIRESI"),
            tax_number: str_field(row, "VERGINO"),
        }
    }
}

/// Stock/item record from `STOKKART`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteProduct {
    pub stock_no: i64,
    pub code: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub type_name: Option<String>,
}

impl RemoteProduct {
    pub fn from_row(row: &Row) -> Self {
        Self {
            stock_no: i64_field(row, "STOKNO").unwrap_or_default(),
            code: str_field(row, "STOKKODU"),
            name: str_field(row, "STOKADI"),
            unit: str_field(row, "BIRIM"),
            type_name: str_field(row, "TIPADI"),
        }
    }
}

/// Bill-of-materials header from `URETRECE`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteRecipe {
    pub recipe_no: i64,
    pub code: Option<String>,
    pub name: Option<String>,
    pub active: bool,
    pub stock_no: Option<i64>,
}

impl RemoteRecipe {
    pub fn from_row(row: &Row) -> Self {
        Self {
            recipe_no: i64_field(row, "RECETENO").unwrap_or_default(),
            code: str_field(row, "RECETEKODU"),
            name: str_field(row, "RECETEADI"),
            active: bool_field(row, "AKTIF"),
            stock_no: i64_field(row, "STOKNO"),
        }
    }
}

/// Versioned recipe variant from `URETRECEREV`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteRecipeRevision {
    pub revision_no: i64,
    pub recipe_no: i64,
    pub code: Option<String>,
    pub active: bool,
    pub is_default: bool,
    pub coefficient: Decimal,
    pub quantity: Decimal,
    pub date: Option<NaiveDateTime>,
}

impl RemoteRecipeRevision {
    pub fn from_row(row: &Row) -> Self {
        Self {
            revision_no: i64_field(row, "REVIZYONNO").unwrap_or_default(),
            recipe_no: i64_field(row, "RECETENO").unwrap_or_default(),
            code: str_field(row, "REVKODU"),
            active: bool_field(row, "AKTIF"),
            is_default: bool_field(row, "VARSAYILAN"),
            coefficient: decimal_field(row, "KATSAYI").unwrap_or_default(),
            quantity: decimal_field(row, "MIKTAR").unwrap_or_default(),
            date: timestamp_field(row, "TARIH"),
        }
    }
}

/// Classification of a recipe line's signed direction value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDirection {
    /// `+1`: consumed input
    Input,
    /// `-1`: produced output
    Output,
    /// anything else, including 0: informational
    Neutral,
}

/// One input/output step of a revision, from `URETRECEDET`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteRecipeLine {
    pub detail_no: i64,
    pub operation: Option<String>,
    /// Raw signed value from the wire, forwarded without validation.
    pub direction: i64,
    pub sequence: i64,
    pub stock_no: Option<i64>,
    pub stock_name: Option<String>,
    pub unit: Option<String>,
    pub multiplier: Decimal,
    pub produced_stock_no: Option<i64>,
    pub produced_stock_name: Option<String>,
    pub type_name: Option<String>,
    pub sub_recipe_no: Option<i64>,
}

impl RemoteRecipeLine {
    pub fn from_row(row: &Row) -> Self {
        Self {
            detail_no: i64_field(row, "DETAYNO").unwrap_or_default(),
            operation: str_field(row, "OPERASYON"),
            direction: i64_field(row, "YON").unwrap_or_default(),
            sequence: i64_field(row, "SIRANO").unwrap_or_default(),
            stock_no: i64_field(row, "STOKNO"),
            stock_name: str_field(row, "STOKADI"),
            unit: str_field(row, "BIRIM"),
            multiplier: decimal_field(row, "CARPAN").unwrap_or_default(),
            produced_stock_no: i64_field(row, "URETSTOKNO"),
            produced_stock_name: str_field(row, "URETSTOKADI"),
            type_name: str_field(row, "TIPADI"),
            sub_recipe_no: i64_field(row, "ALTRECETENO"),
        }
    }

    pub fn direction_kind(&self) -> LineDirection {
        match self.direction {
            1 => LineDirection::Input,
            -1 => LineDirection::Output,
            _ => LineDirection::Neutral,
        }
    }
}

/// Finer-grained sub-component of a recipe line, from `URETRECEDETDET`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteRecipeSubLine {
    pub sub_detail_no: i64,
    pub sequence: i64,
    pub variable: Option<String>,
    pub stock_no: Option<i64>,
    pub unit: Option<String>,
    pub quantity: Decimal,
}

impl RemoteRecipeSubLine {
    pub fn from_row(row: &Row) -> Self {
        Self {
            sub_detail_no: i64_field(row, "DETDETNO").unwrap_or_default(),
            sequence: i64_field(row, "SIRANO").unwrap_or_default(),
            variable: str_field(row, "DEGISKEN"),
            stock_no: i64_field(row, "STOKNO"),
            unit: str_field(row, "BIRIM"),
            quantity: decimal_field(row, "MIKTAR").unwrap_or_default(),
        }
    }
}

/// Column descriptor produced by schema introspection.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    pub name: String,
    /// Decoded type name (never a raw numeric code).
    pub field_type: String,
    pub length: Option<i64>,
    pub nullable: bool,
}

impl TableColumn {
    pub fn from_row(row: &Row) -> Self {
        Self {
            name: str_field(row, "FIELD_NAME").unwrap_or_default(),
            field_type: decode_field_type(i64_field(row, "FIELD_TYPE").unwrap_or(-1)).to_string(),
            length: i64_field(row, "FIELD_LENGTH"),
            nullable: !bool_field(row, "NULL_FLAG"),
        }
    }
}

/// Connectivity snapshot reported by the bridge.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeStatus {
    pub connected: bool,
    pub current_database: Option<String>,
}

/// Outcome of opening a database through the bridge.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectOutcome {
    pub connected: bool,
    pub server_version: Option<String>,
    pub table_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn remote_order_maps_joined_header_row() {
        let order = RemoteOrder::from_row(&row(json!({
            "ALISSATISNO": 12345,
            "TAKIPNO": "TK-9 ",
            "ISLEMTIPI": "ALIS-YURTICI",
            "TARIH": "2024-02-01T09:30:00",
            "TESLIMTARIHI": "2024-03-01",
            "ONAY": 1,
            "KAPALI": 0,
            "CARINO": 77,
            "UNVAN": "MARISIT MOBILYA A.S.",
            "TUTAR": 15000.50,
            "DOVIZ": "TRY",
        })));

        assert_eq!(order.order_no, 12345);
        assert_eq!(order.tracking_no.as_deref(), Some("TK-9"));
        assert!(order.approved);
        assert!(!order.closed);
        assert_eq!(order.customer_no, Some(77));
        assert_eq!(order.total_amount, dec!(15000.50));
        assert_eq!(
            order.order_date.unwrap().format("%Y-%m-%d").to_string(),
            "2024-02-01"
        );
    }

    #[test]
    fn remote_order_tolerates_null_heavy_rows() {
        let order = RemoteOrder::from_row(&row(json!({"ALISSATISNO": 1})));
        assert_eq!(order.order_no, 1);
        assert!(order.customer_name.is_none());
        assert_eq!(order.total_amount, Decimal::ZERO);
        assert!(!order.closed);
    }

    #[test]
    fn recipe_line_direction_is_passed_through_raw() {
        let line = RemoteRecipeLine::from_row(&row(json!({"DETAYNO": 5, "YON": 9})));
        assert_eq!(line.direction, 9);
        assert_eq!(line.direction_kind(), LineDirection::Neutral);

        let input = RemoteRecipeLine::from_row(&row(json!({"DETAYNO": 6, "YON": 1})));
        assert_eq!(input.direction_kind(), LineDirection::Input);

        let output = RemoteRecipeLine::from_row(&row(json!({"DETAYNO": 7, "YON": -1})));
        assert_eq!(output.direction_kind(), LineDirection::Output);
    }

    #[test]
    fn table_column_decodes_type_and_nullability() {
        let col = TableColumn::from_row(&row(json!({
            "FIELD_NAME": "RECETEKODU",
            "FIELD_TYPE": 37,
            "FIELD_LENGTH": 40,
            "NULL_FLAG": 0,
        })));
        assert_eq!(col.field_type, "VARCHAR");
        assert!(col.nullable);

        let not_null = TableColumn::from_row(&row(json!({
            "FIELD_NAME": "RECETENO",
            "FIELD_TYPE": 8,
            "NULL_FLAG": 1,
        })));
        assert_eq!(not_null.field_type, "INTEGER");
        assert!(!not_null.nullable);

        let unknown = TableColumn::from_row(&row(json!({
            "FIELD_NAME": "X",
            "FIELD_TYPE": 23,
        })));
        assert_eq!(unknown.field_type, "OTHER");
    }

    #[test]
    fn revision_row_maps_default_and_active_flags() {
        let rev = RemoteRecipeRevision::from_row(&row(json!({
            "REVIZYONNO": 3,
            "RECETENO": 5,
            "REVKODU": "REV-B",
            "AKTIF": 1,
            "VARSAYILAN": 1,
            "KATSAYI": "1.25",
            "MIKTAR": 10,
        })));
        assert!(rev.active);
        assert!(rev.is_default);
        assert_eq!(rev.coefficient, dec!(1.25));
        assert_eq!(rev.quantity, dec!(10));
    }
}
