//! Unit tests for the NetSim import service over a mock database.
//!
//! Covers the duplicate-with-lines conflict, the orphaned-header recovery
//! path, and a fresh import.

use assert_matches::assert_matches;
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use std::sync::Arc;
use uuid::Uuid;

use uretim_api::entities::{production_order, production_order_line};
use uretim_api::netsim::{RemoteOrder, RemoteOrderLine};
use uretim_api::services::netsim_import::{ImportOutcome, NetsimImportService};

fn remote_order(order_no: i64) -> RemoteOrder {
    RemoteOrder {
        order_no,
        tracking_no: Some("TK-1".into()),
        operation_code: Some("ALIS".into()),
        order_date: None,
        delivery_date: None,
        approved: true,
        closed: false,
        customer_no: Some(77),
        customer_name: Some("MARISIT MOBILYA A.S.".into()),
        total_amount: dec!(1500.00),
        currency: Some("TRY".into()),
    }
}

fn remote_line(detail_no: i64, sequence: i64) -> RemoteOrderLine {
    RemoteOrderLine {
        detail_no,
        sequence,
        stock_no: Some(881),
        stock_code: Some("MSB-104".into()),
        stock_name: Some("MASA AYAGI".into()),
        produced_stock_no: None,
        produced_stock_name: None,
        recipe_name: None,
        quantity: dec!(4.0),
        unit: Some("AD".into()),
        unit_price: dec!(100.00),
        line_total: dec!(400.00),
        note1: None,
        note2: None,
        note3: None,
        note4: None,
        delivery_date: None,
    }
}

fn local_header(id: Uuid, external_id: &str) -> production_order::Model {
    production_order::Model {
        id,
        external_id: external_id.to_string(),
        order_number: "12345".to_string(),
        company_name: "MARISIT MOBILYA A.S.".to_string(),
        order_date: None,
        delivery_date: None,
        total_amount: dec!(1500.00),
        currency: "TRY".to_string(),
        status: "imported".to_string(),
        imported_by: None,
        created_at: Utc::now(),
        updated_at: Some(Utc::now()),
    }
}

fn local_line(id: Uuid, order_id: Uuid, detail_no: i64) -> production_order_line::Model {
    production_order_line::Model {
        id,
        order_id,
        external_id: format!("NETSIM-DETAY-{}", detail_no),
        code: format!("NS-12345-{}", detail_no),
        name: "MASA AYAGI".to_string(),
        model_code: "MSB-104".to_string(),
        quantity: 4,
        unit: Some("AD".to_string()),
        unit_price: dec!(100.00),
        line_total: dec!(400.00),
        note1: None,
        note2: None,
        note3: None,
        note4: None,
        recipe_name: None,
        delivery_date: None,
        sequence: 1,
        status: "draft".to_string(),
        created_at: Utc::now(),
        updated_at: Some(Utc::now()),
    }
}

#[tokio::test]
async fn reimport_with_surviving_lines_is_a_conflict_and_creates_nothing() {
    let existing_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // Lookup by external id finds the earlier import
        .append_query_results([vec![local_header(existing_id, "NETSIM-12345")]])
        // ... and it still owns a line
        .append_query_results([vec![local_line(Uuid::new_v4(), existing_id, 991)]])
        .into_connection();

    let service = NetsimImportService::new(Arc::new(db));
    let outcome = service
        .import_order(&remote_order(12345), &[remote_line(991, 1)], None)
        .await
        .unwrap();

    // The existing local id comes back for UI linking; no second header.
    assert_matches!(outcome, ImportOutcome::AlreadyImported { order_id } if order_id == existing_id);
}

#[tokio::test]
async fn orphaned_header_is_replaced_in_one_pass() {
    let orphan_id = Uuid::new_v4();
    let replacement = local_header(Uuid::new_v4(), "NETSIM-12345");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // Lookup finds a header from a prior incomplete import
        .append_query_results([vec![local_header(orphan_id, "NETSIM-12345")]])
        // ... with zero lines
        .append_query_results([Vec::<production_order_line::Model>::new()])
        // Fresh header insert
        .append_query_results([vec![replacement.clone()]])
        // Two line inserts
        .append_query_results([
            vec![local_line(Uuid::new_v4(), replacement.id, 991)],
            vec![local_line(Uuid::new_v4(), replacement.id, 992)],
        ])
        // Orphan deletion
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let service = NetsimImportService::new(Arc::new(db));
    let outcome = service
        .import_order(
            &remote_order(12345),
            &[remote_line(991, 1), remote_line(992, 2)],
            None,
        )
        .await
        .unwrap();

    assert_matches!(outcome, ImportOutcome::Imported { line_count: 2, .. });
}

#[tokio::test]
async fn fresh_import_creates_header_and_lines() {
    let created = local_header(Uuid::new_v4(), "NETSIM-777");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // No prior import
        .append_query_results([Vec::<production_order::Model>::new()])
        // Header insert
        .append_query_results([vec![created.clone()]])
        // One line insert
        .append_query_results([vec![local_line(Uuid::new_v4(), created.id, 44)]])
        .into_connection();

    let service = NetsimImportService::new(Arc::new(db));
    let outcome = service
        .import_order(&remote_order(777), &[remote_line(44, 1)], Some(Uuid::new_v4()))
        .await
        .unwrap();

    assert_matches!(outcome, ImportOutcome::Imported { line_count: 1, .. });
}

#[tokio::test]
async fn persistence_failure_surfaces_as_a_database_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // Lookup succeeds with no prior import, then the insert finds no
        // appended result and errors out
        .append_query_results([Vec::<production_order::Model>::new()])
        .into_connection();

    let service = NetsimImportService::new(Arc::new(db));
    let result = service
        .import_order(&remote_order(778), &[remote_line(45, 1)], None)
        .await;

    assert!(result.is_err());
}
