//! NetSim ERP bridge: a narrow, typed interface over the HTTP proxy that
//! fronts the factory's legacy Firebird database. The rest of the
//! application never builds SQL or touches the bridge wire format directly.

pub mod client;
pub mod envelope;
pub mod models;
pub mod sql;

pub use client::{BridgeError, BridgeErrorKind, NetsimClient};
pub use envelope::{DatabaseFile, QueryData};
pub use models::{
    BridgeStatus, ConnectOutcome, LineDirection, RemoteCustomer, RemoteOrder, RemoteOrderLine,
    RemoteProduct, RemoteRecipe, RemoteRecipeLine, RemoteRecipeRevision, RemoteRecipeSubLine,
    TableColumn,
};
