pub mod common;
pub mod netsim;
pub mod orders;

use crate::config::NetsimConfig;
use crate::db::DbPool;
use crate::netsim::NetsimClient;
use crate::services::netsim_import::NetsimImportService;
use crate::services::orders::ProductionOrderService;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub netsim: Arc<NetsimClient>,
    pub orders: Arc<ProductionOrderService>,
    pub import: Arc<NetsimImportService>,
}

impl AppServices {
    /// Build the services container shared by all handlers.
    pub fn new(db_pool: Arc<DbPool>, netsim_cfg: NetsimConfig) -> Self {
        let netsim = Arc::new(NetsimClient::new(netsim_cfg));
        let orders = Arc::new(ProductionOrderService::new(db_pool.clone()));
        let import = Arc::new(NetsimImportService::new(db_pool));

        Self {
            netsim,
            orders,
            import,
        }
    }
}
