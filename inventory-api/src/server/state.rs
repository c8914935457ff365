// App state for the Axum server
use crate::aggregation::AggregationEngine;
use crate::context::Stores;
use crate::coordinator::AssetCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: AssetCoordinator,
    pub aggregations: AggregationEngine,
}

impl AppState {
    pub fn new(stores: Stores) -> Self {
        Self {
            coordinator: AssetCoordinator::new(stores.clone()),
            aggregations: AggregationEngine::new(stores),
        }
    }
}
