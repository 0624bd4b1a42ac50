use std::sync::Arc;

use crate::geo::Geocoder;
use crate::observability::metrics::Metrics;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub geocoder: Arc<dyn Geocoder>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            store,
            geocoder,
            metrics: Metrics::new(),
        }
    }
}
