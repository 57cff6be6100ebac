use domain_vector::VectorService;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub service: Arc<VectorService>,
}
