//! Application state for dependency injection.

use std::sync::Arc;

use crate::clients::BaasClient;
use crate::config::GatewayConfig;
use crate::middleware::{Cache, TokenVerifier};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub baas: BaasClient,
    /// Redis; membership caching and rate limiting are off without it
    pub cache: Option<Arc<Cache>>,
    pub tokens: Arc<TokenVerifier>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Create new app state.
    pub fn new(baas: BaasClient, cache: Option<Arc<Cache>>, config: GatewayConfig) -> Self {
        let tokens = Arc::new(TokenVerifier::new(&config.baas.jwt_secret));
        Self {
            baas,
            cache,
            tokens,
            config: Arc::new(config),
        }
    }
}
