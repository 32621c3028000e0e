//! Application context - dependency injection container

use std::sync::Arc;

use cheapalarms_core::{
    EstimateAdmin, InvoiceAdmin, MutationCoordinator, QueryCache, UserAdmin, UsersPort,
};
use cheapalarms_domain::{Config, Result};
use cheapalarms_infra::{GhlClient, ScopedUserBackend, WordPressClient};

/// Application context - holds the cache handle, backend clients, and the
/// per-operation admin services.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub cache: QueryCache,
    pub wordpress: WordPressClient,
    pub estimates: Arc<EstimateAdmin>,
    pub invoices: Arc<InvoiceAdmin>,
    pub users: Arc<UserAdmin>,
}

impl AppContext {
    /// Wire up the full service graph from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let environment = config.server.environment;
        let wordpress = WordPressClient::new(&config.wordpress, environment)?;
        let ghl = GhlClient::new(&config.ghl)?;

        let cache = QueryCache::new(config.cache.freshness_window());
        let coordinator = Arc::new(MutationCoordinator::new(cache.clone()));

        let user_backend: Arc<dyn UsersPort> =
            Arc::new(ScopedUserBackend::new(wordpress.clone(), ghl));

        let estimates =
            Arc::new(EstimateAdmin::new(Arc::clone(&coordinator), Arc::new(wordpress.clone())));
        let invoices =
            Arc::new(InvoiceAdmin::new(Arc::clone(&coordinator), Arc::new(wordpress.clone())));
        let users = Arc::new(UserAdmin::new(coordinator, user_backend));

        Ok(Self { config, cache, wordpress, estimates, invoices, users })
    }
}
