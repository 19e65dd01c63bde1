use std::sync::Arc;

use stockroom_infra::{AppConfig, InMemoryProductRepository, PostgresProductRepository};
use stockroom_products::{ProductRepository, ProductService, RepositoryError};

/// Type-erased gateway so handlers don't care which store is behind it.
pub type DynProductRepository = Arc<dyn ProductRepository>;

#[derive(Clone)]
pub struct AppServices {
    pub products: ProductService<DynProductRepository>,
}

impl AppServices {
    pub fn new(repo: DynProductRepository) -> Self {
        Self {
            products: ProductService::new(repo),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductRepository::new()))
    }
}

/// Select and initialize product storage from configuration.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, RepositoryError> {
    if config.use_persistent_stores {
        return build_persistent_services(config).await;
    }

    tracing::info!("using in-memory product store");
    Ok(AppServices::in_memory())
}

async fn build_persistent_services(config: &AppConfig) -> Result<AppServices, RepositoryError> {
    let repo = PostgresProductRepository::connect(&config.database).await?;
    repo.ensure_schema().await?;

    tracing::info!(
        host = %config.database.host,
        database = %config.database.name,
        "using postgres product store"
    );
    Ok(AppServices::new(Arc::new(repo)))
}
