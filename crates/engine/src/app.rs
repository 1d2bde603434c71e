//! Application composition root (§6).
//!
//! Wires the provider pool, render engine, scene store, and coordinator
//! into a single `AppState` shared across axum handlers, mirroring the
//! teacher's `App`/`Repositories`/`UseCases` composition.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::coordinator::Coordinator;
use crate::provider_pool::ProviderPool;
use crate::random::{RandomPort, SystemRandom};
use crate::render_engine::{HttpImageProviderClient, RenderEngine};
use crate::service::OrchestratorService;
use crate::store::{SceneStore, SqliteSceneStore, StoreError};

/// The provider API endpoint every `HttpImageProviderClient` posts to.
/// All configured provider slots share the same wire contract (§4.3), so
/// one client implementation suffices; only credentials and model differ
/// per slot.
const PROVIDER_ENDPOINT_ENV: &str = "SCENE_PROVIDER_ENDPOINT";
const DEFAULT_PROVIDER_ENDPOINT: &str = "https://api.example-imagegen.invalid/v1/generate";

pub struct AppState {
    pub service: OrchestratorService,
    /// Kept alongside the coordinator for the `/health` and `/api/provider`
    /// diagnostic routes, which need the pool's snapshot but have no other
    /// reason to go through the service facade.
    pub provider_pool: Arc<ProviderPool>,
}

impl AppState {
    pub async fn build(config: &AppConfig) -> Result<Arc<Self>, StoreError> {
        let store: Arc<dyn SceneStore> = Arc::new(SqliteSceneStore::connect(&config.database_url).await?);
        let rng: Arc<dyn RandomPort> = Arc::new(SystemRandom);

        let pool = build_provider_pool(config);
        let endpoint = std::env::var(PROVIDER_ENDPOINT_ENV)
            .unwrap_or_else(|_| DEFAULT_PROVIDER_ENDPOINT.to_string());
        let client = Arc::new(HttpImageProviderClient::new(endpoint));
        let engine = Arc::new(RenderEngine::new(client, config.render_timeout));

        let coordinator = Arc::new(Coordinator::new(
            pool.clone(),
            engine,
            store.clone(),
            rng,
            config.max_retries,
            config.retry_delay,
        ));

        let service = OrchestratorService::new(coordinator, store);

        Ok(Arc::new(Self {
            service,
            provider_pool: pool,
        }))
    }
}

fn build_provider_pool(config: &AppConfig) -> Arc<ProviderPool> {
    match ProviderPool::from_config(config.providers.clone()) {
        Some(pool) => Arc::new(pool),
        None => {
            tracing::warn!("provider pool is empty; every render will resolve to offline");
            Arc::new(empty_pool())
        }
    }
}

/// A pool with a single permanently-disabled placeholder entry, used when
/// configuration yields no usable providers. Keeping a non-panicking,
/// always-`all_disabled` pool here is simpler than threading an
/// `Option<ProviderPool>` through the coordinator.
fn empty_pool() -> ProviderPool {
    use crate::provider_pool::{ProviderConfig, Resolution};
    let pool = ProviderPool::from_config(vec![ProviderConfig {
        label: "unconfigured".to_string(),
        api_key: Some("placeholder".to_string()),
        model: "none".to_string(),
        resolution: Resolution { width: 0, height: 0 },
    }])
    .expect("placeholder provider config is always valid");
    for entry in pool.entries() {
        entry.disable("no provider configured");
    }
    pool
}
