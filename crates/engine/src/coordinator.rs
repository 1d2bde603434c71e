//! C4 - Dedup & Retry Coordinator.
//!
//! Owns the synchronous render path and the background retry task. Holds
//! two process-memory tables, mirroring the connection-tracking `DashMap`s
//! in the teacher project: one marking scenes with a render currently in
//! flight, one tracking the at-most-one retry task per scene.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use scenesmith_domain::{Assets, DomainError, Prompts, RenderContext, SceneDescriptor, SceneId};

use crate::provider_pool::{ProviderEntry, ProviderPool};
use crate::random::RandomPort;
use crate::render_engine::{ProviderImage, RenderEngine};
use crate::store::{SceneRecord, SceneStore, StoreError};
use crate::synthesizer::synthesize;

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        DomainError::service_unavailable(e.to_string())
    }
}

enum AttemptOutcome {
    Ready(Assets),
    Pending,
    Offline,
}

fn to_assets(image: ProviderImage, entry: &ProviderEntry) -> Assets {
    Assets {
        image_url: image.url,
        thumbnail_url: String::new(),
        width: image.width,
        height: image.height,
        provider: entry.id.clone(),
        model: entry.model.clone(),
    }
}

pub struct Coordinator {
    pool: Arc<ProviderPool>,
    engine: Arc<RenderEngine>,
    store: Arc<dyn SceneStore>,
    rng: Arc<dyn RandomPort>,
    max_retries: u32,
    retry_delay: Duration,
    in_flight: Arc<DashMap<SceneId, ()>>,
    retry_tasks: Arc<DashMap<SceneId, JoinHandle<()>>>,
}

impl Coordinator {
    pub fn new(
        pool: Arc<ProviderPool>,
        engine: Arc<RenderEngine>,
        store: Arc<dyn SceneStore>,
        rng: Arc<dyn RandomPort>,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            pool,
            engine,
            store,
            rng,
            max_retries,
            retry_delay,
            in_flight: Arc::new(DashMap::new()),
            retry_tasks: Arc::new(DashMap::new()),
        }
    }

    /// True while a synchronous render for this scene is in progress and
    /// hasn't yet reached the store. Used by the status lookup to
    /// distinguish "not found" from "still being rendered" (§4.6).
    pub fn is_in_flight(&self, scene_id: SceneId) -> bool {
        self.in_flight.contains_key(&scene_id)
    }

    /// Run the full synchronous render path (§4.4, steps 1-7) and return
    /// the persisted descriptor. Only fails on invalid input or a store
    /// outage; every provider failure degrades to `pending`/`offline`.
    pub async fn render(&self, ctx: RenderContext) -> Result<SceneDescriptor, DomainError> {
        let mut descriptor = synthesize(&ctx, self.rng.as_ref())?;
        let scene_id = descriptor.scene_id;

        // A freshly-synthesized sceneId can never already be in the
        // table - it's drawn from a 96-bit random space - but the check
        // is kept to mirror the dedup semantics exactly (§4.4): an
        // in-flight entry short-circuits to the persisted record instead
        // of performing a second render.
        if self.in_flight.contains_key(&scene_id) {
            if let Some(record) = self.store.find_by_scene_id(scene_id).await? {
                return Ok(record.descriptor);
            }
        }

        self.in_flight.insert(scene_id, ());
        let outcome = self.run_sync_attempt(&descriptor).await;
        self.in_flight.remove(&scene_id);

        let schedule_retry = matches!(outcome, AttemptOutcome::Pending);
        match outcome {
            AttemptOutcome::Ready(assets) => descriptor.mark_ready(assets),
            AttemptOutcome::Pending => descriptor.mark_pending(),
            AttemptOutcome::Offline => descriptor.mark_offline(),
        }

        self.store
            .upsert(SceneRecord::new(descriptor.clone(), ctx))
            .await?;

        if schedule_retry {
            self.spawn_retry(scene_id, descriptor.prompts.clone());
        }

        Ok(descriptor)
    }

    /// Selection policy for a single synchronous attempt (§4.2): walk at
    /// most one full lap of the pool, skipping disabled providers and any
    /// provider currently busy (non-blocking `try_lock`), stopping at the
    /// first success.
    async fn run_sync_attempt(&self, descriptor: &SceneDescriptor) -> AttemptOutcome {
        if self.pool.is_empty() || self.pool.all_disabled() {
            return AttemptOutcome::Offline;
        }

        for _ in 0..self.pool.len() {
            let entry = self.pool.next();
            if entry.is_disabled() {
                continue;
            }
            let Ok(_guard) = entry.lock.try_lock() else {
                continue;
            };

            match self.engine.attempt(&entry, &descriptor.prompts).await {
                Ok(image) => {
                    entry.record_success();
                    return AttemptOutcome::Ready(to_assets(image, &entry));
                }
                Err(err) => {
                    tracing::warn!(provider = %entry.id, error = %err, "sync render attempt failed");
                    entry.record_failure();
                }
            }
        }

        AttemptOutcome::Pending
    }

    /// Spawn the background retry task for `scene_id`, unless one is
    /// already running. Picks a single provider - whichever is next in
    /// the round robin at scheduling time - and retries only against it
    /// (§4.4).
    fn spawn_retry(&self, scene_id: SceneId, prompts: Prompts) {
        // `maxRetries == 0` means retries are disabled entirely: the scene
        // stays `pending` forever rather than being marked `offline`,
        // matching the original's early return in this case.
        if self.max_retries == 0 {
            return;
        }
        if self.retry_tasks.contains_key(&scene_id) {
            return;
        }

        let pool = self.pool.clone();
        let engine = self.engine.clone();
        let store = self.store.clone();
        let retry_tasks = self.retry_tasks.clone();
        let max_retries = self.max_retries;
        let retry_delay = self.retry_delay;

        let handle = tokio::spawn(async move {
            run_retry_loop(pool, engine, store.clone(), scene_id, prompts, max_retries, retry_delay).await;
            retry_tasks.remove(&scene_id);
        });

        self.retry_tasks.insert(scene_id, handle);
    }
}

async fn run_retry_loop(
    pool: Arc<ProviderPool>,
    engine: Arc<RenderEngine>,
    store: Arc<dyn SceneStore>,
    scene_id: SceneId,
    prompts: Prompts,
    max_retries: u32,
    retry_delay: Duration,
) {
    if pool.is_empty() {
        mark_offline(&store, scene_id).await;
        return;
    }

    let entry = pool.next();

    for attempt in 0..max_retries {
        // Blocking acquisition is permitted here: the retry task is the
        // only background caller, so it may simply wait its turn (§4.4).
        let _guard = entry.lock.lock().await;
        match engine.attempt(&entry, &prompts).await {
            Ok(image) => {
                entry.record_success();
                let assets = to_assets(image, &entry);
                if let Err(err) = store
                    .update_status_and_assets(
                        scene_id,
                        scenesmith_domain::SceneStatus::Ready,
                        Some(assets),
                    )
                    .await
                {
                    tracing::error!(%scene_id, error = %err, "failed to persist retry success");
                }
                return;
            }
            Err(err) => {
                tracing::warn!(
                    %scene_id,
                    provider = %entry.id,
                    attempt,
                    error = %err,
                    "retry attempt failed"
                );
                entry.record_failure();
            }
        }
        drop(_guard);

        if attempt + 1 < max_retries && !retry_delay.is_zero() {
            tokio::time::sleep(retry_delay).await;
        }
    }

    mark_offline(&store, scene_id).await;
}

async fn mark_offline(store: &Arc<dyn SceneStore>, scene_id: SceneId) {
    if let Err(err) = store
        .update_status_and_assets(scene_id, scenesmith_domain::SceneStatus::Offline, None)
        .await
    {
        tracing::error!(%scene_id, error = %err, "failed to persist retry exhaustion");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider_pool::{ProviderConfig, Resolution};
    use crate::random::FixedRandom;
    use crate::render_engine::{ImageProviderClient, ProviderCallError};
    use crate::store::SqliteSceneStore;
    use async_trait::async_trait;
    use scenesmith_domain::{PlayerContext, SceneStatus, Stats};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedClient {
        calls: AtomicUsize,
        outcomes: Vec<Result<serde_json::Value, String>>,
    }

    #[async_trait]
    impl ImageProviderClient for ScriptedClient {
        async fn generate(
            &self,
            _entry: &ProviderEntry,
            _prompts: &Prompts,
        ) -> Result<serde_json::Value, ProviderCallError> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcomes[i.min(self.outcomes.len() - 1)] {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(ProviderCallError::Status(e.clone())),
            }
        }
    }

    fn image_value(url: &str) -> serde_json::Value {
        serde_json::json!({"images": {"url": url, "width": 10, "height": 10}})
    }

    async fn memory_store() -> Arc<dyn SceneStore> {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        Arc::new(SqliteSceneStore::from_pool(pool).await.unwrap())
    }

    fn ctx() -> RenderContext {
        RenderContext {
            player: PlayerContext {
                name: "Aria".into(),
                class: "Ranger".into(),
                level: 3,
                stats: Stats::default(),
                extra: Default::default(),
            },
            genre: "Fantasy".into(),
            story_text: "A calm river at dawn.".into(),
            previous_events: vec![],
            active_quest: None,
            current_location: Some("Willow Grove".into()),
            game_state: None,
            pre_generated_key: None,
        }
    }

    fn provider_config(label: &str) -> ProviderConfig {
        ProviderConfig {
            label: label.into(),
            api_key: Some("key".into()),
            model: "model".into(),
            resolution: Resolution { width: 1024, height: 576 },
        }
    }

    #[tokio::test]
    async fn happy_path_marks_ready_on_first_provider() {
        let pool = Arc::new(ProviderPool::from_config(vec![provider_config("p0")]).unwrap());
        let client = Arc::new(ScriptedClient {
            calls: AtomicUsize::new(0),
            outcomes: vec![Ok(image_value("https://img/ok.png"))],
        });
        let engine = Arc::new(RenderEngine::new(client, Duration::from_secs(5)));
        let store = memory_store().await;
        let coordinator = Coordinator::new(
            pool,
            engine,
            store.clone(),
            Arc::new(FixedRandom(0)),
            2,
            Duration::ZERO,
        );

        let descriptor = coordinator.render(ctx()).await.unwrap();
        assert_eq!(descriptor.status, SceneStatus::Ready);
        assert_eq!(descriptor.assets.unwrap().image_url, "https://img/ok.png");

        let stored = store.find_by_scene_id(descriptor.scene_id).await.unwrap().unwrap();
        assert_eq!(stored.descriptor.status, SceneStatus::Ready);
    }

    #[tokio::test]
    async fn empty_pool_goes_straight_to_offline_with_no_retry() {
        let pool = Arc::new(ProviderPool::from_config(vec![]).unwrap_or_else(|| {
            ProviderPool::from_config(vec![provider_config("unused")]).unwrap()
        }));
        // Force an effectively empty, fully disabled pool.
        for entry in pool.entries() {
            entry.disable("test");
        }
        let client = Arc::new(ScriptedClient {
            calls: AtomicUsize::new(0),
            outcomes: vec![],
        });
        let engine = Arc::new(RenderEngine::new(client, Duration::from_secs(5)));
        let store = memory_store().await;
        let coordinator = Coordinator::new(
            pool,
            engine,
            store.clone(),
            Arc::new(FixedRandom(0)),
            2,
            Duration::ZERO,
        );

        let descriptor = coordinator.render(ctx()).await.unwrap();
        assert_eq!(descriptor.status, SceneStatus::Offline);
        assert!(descriptor.assets.is_none());
    }

    #[tokio::test]
    async fn all_sync_failures_go_pending_then_retry_succeeds() {
        let pool = Arc::new(ProviderPool::from_config(vec![provider_config("p0")]).unwrap());
        let client = Arc::new(ScriptedClient {
            calls: AtomicUsize::new(0),
            outcomes: vec![
                Err("boom".into()),
                Ok(image_value("https://img/retry-ok.png")),
            ],
        });
        let engine = Arc::new(RenderEngine::new(client, Duration::from_secs(5)));
        let store = memory_store().await;
        let coordinator = Coordinator::new(
            pool,
            engine,
            store.clone(),
            Arc::new(FixedRandom(0)),
            2,
            Duration::ZERO,
        );

        let descriptor = coordinator.render(ctx()).await.unwrap();
        assert_eq!(descriptor.status, SceneStatus::Pending);

        // Let the spawned retry task run.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stored = store.find_by_scene_id(descriptor.scene_id).await.unwrap().unwrap();
        assert_eq!(stored.descriptor.status, SceneStatus::Ready);
    }

    #[tokio::test]
    async fn retry_exhaustion_marks_offline() {
        let pool = Arc::new(ProviderPool::from_config(vec![provider_config("p0")]).unwrap());
        let client = Arc::new(ScriptedClient {
            calls: AtomicUsize::new(0),
            outcomes: vec![Err("boom".into()), Err("boom".into()), Err("boom".into())],
        });
        let engine = Arc::new(RenderEngine::new(client, Duration::from_secs(5)));
        let store = memory_store().await;
        let coordinator = Coordinator::new(
            pool,
            engine,
            store.clone(),
            Arc::new(FixedRandom(0)),
            2,
            Duration::ZERO,
        );

        let descriptor = coordinator.render(ctx()).await.unwrap();
        assert_eq!(descriptor.status, SceneStatus::Pending);

        tokio::time::sleep(Duration::from_millis(50)).await;

        let stored = store.find_by_scene_id(descriptor.scene_id).await.unwrap().unwrap();
        assert_eq!(stored.descriptor.status, SceneStatus::Offline);
    }

    #[tokio::test]
    async fn in_flight_is_cleared_after_render_completes() {
        let pool = Arc::new(ProviderPool::from_config(vec![provider_config("p0")]).unwrap());
        let client = Arc::new(ScriptedClient {
            calls: AtomicUsize::new(0),
            outcomes: vec![Ok(image_value("https://img/ok.png"))],
        });
        let engine = Arc::new(RenderEngine::new(client, Duration::from_secs(5)));
        let store = memory_store().await;
        let coordinator = Coordinator::new(
            pool,
            engine,
            store,
            Arc::new(FixedRandom(0)),
            2,
            Duration::ZERO,
        );

        let descriptor = coordinator.render(ctx()).await.unwrap();
        assert!(!coordinator.is_in_flight(descriptor.scene_id));
    }
}
