//! C6 - Service Facade.
//!
//! The orchestrator's public operations, independent of transport: render,
//! get status, and rerender (§4.6). `http.rs` is a thin adapter over this.

use std::sync::Arc;

use scenesmith_domain::{DomainError, RenderContext, SceneDescriptor, SceneId};

use crate::coordinator::Coordinator;
use crate::store::SceneStore;

pub struct OrchestratorService {
    coordinator: Arc<Coordinator>,
    store: Arc<dyn SceneStore>,
}

impl OrchestratorService {
    pub fn new(coordinator: Arc<Coordinator>, store: Arc<dyn SceneStore>) -> Self {
        Self { coordinator, store }
    }

    /// Synthesize and render a new scene from a request context.
    pub async fn render(&self, ctx: RenderContext) -> Result<SceneDescriptor, DomainError> {
        self.coordinator.render(ctx).await
    }

    /// Look up a scene by id. Distinguishes a scene still mid-flight on
    /// the synchronous path (no stored record yet) from one that was
    /// never requested at all, though both report as `NotFound` to the
    /// store-less caller - only the in-flight table tells them apart.
    pub async fn get_status(&self, scene_id: SceneId) -> Result<SceneDescriptor, DomainError> {
        if let Some(record) = self.store.find_by_scene_id(scene_id).await? {
            return Ok(record.descriptor);
        }

        if self.coordinator.is_in_flight(scene_id) {
            return Err(DomainError::service_unavailable(
                "scene is still being rendered, try again shortly",
            ));
        }

        Err(DomainError::not_found(format!("no scene with id {scene_id}")))
    }

    /// Re-render a scene. Per §4.6, this allocates a brand new `sceneId`
    /// rather than reusing the original's - the stored `context` is
    /// replayed verbatim into a fresh synchronous render.
    pub async fn rerender(&self, scene_id: SceneId) -> Result<SceneDescriptor, DomainError> {
        let record = self
            .store
            .find_by_scene_id(scene_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("no scene with id {scene_id}")))?;

        self.coordinator.render(record.context).await
    }
}
