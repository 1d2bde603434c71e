//! Scenesmith Engine: the scene orchestrator.
//!
//! Wraps a narrative text turn into a fully classified [`SceneDescriptor`]
//! (the Descriptor Synthesizer), renders it against a pool of image
//! providers with dedup and background retry (the Dedup & Retry
//! Coordinator), and exposes `render` / `get_status` / `rerender` over
//! HTTP (the Service Facade).

pub mod app;
pub mod config;
pub mod coordinator;
pub mod http;
#[cfg(test)]
mod lifecycle_tests;
pub mod provider_pool;
pub mod random;
pub mod render_engine;
pub mod service;
pub mod store;
pub mod synthesizer;
pub mod test_support;
