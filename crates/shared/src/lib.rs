//! Scenesmith Shared crate.
//!
//! Wire DTOs for the orchestrator's service surface. Kept separate from
//! `scenesmith-domain` so the persisted/internal representation (which
//! carries `prompts`) can never accidentally be serialized back to a
//! caller - only types in this crate are handed to the HTTP layer.

pub mod dto;

pub use dto::{ErrorResponse, RenderResponse, SceneDto, StatusResponse};
