//! Scenesmith Domain crate.
//!
//! Pure, infrastructure-free types shared by every orchestrator
//! component: the scene identifier, the fixed classification vocabulary,
//! the scene descriptor itself, and the render-request context.
//!
//! Nothing in this crate performs I/O; it has no opinion on HTTP, SQL, or
//! provider wire formats.

pub mod descriptor;
pub mod error;
pub mod ids;
pub mod request;
pub mod vocab;

pub use descriptor::{Assets, FocalSubject, Prompts, SceneDescriptor, SceneStatus};
pub use error::DomainError;
pub use ids::SceneId;
pub use request::{GameState, PlayerContext, Quest, RenderContext, Stats};
pub use vocab::{Biome, Camera, HeroPose, Lighting, Mood, TimeOfDay, Weather};
