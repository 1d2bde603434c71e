//! Inputs to the Descriptor Synthesizer.
//!
//! These mirror the render request body (§6): most of the payload is
//! opaque to the orchestrator - only a handful of fields drive
//! classification. Everything else is carried through untouched so it can
//! be replayed verbatim by `rerender`.

use serde::{Deserialize, Serialize};

/// A player's ability scores. Only present for completeness of the replay
/// context; the synthesizer does not branch on these values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub strength: i64,
    pub intelligence: i64,
    pub agility: i64,
}

/// Player context carried with a render request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerContext {
    pub name: String,
    pub class: String,
    pub level: i64,
    #[serde(default)]
    pub stats: Stats,
    /// Additional fields the text-generation subsystem may attach; opaque
    /// to the orchestrator, preserved for replay.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The quest active when the scene was requested, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Opaque game-state snapshot (turn counters, flags, ...).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(default)]
    pub turn_count: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Full render request context: the unit of work for a synchronous render,
/// and the payload replayed verbatim by `rerender`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    pub player: PlayerContext,
    pub genre: String,
    pub story_text: String,
    #[serde(default)]
    pub previous_events: Vec<serde_json::Value>,
    #[serde(default)]
    pub active_quest: Option<Quest>,
    #[serde(default)]
    pub current_location: Option<String>,
    #[serde(default)]
    pub game_state: Option<GameState>,
    #[serde(default)]
    pub pre_generated_key: Option<String>,
}
