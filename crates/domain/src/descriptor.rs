//! The Scene Descriptor: the unit of work downstream orchestrator
//! components operate on, and the record the Scene Store persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SceneId;
use crate::vocab::{Biome, Camera, HeroPose, Lighting, Mood, TimeOfDay, Weather};

/// A subject the scene is framed around. At least the hero is always
/// present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocalSubject {
    pub name: String,
    pub role: String,
    pub description: String,
}

/// Prompts handed to the render engine. Never transmitted over the
/// service boundary (invariant 2) - only the Scene Store persists this.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prompts {
    pub base: String,
    pub negative: String,
}

/// Rendered image assets. Populated only once `status = Ready`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assets {
    pub image_url: String,
    pub thumbnail_url: String,
    pub width: u32,
    pub height: u32,
    pub provider: String,
    pub model: String,
}

/// Lifecycle status of a scene. See the state machine in §4.4: a scene
/// only ever moves `Pending -> (Ready | Offline)`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneStatus {
    Pending,
    Ready,
    Offline,
}

impl SceneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneStatus::Pending => "pending",
            SceneStatus::Ready => "ready",
            SceneStatus::Offline => "offline",
        }
    }
}

impl std::fmt::Display for SceneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fully-structured output of the Descriptor Synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    pub scene_id: SceneId,
    pub title: String,
    pub subtitle: String,
    pub genre: String,
    pub location_name: String,
    pub biome: Biome,
    pub mood: Mood,
    pub weather: Weather,
    pub lighting: Lighting,
    pub time_of_day: TimeOfDay,
    pub hero_pose: HeroPose,
    pub camera: Camera,
    /// Ordered 5-entry palette of color hex strings.
    pub palette: [String; 5],
    pub summary: String,
    pub focal_subjects: Vec<FocalSubject>,
    pub supporting_details: Vec<String>,
    pub prompts: Prompts,
    pub status: SceneStatus,
    pub assets: Option<Assets>,
    pub created_at: DateTime<Utc>,
    pub pre_generated_key: Option<String>,
}

impl SceneDescriptor {
    /// Invariant 1: `status = ready` iff `assets.imageUrl` is non-empty.
    pub fn invariants_hold(&self) -> bool {
        match self.status {
            SceneStatus::Ready => self
                .assets
                .as_ref()
                .is_some_and(|a| !a.image_url.is_empty()),
            SceneStatus::Pending | SceneStatus::Offline => self.assets.is_none(),
        }
    }

    /// Mark the scene ready with the given assets (sync or retry success).
    pub fn mark_ready(&mut self, assets: Assets) {
        debug_assert!(!assets.image_url.is_empty());
        self.assets = Some(assets);
        self.status = SceneStatus::Ready;
    }

    pub fn mark_pending(&mut self) {
        self.status = SceneStatus::Pending;
    }

    pub fn mark_offline(&mut self) {
        self.status = SceneStatus::Offline;
    }
}
