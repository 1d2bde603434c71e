//! Wire DTOs for the render / status / rerender service surface (§6).
//!
//! These are the only types that cross the service boundary. The scene
//! projection deliberately drops `prompts` (invariant 2): callers cannot
//! obtain generation prompts through the service no matter which
//! operation they call.

use serde::{Deserialize, Serialize};

use scenesmith_domain::{
    Assets, Biome, Camera, FocalSubject, HeroPose, Lighting, Mood, SceneDescriptor, SceneId,
    SceneStatus, TimeOfDay, Weather,
};

/// Projection of [`SceneDescriptor`] with `prompts` removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDto {
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
    pub palette: [String; 5],
    pub summary: String,
    pub focal_subjects: Vec<FocalSubject>,
    pub supporting_details: Vec<String>,
    pub status: SceneStatus,
    pub assets: Option<Assets>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub pre_generated_key: Option<String>,
}

impl From<&SceneDescriptor> for SceneDto {
    fn from(d: &SceneDescriptor) -> Self {
        Self {
            scene_id: d.scene_id,
            title: d.title.clone(),
            subtitle: d.subtitle.clone(),
            genre: d.genre.clone(),
            location_name: d.location_name.clone(),
            biome: d.biome,
            mood: d.mood,
            weather: d.weather,
            lighting: d.lighting,
            time_of_day: d.time_of_day,
            hero_pose: d.hero_pose,
            camera: d.camera,
            palette: d.palette.clone(),
            summary: d.summary.clone(),
            focal_subjects: d.focal_subjects.clone(),
            supporting_details: d.supporting_details.clone(),
            status: d.status,
            assets: d.assets.clone(),
            created_at: d.created_at,
            pre_generated_key: d.pre_generated_key.clone(),
        }
    }
}

/// Response returned by `render`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub scene: SceneDto,
    pub scene_id: SceneId,
    pub scene_status: SceneStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_assets: Option<Assets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_generated_key: Option<String>,
}

impl RenderResponse {
    pub fn from_descriptor(d: &SceneDescriptor) -> Self {
        Self {
            scene: SceneDto::from(d),
            scene_id: d.scene_id,
            scene_status: d.status,
            scene_assets: d.assets.clone(),
            pre_generated_key: d.pre_generated_key.clone(),
        }
    }
}

/// Response returned by `get_status` and `rerender`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub scene_id: SceneId,
    pub scene: SceneDto,
    pub scene_status: SceneStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_assets: Option<Assets>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl StatusResponse {
    pub fn from_descriptor(d: &SceneDescriptor, updated_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            scene_id: d.scene_id,
            scene: SceneDto::from(d),
            scene_status: d.status,
            scene_assets: d.assets.clone(),
            updated_at,
        }
    }
}

/// Error envelope for `InvalidInput` / `NotFound` / `ServiceUnavailable`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
