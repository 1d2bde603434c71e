//! C5 - Scene Store.
//!
//! Persists the scene descriptor, the original render context (for replay
//! by `rerender`), and status/asset transitions. Backed by SQLite via
//! `sqlx`, mirroring how the teacher project persists its queues.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use scenesmith_domain::{Assets, RenderContext, SceneDescriptor, SceneId, SceneStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// A stored scene: the descriptor (including `prompts`, which is never
/// returned to callers), the originating request context, and bookkeeping
/// fields.
#[derive(Debug, Clone)]
pub struct SceneRecord {
    pub descriptor: SceneDescriptor,
    pub player_id: String,
    pub turn: i64,
    pub context: RenderContext,
    pub updated_at: DateTime<Utc>,
}

impl SceneRecord {
    pub fn new(descriptor: SceneDescriptor, context: RenderContext) -> Self {
        let player_id = context
            .player
            .extra
            .get("playerId")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| context.player.name.clone());
        let turn = context
            .game_state
            .as_ref()
            .map(|g| g.turn_count)
            .unwrap_or(0);
        Self {
            descriptor,
            player_id,
            turn,
            context,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait SceneStore: Send + Sync {
    /// Atomic upsert keyed by `sceneId` (§4.5). Called once per scene,
    /// after the synchronous render attempt concludes.
    async fn upsert(&self, record: SceneRecord) -> Result<(), StoreError>;

    /// Partial update of status/assets, setting `updatedAt`. Applied by
    /// the background retry task. A no-op if the stored status is
    /// already `ready` - this is the safety net against a retry racing a
    /// fresher success (§5, §9).
    async fn update_status_and_assets(
        &self,
        scene_id: SceneId,
        status: SceneStatus,
        assets: Option<Assets>,
    ) -> Result<(), StoreError>;

    async fn find_by_scene_id(&self, scene_id: SceneId) -> Result<Option<SceneRecord>, StoreError>;

    /// Most-recent-first listing for a player, using the compound
    /// `(playerId, createdAt desc)` index (§4.5).
    async fn list_for_player(&self, player_id: &str, limit: i64) -> Result<Vec<SceneRecord>, StoreError>;
}

pub struct SqliteSceneStore {
    pool: SqlitePool,
}

impl SqliteSceneStore {
    /// Connect to `uri` and ensure the schema exists. Fails if the store
    /// is unreachable, per the startup exit condition in §6.
    pub async fn connect(uri: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(uri)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scenes (
                scene_id TEXT PRIMARY KEY,
                player_id TEXT NOT NULL,
                turn INTEGER NOT NULL,
                status TEXT NOT NULL,
                descriptor_json TEXT NOT NULL,
                context_json TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_scenes_player_created
            ON scenes (player_id, created_at DESC)
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<SceneRecord, StoreError> {
        let descriptor_json: String = row.try_get("descriptor_json")?;
        let context_json: String = row.try_get("context_json")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
        Ok(SceneRecord {
            descriptor: serde_json::from_str(&descriptor_json)?,
            player_id: row.try_get("player_id")?,
            turn: row.try_get("turn")?,
            context: serde_json::from_str(&context_json)?,
            updated_at,
        })
    }
}

#[async_trait]
impl SceneStore for SqliteSceneStore {
    async fn upsert(&self, record: SceneRecord) -> Result<(), StoreError> {
        let descriptor_json = serde_json::to_string(&record.descriptor)?;
        let context_json = serde_json::to_string(&record.context)?;

        sqlx::query(
            r#"
            INSERT INTO scenes (scene_id, player_id, turn, status, descriptor_json, context_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(scene_id) DO UPDATE SET
                player_id = excluded.player_id,
                turn = excluded.turn,
                status = excluded.status,
                descriptor_json = excluded.descriptor_json,
                context_json = excluded.context_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(record.descriptor.scene_id.to_string())
        .bind(&record.player_id)
        .bind(record.turn)
        .bind(record.descriptor.status.as_str())
        .bind(descriptor_json)
        .bind(context_json)
        .bind(record.descriptor.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status_and_assets(
        &self,
        scene_id: SceneId,
        status: SceneStatus,
        assets: Option<Assets>,
    ) -> Result<(), StoreError> {
        let Some(existing) = self.find_by_scene_id(scene_id).await? else {
            return Ok(());
        };

        let mut descriptor = existing.descriptor;
        descriptor.status = status;
        descriptor.assets = assets;
        let descriptor_json = serde_json::to_string(&descriptor)?;
        let updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE scenes
            SET status = ?1, descriptor_json = ?2, updated_at = ?3
            WHERE scene_id = ?4 AND status != 'ready'
            "#,
        )
        .bind(status.as_str())
        .bind(descriptor_json)
        .bind(updated_at)
        .bind(scene_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_scene_id(&self, scene_id: SceneId) -> Result<Option<SceneRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM scenes WHERE scene_id = ?1")
            .bind(scene_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn list_for_player(&self, player_id: &str, limit: i64) -> Result<Vec<SceneRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM scenes WHERE player_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )
        .bind(player_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_record).collect()
    }
}
