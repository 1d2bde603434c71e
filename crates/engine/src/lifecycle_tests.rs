//! End-to-end scenarios over the full HTTP surface: render, poll status,
//! rerender, and the diagnostic routes, wired together the way `main.rs`
//! wires them but with a scripted provider in place of a real one.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::sqlite::SqlitePoolOptions;
    use tower::ServiceExt;

    use crate::app::AppState;
    use crate::coordinator::Coordinator;
    use crate::http::router;
    use crate::provider_pool::{ProviderConfig, ProviderPool, Resolution};
    use crate::random::SystemRandom;
    use crate::render_engine::RenderEngine;
    use crate::service::OrchestratorService;
    use crate::store::{SceneStore, SqliteSceneStore};
    use crate::test_support::mock_provider::{ScriptedImageProvider, ScriptedOutcome};

    async fn state_with_script(outcomes: Vec<ScriptedOutcome>) -> Arc<AppState> {
        let pool = Arc::new(
            ProviderPool::from_config(vec![ProviderConfig {
                label: "p0".into(),
                api_key: Some("key".into()),
                model: "m".into(),
                resolution: Resolution { width: 1024, height: 576 },
            }])
            .unwrap(),
        );
        let client = Arc::new(ScriptedImageProvider::new(outcomes));
        let engine = Arc::new(RenderEngine::new(client, Duration::from_secs(5)));
        let sqlite = SqlitePoolOptions::new().connect("sqlite::memory:").await.unwrap();
        let store: Arc<dyn SceneStore> = Arc::new(SqliteSceneStore::from_pool(sqlite).await.unwrap());
        let coordinator = Arc::new(Coordinator::new(
            pool.clone(),
            engine,
            store.clone(),
            Arc::new(SystemRandom),
            2,
            Duration::ZERO,
        ));
        Arc::new(AppState {
            service: OrchestratorService::new(coordinator, store),
            provider_pool: pool,
        })
    }

    fn render_body() -> String {
        serde_json::json!({
            "player": {"name": "Aria", "class": "Ranger", "level": 3},
            "genre": "Fantasy",
            "storyText": "Thunder rolls over the ashen battlefield as Aria readies her bow.",
            "currentLocation": "Blackmere Ridge"
        })
        .to_string()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn render_then_status_then_rerender_round_trips() {
        let state = state_with_script(vec![ScriptedOutcome::Image {
            url: "https://img/battlefield.png".into(),
            width: 1024,
            height: 576,
        }])
        .await;
        let app = router(state);

        let render_resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/scene/render")
                    .header("content-type", "application/json")
                    .body(Body::from(render_body()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(render_resp.status(), StatusCode::OK);
        let rendered = json_body(render_resp).await;
        assert_eq!(rendered["sceneStatus"], "ready");
        let scene_id = rendered["sceneId"].as_str().unwrap().to_string();

        let status_resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/scene/status/{scene_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(status_resp.status(), StatusCode::OK);
        let status = json_body(status_resp).await;
        assert_eq!(status["sceneId"], scene_id);
        assert_eq!(status["sceneStatus"], "ready");

        let rerender_resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/scene/rerender/{scene_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(rerender_resp.status(), StatusCode::OK);
        let rerendered = json_body(rerender_resp).await;
        assert_ne!(rerendered["sceneId"], scene_id);
    }

    #[tokio::test]
    async fn status_for_unknown_scene_is_404() {
        let state = state_with_script(vec![ScriptedOutcome::Image {
            url: "https://img/ok.png".into(),
            width: 1,
            height: 1,
        }])
        .await;
        let app = router(state);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/scene/status/000000000000000000000000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_scene_id_in_url_is_400() {
        let state = state_with_script(vec![ScriptedOutcome::Error("irrelevant".into())]).await;
        let app = router(state);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/scene/status/not-hex")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sync_failure_then_retry_success_settles_to_ready() {
        let state = state_with_script(vec![
            ScriptedOutcome::Error("rate limited".into()),
            ScriptedOutcome::Image {
                url: "https://img/retried.png".into(),
                width: 1024,
                height: 576,
            },
        ])
        .await;
        let app = router(state.clone());

        let render_resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/scene/render")
                    .header("content-type", "application/json")
                    .body(Body::from(render_body()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let rendered = json_body(render_resp).await;
        assert_eq!(rendered["sceneStatus"], "pending");
        let scene_id: scenesmith_domain::SceneId =
            rendered["sceneId"].as_str().unwrap().parse().unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        let record = state.service.get_status(scene_id).await.unwrap();
        assert_eq!(record.status, scenesmith_domain::SceneStatus::Ready);
    }

    #[tokio::test]
    async fn health_and_provider_routes_report_pool_state() {
        let state = state_with_script(vec![ScriptedOutcome::Image {
            url: "https://img/ok.png".into(),
            width: 1,
            height: 1,
        }])
        .await;
        let app = router(state);

        let health = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        let health_body = json_body(health).await;
        assert_eq!(health_body["status"], "ok");
        assert_eq!(health_body["providerPool"].as_array().unwrap().len(), 1);

        let provider = app
            .oneshot(
                Request::builder()
                    .uri("/api/provider")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(provider.status(), StatusCode::OK);
        let provider_body = json_body(provider).await;
        assert_eq!(provider_body["providerPool"][0]["id"], "p0");
    }
}
