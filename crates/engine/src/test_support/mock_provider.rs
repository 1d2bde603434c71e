//! Scripted [`ImageProviderClient`] test double, grounded on the teacher's
//! `PlaceholderImageGen` mock: a fixed call-count and a queue of canned
//! outcomes consumed in order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use scenesmith_domain::Prompts;
use serde_json::Value;

use crate::provider_pool::ProviderEntry;
use crate::render_engine::{ImageProviderClient, ProviderCallError};

/// A provider call's scripted outcome.
#[derive(Clone)]
pub enum ScriptedOutcome {
    Image { url: String, width: u32, height: u32 },
    Error(String),
    /// Never resolves within any reasonable test timeout - exercises the
    /// render engine's timeout path.
    Hang,
}

/// An [`ImageProviderClient`] that replays a fixed script of outcomes,
/// one per call, holding the last outcome once the script is exhausted.
pub struct ScriptedImageProvider {
    script: Vec<ScriptedOutcome>,
    calls: AtomicUsize,
    /// Recorded prompts, for assertions on what was actually sent.
    seen_prompts: Mutex<Vec<Prompts>>,
}

impl ScriptedImageProvider {
    pub fn new(script: Vec<ScriptedOutcome>) -> Self {
        assert!(!script.is_empty(), "scripted provider needs at least one outcome");
        Self {
            script,
            calls: AtomicUsize::new(0),
            seen_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(outcome: ScriptedOutcome) -> Self {
        Self::new(vec![outcome])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_prompts(&self) -> Vec<Prompts> {
        self.seen_prompts.lock().expect("seen_prompts lock poisoned").clone()
    }
}

#[async_trait]
impl ImageProviderClient for ScriptedImageProvider {
    async fn generate(
        &self,
        _entry: &ProviderEntry,
        prompts: &Prompts,
    ) -> Result<Value, ProviderCallError> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_prompts
            .lock()
            .expect("seen_prompts lock poisoned")
            .push(prompts.clone());

        let idx = i.min(self.script.len() - 1);
        match &self.script[idx] {
            ScriptedOutcome::Image { url, width, height } => {
                Ok(serde_json::json!({"images": {"url": url, "width": width, "height": height}}))
            }
            ScriptedOutcome::Error(msg) => Err(ProviderCallError::Status(msg.clone())),
            ScriptedOutcome::Hang => {
                futures_util::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider_pool::{ProviderConfig, ProviderPool, Resolution};

    fn entry() -> std::sync::Arc<ProviderEntry> {
        let pool = ProviderPool::from_config(vec![ProviderConfig {
            label: "p0".into(),
            api_key: Some("key".into()),
            model: "m".into(),
            resolution: Resolution { width: 1, height: 1 },
        }])
        .unwrap();
        pool.next()
    }

    fn prompts() -> Prompts {
        Prompts {
            base: "base".into(),
            negative: "negative".into(),
        }
    }

    #[tokio::test]
    async fn replays_script_in_order_then_holds_last() {
        let provider = ScriptedImageProvider::new(vec![
            ScriptedOutcome::Error("first fails".into()),
            ScriptedOutcome::Image {
                url: "https://img/ok.png".into(),
                width: 10,
                height: 10,
            },
        ]);
        let entry = entry();

        assert!(provider.generate(&entry, &prompts()).await.is_err());
        let second = provider.generate(&entry, &prompts()).await.unwrap();
        assert_eq!(second["images"]["url"], "https://img/ok.png");
        // Script exhausted: holds the last outcome.
        let third = provider.generate(&entry, &prompts()).await.unwrap();
        assert_eq!(third["images"]["url"], "https://img/ok.png");

        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.seen_prompts().len(), 3);
    }
}
