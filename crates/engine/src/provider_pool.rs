//! C2 - Provider Pool.
//!
//! An ordered, process-memory-only set of image-generation providers.
//! The pool itself only hands out the next entry by round robin (§4.2);
//! it deliberately does not skip busy or disabled entries - that
//! selection policy lives in the Dedup & Retry Coordinator, which is the
//! only caller that knows whether it's on the synchronous or background
//! path.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

/// Render resolution requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Configuration tuple for a single provider slot (§3, §6).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub label: String,
    pub api_key: Option<String>,
    pub model: String,
    pub resolution: Resolution,
}

/// A single provider entry. Constructed once at startup; never removed.
pub struct ProviderEntry {
    pub id: String,
    pub api_key: String,
    pub model: String,
    pub resolution: Resolution,
    /// Mutual exclusion for the render call itself: at most one in-flight
    /// render per provider (§5).
    pub lock: AsyncMutex<()>,
    failure_count: AtomicU32,
    disabled: AtomicBool,
    disabled_reason: Mutex<Option<String>>,
}

impl ProviderEntry {
    fn new(label: String, api_key: String, model: String, resolution: Resolution) -> Self {
        Self {
            id: label,
            api_key,
            model,
            resolution,
            lock: AsyncMutex::new(()),
            failure_count: AtomicU32::new(0),
            disabled: AtomicBool::new(false),
            disabled_reason: Mutex::new(None),
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    pub fn disabled_reason(&self) -> Option<String> {
        self.disabled_reason.lock().expect("disabled_reason lock poisoned").clone()
    }

    /// Record a successful render: reset the failure counter.
    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
    }

    /// Record a transient render failure. Never disables the provider -
    /// only categorical misconfiguration does that (§4.2).
    pub fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Permanently disable this provider for the remainder of the
    /// process. Monotonic: once true, stays true.
    pub fn disable(&self, reason: impl Into<String>) {
        self.disabled.store(true, Ordering::Release);
        *self.disabled_reason.lock().expect("disabled_reason lock poisoned") = Some(reason.into());
    }
}

/// Ordered collection of providers, selected by round robin.
pub struct ProviderPool {
    providers: Vec<std::sync::Arc<ProviderEntry>>,
    cursor: AtomicUsize,
}

impl ProviderPool {
    /// Build the pool from configuration. Entries with no API key are
    /// dropped (§3 Lifecycle). Returns `None` if nothing is left, which
    /// the caller must treat as a startup failure (§6 Exit conditions).
    pub fn from_config(configs: Vec<ProviderConfig>) -> Option<Self> {
        let providers: Vec<_> = configs
            .into_iter()
            .filter_map(|c| {
                let api_key = c.api_key?;
                if api_key.is_empty() {
                    return None;
                }
                Some(std::sync::Arc::new(ProviderEntry::new(
                    c.label,
                    api_key,
                    c.model,
                    c.resolution,
                )))
            })
            .collect();

        if providers.is_empty() {
            return None;
        }

        Some(Self {
            providers,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// True when every entry in the pool has been permanently disabled.
    pub fn all_disabled(&self) -> bool {
        self.providers.iter().all(|p| p.is_disabled())
    }

    /// Return the next entry by round robin, advancing the shared cursor.
    /// Fairness across concurrent callers is not guaranteed - only that
    /// the cursor advances atomically (§5).
    pub fn next(&self) -> std::sync::Arc<ProviderEntry> {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.providers.len();
        self.providers[idx].clone()
    }

    pub fn entries(&self) -> &[std::sync::Arc<ProviderEntry>] {
        &self.providers
    }

    /// Diagnostic snapshot of every entry, for the `/api/provider` and
    /// `/health` endpoints. Busyness is a best-effort, racy read (a
    /// non-blocking `try_lock` that's immediately dropped) - it's for
    /// operators, not for selection.
    pub fn snapshot(&self) -> Vec<ProviderSnapshot> {
        self.providers.iter().map(|p| p.snapshot()).collect()
    }
}

/// Point-in-time diagnostic view of a single provider entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSnapshot {
    pub id: String,
    pub model: String,
    pub busy: bool,
    pub failures: u32,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
}

impl ProviderEntry {
    pub fn snapshot(&self) -> ProviderSnapshot {
        ProviderSnapshot {
            id: self.id.clone(),
            model: self.model.clone(),
            busy: self.lock.try_lock().is_err(),
            failures: self.failure_count(),
            disabled: self.is_disabled(),
            disabled_reason: self.disabled_reason(),
        }
    }
}
