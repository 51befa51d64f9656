//! Shared application state
//!
//! Views are mounted lazily: the first request for a view key creates its
//! controller and starts its refresh loop; later requests reuse it. Views
//! that go unrequested for `refresh.view_idle_ms` are swept and stopped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::config::{RefreshConfig, ViewerConfig};
use crate::fetch::ContentFetcher;
use crate::params::PageParams;
use crate::refresh::{RefreshHandle, ViewController};
use crate::render::ComponentRegistry;
use crate::error::Result;
use crate::shell::Shell;
use crate::source::ContentSource;

struct MountedView {
    controller: ViewController,
    handle: RefreshHandle,
    /// Milliseconds since the registry epoch at the last request
    last_access: AtomicU64,
}

impl MountedView {
    fn touch(&self, now: u64) -> ViewController {
        self.last_access.store(now, Ordering::Relaxed);
        self.controller.clone()
    }
}

pub struct ViewRegistry {
    views: RwLock<HashMap<String, MountedView>>,
    fetcher: ContentFetcher,
    intervals: RefreshConfig,
    epoch: Instant,
}

impl ViewRegistry {
    pub fn new(fetcher: ContentFetcher, intervals: RefreshConfig) -> Self {
        Self {
            views: RwLock::new(HashMap::new()),
            fetcher,
            intervals,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Get the controller for these params, mounting the view on first use
    pub async fn mount(&self, params: PageParams) -> ViewController {
        let key = params.view_key();
        let now = self.now_ms();

        // Fast path: already mounted
        {
            let views = self.views.read().await;
            if let Some(view) = views.get(&key) {
                return view.touch(now);
            }
        }

        // Slow path: mount
        let mut views = self.views.write().await;
        if let Some(view) = views.get(&key) {
            return view.touch(now);
        }

        tracing::info!(view = %key, "Mounting view");
        let controller =
            ViewController::new(params, self.fetcher.clone(), self.intervals.clone());
        let handle = controller.clone().spawn();
        views.insert(
            key,
            MountedView {
                controller: controller.clone(),
                handle,
                last_access: AtomicU64::new(now),
            },
        );
        controller
    }

    /// Look up a mounted view. Counts as a request for idle tracking.
    pub async fn get(&self, key: &str) -> Option<ViewController> {
        let now = self.now_ms();
        self.views.read().await.get(key).map(|view| view.touch(now))
    }

    /// Stop a view's refresh loop and forget it
    pub async fn unmount(&self, key: &str) -> bool {
        match self.views.write().await.remove(key) {
            Some(view) => {
                view.handle.stop();
                tracing::info!(view = %key, "Unmounted view");
                true
            }
            None => false,
        }
    }

    /// Unmount every view not requested within `idle`; returns their keys.
    pub async fn sweep(&self, idle: Duration) -> Vec<String> {
        let cutoff = self.now_ms().saturating_sub(idle.as_millis() as u64);
        let mut views = self.views.write().await;
        let stale: Vec<String> = views
            .iter()
            .filter(|(_, view)| view.last_access.load(Ordering::Relaxed) < cutoff)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            if let Some(view) = views.remove(key) {
                view.handle.stop();
                tracing::info!(view = %key, "Unmounted idle view");
            }
        }
        stale
    }

    /// Sweep idle views every `every` until the registry is dropped.
    pub fn spawn_sweeper(registry: Weak<Self>, idle: Duration, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let swept = registry.sweep(idle).await;
                if !swept.is_empty() {
                    tracing::debug!(count = swept.len(), "Idle views swept");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.views.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.views.read().await.is_empty()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ViewerConfig>,
    pub source: Arc<dyn ContentSource>,
    pub components: Arc<ComponentRegistry>,
    pub views: Arc<ViewRegistry>,
    pub shell: Arc<Shell>,
}

impl AppState {
    pub fn new(config: ViewerConfig, source: Arc<dyn ContentSource>) -> Result<Self> {
        let shell = Shell::new(config.server.shell_options())?;
        let fetcher = ContentFetcher::new(source.clone());
        let views = Arc::new(ViewRegistry::new(fetcher, config.refresh.clone()));
        ViewRegistry::spawn_sweeper(
            Arc::downgrade(&views),
            config.refresh.view_idle(),
            config.refresh.sweep_interval(),
        );
        Ok(Self {
            config: Arc::new(config),
            source,
            components: Arc::new(ComponentRegistry::default()),
            views,
            shell: Arc::new(shell),
        })
    }

    pub fn with_components(mut self, components: ComponentRegistry) -> Self {
        self.components = Arc::new(components);
        self
    }
}
