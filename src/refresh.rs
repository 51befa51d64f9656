//! Refresh loop
//!
//! Each mounted view owns one `ViewController` and one background task:
//!
//! ```text
//! tick ──► fetch ──► transform ──► debounce ──► evaluate ──► ViewState
//!   ▲                                                          │
//!   └──────────── sleep(interval for source) ◄─────────────────┘
//! ```
//!
//! Every tick runs in its own spawned task, so an error or a panic inside a
//! tick is logged and the next tick is still scheduled. Ticks never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::RefreshConfig;
use crate::fetch::{ContentFetcher, FetchOutcome};
use crate::params::{PageParams, Source};
use crate::render::{self, Debouncer, RenderContainer, ViewConfig};
use crate::transform::transform;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionState {
    pub last_seen_revision: u64,
    pub refresh_token: u64,
}

impl RevisionState {
    /// New random token for the next tick
    pub fn advance_token(&mut self) -> u64 {
        self.refresh_token = rand::random();
        self.refresh_token
    }

    /// Record `rev` if it is strictly newer; returns whether it was.
    pub fn observe(&mut self, rev: u64) -> bool {
        if rev > self.last_seen_revision {
            self.last_seen_revision = rev;
            true
        } else {
            false
        }
    }
}

/// Everything a mounted view holds between ticks
#[derive(Debug, Default)]
pub struct ViewState {
    pub config: ViewConfig,
    pub revision: RevisionState,
    /// Latest render; `None` until the first evaluation completes
    pub render: Option<RenderContainer>,
    /// Bumped whenever a render with a different source or outcome is committed
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No source to poll
    Idle,
    /// Nothing new to render
    Unchanged,
    /// Content could not be transformed; the previous render stays
    TransformFailed,
    /// New source text handed to the render pipeline
    Submitted { revision: Option<u64> },
}

#[derive(Clone)]
pub struct ViewController {
    params: Arc<PageParams>,
    fetcher: ContentFetcher,
    state: Arc<RwLock<ViewState>>,
    pipeline: Debouncer<ViewConfig>,
    intervals: RefreshConfig,
    generation_tx: Arc<watch::Sender<u64>>,
}

impl ViewController {
    /// Create the controller and spawn its render pipeline task.
    pub fn new(params: PageParams, fetcher: ContentFetcher, intervals: RefreshConfig) -> Self {
        let state = Arc::new(RwLock::new(ViewState::default()));
        let (generation_tx, _) = watch::channel(0u64);
        let generation_tx = Arc::new(generation_tx);

        let sink_state = state.clone();
        let sink_generation = generation_tx.clone();
        let (pipeline, _) = Debouncer::spawn(Duration::ZERO, move |config: ViewConfig| {
            let state = sink_state.clone();
            let generation_tx = sink_generation.clone();
            async move {
                // The debouncer's trailing call usually repeats the value just
                // rendered; a non-fatal render of the same source stands.
                let rendered = state.read().await.render.as_ref().is_some_and(|render| {
                    render.source == config.value && !render.is_fatal()
                });
                if rendered {
                    debug!("Source already rendered, evaluation skipped");
                    return;
                }

                let container = render::evaluate(&config).await;
                let mut state = state.write().await;
                let changed = state.render.as_ref().map_or(true, |previous| {
                    previous.source != container.source
                        || previous.outcome != container.outcome
                        || previous.messages != container.messages
                });
                state.config = config;
                if changed {
                    state.render = Some(container);
                    state.generation += 1;
                    generation_tx.send_replace(state.generation);
                }
            }
        });

        Self {
            params: Arc::new(params),
            fetcher,
            state,
            pipeline,
            intervals,
            generation_tx,
        }
    }

    pub fn params(&self) -> &PageParams {
        &self.params
    }

    pub fn state(&self) -> &Arc<RwLock<ViewState>> {
        &self.state
    }

    /// Receiver that changes whenever a new render is committed
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation_tx.subscribe()
    }

    /// Hand the current config to the pipeline again, e.g. on a manual retry.
    pub async fn rerender(&self) {
        let config = self.state.read().await.config.clone();
        self.pipeline.submit(config);
    }

    /// Delay before the next tick for this view's source
    pub fn interval(&self) -> Duration {
        match self.params.source {
            Source::File => self.intervals.file_interval(),
            Source::Pad => self.intervals.pad_interval(),
            Source::None => self.intervals.idle_interval(),
        }
    }

    /// Run one poll: fetch, gate, transform, submit.
    ///
    /// Pads are gated on a strictly newer revision. Files have no revision,
    /// so file content whose transformed text equals the current config
    /// value returns `Unchanged` and is not re-rendered.
    pub async fn tick(&self) -> TickOutcome {
        let (last_seen, token) = {
            let mut state = self.state.write().await;
            let token = state.revision.advance_token();
            (state.revision.last_seen_revision, token)
        };
        debug!(view = %self.params.view_key(), token, "Refresh tick");

        if self.params.source == Source::None {
            return TickOutcome::Idle;
        }

        let (content, revision) = match self.fetcher.fetch(&self.params, last_seen).await {
            FetchOutcome::Unchanged => return TickOutcome::Unchanged,
            FetchOutcome::File { content } => (content, None),
            FetchOutcome::Pad { rev, content } => (content, Some(rev)),
        };

        let value = match transform(self.params.format, &content, &self.params.query) {
            Ok(value) => value,
            Err(e) => {
                warn!(view = %self.params.view_key(), error = %e, "Transform failed (non-fatal)");
                return TickOutcome::TransformFailed;
            }
        };

        let mut state = self.state.write().await;
        match revision {
            Some(rev) => {
                if !state.revision.observe(rev) {
                    debug!(rev, last_seen = state.revision.last_seen_revision, "Stale revision dropped");
                    return TickOutcome::Unchanged;
                }
            }
            None => {
                if state.config.value == value {
                    return TickOutcome::Unchanged;
                }
            }
        }

        let config = state.config.with_value(value);
        // The sink writes the config back once evaluated; keep the gate
        // comparison current for the next file tick in the meantime.
        state.config.value = config.value.clone();
        drop(state);

        self.pipeline.submit(config);
        info!(view = %self.params.view_key(), revision, "Submitted new content");
        TickOutcome::Submitted { revision }
    }

    /// Spawn the polling loop. Dropping or aborting the handle stops it.
    pub fn spawn(self) -> RefreshHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_refresh_loop(self, shutdown_rx));
        RefreshHandle {
            task,
            shutdown: shutdown_tx,
        }
    }
}

/// Poll until shutdown. Every tick is isolated in its own task.
pub async fn run_refresh_loop(controller: ViewController, mut shutdown: watch::Receiver<bool>) {
    info!(
        view = %controller.params.view_key(),
        interval_ms = controller.interval().as_millis() as u64,
        "Refresh loop started"
    );

    loop {
        let tick_controller = controller.clone();
        match tokio::spawn(async move { tick_controller.tick().await }).await {
            Ok(outcome) => debug!(?outcome, "Refresh tick finished"),
            Err(e) => error!(error = ?e, "Refresh tick panicked, scheduling next tick"),
        }

        tokio::select! {
            _ = tokio::time::sleep(controller.interval()) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!(view = %controller.params.view_key(), "Refresh loop stopped");
}

/// Owns a running refresh loop
pub struct RefreshHandle {
    task: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl RefreshHandle {
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
