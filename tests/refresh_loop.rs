//! Refresh loop behaviour against a scripted content source.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pad_viewer::config::RefreshConfig;
use pad_viewer::error::SourceError;
use pad_viewer::fetch::ContentFetcher;
use pad_viewer::refresh::{TickOutcome, ViewController};
use pad_viewer::source::ContentSource;
use pad_viewer::PageParams;

// ── Scripted source ────────────────────────────────────────────

enum Step {
    Rev(u64),
    Fail,
    Panic,
}

/// Pad revisions come from a script; file content is whatever was set last.
struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    file: Mutex<Option<String>>,
}

impl ScriptedSource {
    fn pads(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            file: Mutex::new(None),
        })
    }

    fn file(content: &str) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(VecDeque::new()),
            file: Mutex::new(Some(content.to_string())),
        })
    }

    fn set_file(&self, content: &str) {
        *self.file.lock().unwrap() = Some(content.to_string());
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn file_content(&self, _location: &str) -> Result<Option<String>, SourceError> {
        Ok(self.file.lock().unwrap().clone())
    }

    async fn pad_revision(&self, _location: &str) -> Result<u64, SourceError> {
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Rev(rev)) => Ok(rev),
            Some(Step::Fail) => Err(SourceError::Response("pad unavailable".into())),
            Some(Step::Panic) => panic!("scripted panic"),
            None => Ok(0),
        }
    }

    async fn pad_content(&self, _location: &str, rev: u64) -> Result<Option<String>, SourceError> {
        Ok(Some(format!("rev {rev}\r\nnotes")))
    }
}

// ── Helpers ────────────────────────────────────────────────────

fn fast_intervals() -> RefreshConfig {
    RefreshConfig {
        file_interval_ms: 10,
        pad_interval_ms: 10,
        idle_interval_ms: 10,
        ..RefreshConfig::default()
    }
}

fn controller(path: &str, query: &[(&str, &str)], source: Arc<ScriptedSource>) -> ViewController {
    let pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let params = PageParams::from_request(path, &pairs).unwrap();
    ViewController::new(params, ContentFetcher::new(source), fast_intervals())
}

/// Wait until the committed render's source contains `needle`.
async fn wait_for_render(controller: &ViewController, needle: &str) -> String {
    let mut rx = controller.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let state = controller.state().read().await;
                if let Some(render) = &state.render {
                    if render.source.contains(needle) {
                        return render.source.clone();
                    }
                }
            }
            rx.changed().await.expect("pipeline stopped");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("render containing {needle:?} never arrived"))
}

// ── Tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_pad_revisions_only_move_forward() {
    let source = ScriptedSource::pads(vec![
        Step::Rev(3),
        Step::Rev(3),
        Step::Rev(5),
        Step::Rev(4),
        Step::Rev(7),
    ]);
    let view = controller("pad/team/notes", &[], source);

    let mut outcomes = Vec::new();
    for _ in 0..5 {
        outcomes.push(view.tick().await);
    }

    assert_eq!(
        outcomes,
        vec![
            TickOutcome::Submitted { revision: Some(3) },
            TickOutcome::Unchanged,
            TickOutcome::Submitted { revision: Some(5) },
            TickOutcome::Unchanged,
            TickOutcome::Submitted { revision: Some(7) },
        ]
    );

    let rendered = wait_for_render(&view, "rev 7").await;
    assert_eq!(rendered, "<MDXViewer>\nrev 7\nnotes\n</MDXViewer>\n");
    assert_eq!(view.state().read().await.revision.last_seen_revision, 7);
}

#[tokio::test]
async fn test_failed_lookup_keeps_last_render() {
    let source = ScriptedSource::pads(vec![Step::Rev(2), Step::Fail, Step::Rev(0)]);
    let view = controller("pad/notes", &[("format", "ppt")], source);

    assert_eq!(view.tick().await, TickOutcome::Submitted { revision: Some(2) });
    wait_for_render(&view, "rev 2").await;

    assert_eq!(view.tick().await, TickOutcome::Unchanged);
    assert_eq!(view.tick().await, TickOutcome::Unchanged);

    let state = view.state().read().await;
    let render = state.render.as_ref().unwrap();
    assert!(render.source.contains("<SlidePage>\nrev 2\nnotes\n</SlidePage>"));
    assert_eq!(state.revision.last_seen_revision, 2);
}

#[tokio::test]
async fn test_file_content_applied_when_changed() {
    let source = ScriptedSource::file("# One\n");
    let view = controller("file/docs/a.md", &[("format", "doc")], source.clone());

    assert_eq!(view.tick().await, TickOutcome::Submitted { revision: None });
    wait_for_render(&view, "# One").await;

    // Same text again: nothing to do
    assert_eq!(view.tick().await, TickOutcome::Unchanged);

    source.set_file("# Two\n");
    assert_eq!(view.tick().await, TickOutcome::Submitted { revision: None });
    let rendered = wait_for_render(&view, "# Two").await;
    assert!(rendered.starts_with("---\nformat: doc\n---\n<div>\n"));
}

#[tokio::test]
async fn test_invalid_frontmatter_is_not_fatal() {
    let source = ScriptedSource::file("# Good\n");
    let view = controller("file/a.md", &[], source.clone());

    view.tick().await;
    wait_for_render(&view, "# Good").await;

    source.set_file("---\ntitle: [unclosed\n---\nbody\n");
    assert_eq!(view.tick().await, TickOutcome::TransformFailed);

    let state = view.state().read().await;
    assert!(state.render.as_ref().unwrap().source.contains("# Good"));
}

#[tokio::test]
async fn test_idle_view_never_fetches() {
    let source = ScriptedSource::pads(vec![Step::Rev(9)]);
    let view = controller("pad", &[], source.clone());

    assert_eq!(view.tick().await, TickOutcome::Idle);
    assert_eq!(source.steps.lock().unwrap().len(), 1);
    assert!(view.state().read().await.render.is_none());
}

#[tokio::test]
async fn test_loop_survives_panicking_tick() {
    let source = ScriptedSource::pads(vec![Step::Panic, Step::Rev(4)]);
    let view = controller("pad/notes", &[], source);

    let handle = view.clone().spawn();
    wait_for_render(&view, "rev 4").await;
    assert!(!handle.is_finished());

    handle.stop();
    tokio::time::timeout(Duration::from_secs(1), async {
        while !handle.is_finished() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("refresh loop did not stop");
}

#[tokio::test]
async fn test_single_submission_commits_one_generation() {
    let source = ScriptedSource::pads(vec![Step::Rev(1)]);
    let view = controller("pad/notes", &[], source);

    assert_eq!(view.tick().await, TickOutcome::Submitted { revision: Some(1) });
    wait_for_render(&view, "rev 1").await;

    // Let the debouncer's trailing call run
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(view.state().read().await.generation, 1);
    assert_eq!(*view.subscribe().borrow(), 1);

    // Re-submitting the same text commits nothing new
    view.rerender().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(view.state().read().await.generation, 1);
}
