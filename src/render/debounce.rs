//! Leading + trailing debouncer
//!
//! The first submission fires immediately. After `wait` the latest value
//! submitted since then fires once more, even when nothing new arrived in
//! between. Submissions made while the sink is running collapse into that
//! trailing call.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Debouncer<T> {
    /// Spawn the debounce task. It exits once every `Debouncer` clone is dropped.
    pub fn spawn<F, Fut>(wait: Duration, mut sink: F) -> (Self, JoinHandle<()>)
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        let handle = tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                sink(first.clone()).await;

                if wait.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(wait).await;
                }

                let mut latest = first;
                let mut collapsed = 0usize;
                while let Ok(next) = rx.try_recv() {
                    latest = next;
                    collapsed += 1;
                }
                debug!(collapsed, "Debounce trailing call");
                sink(latest).await;
            }
        });

        (Self { tx }, handle)
    }

    /// Queue a value; `false` once the task has stopped.
    pub fn submit(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn recorder() -> (
        Arc<Mutex<Vec<&'static str>>>,
        impl FnMut(&'static str) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>> + Send + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink = move |value: &'static str| {
            let seen = sink_seen.clone();
            Box::pin(async move {
                seen.lock().await.push(value);
            }) as std::pin::Pin<Box<dyn Future<Output = ()> + Send>>
        };
        (seen, sink)
    }

    #[tokio::test]
    async fn test_single_call_fires_leading_and_trailing() {
        let (seen, sink) = recorder();
        let (debouncer, handle) = Debouncer::spawn(Duration::ZERO, sink);

        assert!(debouncer.submit("a"));
        drop(debouncer);
        handle.await.unwrap();

        assert_eq!(*seen.lock().await, vec!["a", "a"]);
    }

    #[tokio::test]
    async fn test_burst_collapses_to_latest() {
        let (seen, sink) = recorder();
        let (debouncer, handle) = Debouncer::spawn(Duration::from_millis(20), sink);

        debouncer.submit("a");
        debouncer.submit("b");
        debouncer.submit("c");
        drop(debouncer);
        handle.await.unwrap();

        assert_eq!(*seen.lock().await, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_submit_after_stop() {
        let (_seen, sink) = recorder();
        let (debouncer, handle) = Debouncer::spawn(Duration::ZERO, sink);
        handle.abort();
        let _ = handle.await;
        assert!(!debouncer.submit("late"));
    }
}
