//! Integration tests driving the manager through user-supplied loader and watcher implementations.

use async_trait::async_trait;
use hotreload_config::prelude::*;
use hotreload_config::watch::WatchStreams;
use notify::event::{DataChange, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Serves queued values; fails once the queue is empty.
struct QueueLoader {
    values: parking_lot::Mutex<VecDeque<Option<u32>>>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Loader<u32> for QueueLoader {
    async fn load_config(&self, _cancel: &CancellationToken) -> Result<u32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.values.lock().pop_front().flatten() {
            Some(value) => Ok(value),
            None => Err(ConfigError::LoadError("no value available".to_string())),
        }
    }

    fn config_path(&self) -> PathBuf {
        PathBuf::from("memory://settings")
    }
}

/// Watcher whose events are fed by the test.
struct ChannelWatcher {
    streams: Option<WatchStreams>,
    closes: Arc<AtomicUsize>,
}

impl Watcher for ChannelWatcher {
    fn add(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn remove(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn take_streams(&mut self) -> Option<WatchStreams> {
        self.streams.take()
    }
}

struct Harness {
    manager: ConfigManager<u32>,
    events: UnboundedSender<Event>,
    _errors: UnboundedSender<ConfigError>,
    calls: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

fn harness(values: Vec<Option<u32>>, policy: RetryPolicy) -> Harness {
    let calls = Arc::new(AtomicUsize::new(0));
    let closes = Arc::new(AtomicUsize::new(0));
    let (events, errors, streams) = WatchStreams::channel();

    let manager = ConfigManager::<u32>::builder()
        .with_loader(QueueLoader {
            values: parking_lot::Mutex::new(values.into()),
            calls: Arc::clone(&calls),
        })
        .with_watcher(ChannelWatcher {
            streams: Some(streams),
            closes: Arc::clone(&closes),
        })
        .with_retry_policy(policy)
        .build()
        .unwrap();

    Harness {
        manager,
        events,
        _errors: errors,
        calls,
        closes,
    }
}

fn write() -> Event {
    Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
}

#[tokio::test(start_paused = true)]
async fn test_retries_until_success() {
    let h = harness(
        vec![Some(1), None, None, Some(2)],
        RetryPolicy::new(3, Duration::from_millis(10)).unwrap(),
    );
    h.manager.init(CancellationToken::new()).await.unwrap();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _sub = h.manager.subscribe(move |value| {
        let _ = tx.send(**value);
    });

    let start = Instant::now();
    h.events.send(write()).unwrap();
    assert_eq!(rx.recv().await, Some(2));

    assert!(start.elapsed() >= Duration::from_millis(20));
    assert_eq!(*h.manager.get_config(), 2);
    assert_eq!(h.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_reload_reports_one_error() {
    let h = harness(
        vec![Some(1)],
        RetryPolicy::new(3, Duration::from_millis(10)).unwrap(),
    );
    h.manager.init(CancellationToken::new()).await.unwrap();

    h.events.send(write()).unwrap();
    let errors = h.manager.listen_for_errors();
    let err = errors.recv().await.unwrap();

    assert!(matches!(err, ConfigError::LoadError(_)));
    assert_eq!(h.calls.load(Ordering::SeqCst), 4);
    assert_eq!(*h.manager.get_config(), 1);
    assert!(errors.try_recv().is_none());
}

#[tokio::test]
async fn test_remove_events_do_not_reload() {
    let h = harness(vec![Some(1), Some(2)], RetryPolicy::default());
    h.manager.init(CancellationToken::new()).await.unwrap();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _sub = h.manager.subscribe(move |value| {
        let _ = tx.send(**value);
    });

    h.events
        .send(Event::new(EventKind::Remove(RemoveKind::File)))
        .unwrap();
    h.events.send(write()).unwrap();

    assert_eq!(rx.recv().await, Some(2));
    assert_eq!(h.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_shutdown_closes_watcher_exactly_once() {
    let h = harness(vec![Some(1)], RetryPolicy::default());
    let shutdown = CancellationToken::new();
    h.manager.init(shutdown.clone()).await.unwrap();

    // a second init is a no-op and starts no second task
    h.manager.init(shutdown.clone()).await.unwrap();

    shutdown.cancel();
    h.manager.wait_for_shutdown().await;

    assert_eq!(h.closes.load(Ordering::SeqCst), 1);
    assert!(matches!(
        h.manager.remove_watcher("memory://settings").await,
        Err(ConfigError::NotInitialized)
    ));
}
