//! Scripted loader and watcher doubles for manager tests.

use crate::error::{ConfigError, Result};
use crate::sources::Loader;
use crate::watch::{WatchStreams, Watcher};
use async_trait::async_trait;
use notify::event::{CreateKind, DataChange, ModifyKind};
use notify::{Event, EventKind};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

pub(crate) const CONFIG_PATH: &str = "/path/to/config";

/// Queue of loader responses, shared between a test and its [`ScriptedLoader`].
pub(crate) struct LoaderScript<T> {
    responses: Mutex<VecDeque<Result<T>>>,
    calls: AtomicUsize,
    parked: AtomicBool,
    released: Notify,
}

impl<T> LoaderScript<T> {
    pub(crate) fn push_ok(&self, value: T) {
        self.responses.lock().push_back(Ok(value));
    }

    pub(crate) fn push_err(&self, message: &str) {
        self.responses
            .lock()
            .push_back(Err(ConfigError::LoadError(message.to_string())));
    }

    /// Make every later load wait until [`release`](Self::release) is called.
    pub(crate) fn park(&self) {
        self.parked.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release(&self) {
        self.parked.store(false, Ordering::SeqCst);
        self.released.notify_waiters();
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub(crate) struct ScriptedLoader<T> {
    path: PathBuf,
    script: Arc<LoaderScript<T>>,
}

pub(crate) fn scripted_loader<T>() -> (ScriptedLoader<T>, Arc<LoaderScript<T>>) {
    let script = Arc::new(LoaderScript {
        responses: Mutex::new(VecDeque::new()),
        calls: AtomicUsize::new(0),
        parked: AtomicBool::new(false),
        released: Notify::new(),
    });
    let loader = ScriptedLoader {
        path: PathBuf::from(CONFIG_PATH),
        script: Arc::clone(&script),
    };
    (loader, script)
}

#[async_trait]
impl<T: Send + Sync> Loader<T> for ScriptedLoader<T> {
    async fn load_config(&self, cancel: &CancellationToken) -> Result<T> {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        if self.script.parked.load(Ordering::SeqCst) {
            self.script.released.notified().await;
        }
        if cancel.is_cancelled() {
            return Err(ConfigError::Cancelled);
        }
        self.script
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ConfigError::LoadError("script exhausted".to_string())))
    }

    fn config_path(&self) -> PathBuf {
        self.path.clone()
    }
}

/// What the manager did to its watcher.
#[derive(Default)]
pub(crate) struct WatcherProbe {
    pub(crate) added: Mutex<Vec<PathBuf>>,
    pub(crate) removed: Mutex<Vec<PathBuf>>,
    pub(crate) closes: AtomicUsize,
    pub(crate) fail_add: AtomicBool,
}

impl WatcherProbe {
    pub(crate) fn added(&self) -> Vec<PathBuf> {
        self.added.lock().clone()
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub(crate) struct ScriptedWatcher {
    probe: Arc<WatcherProbe>,
    streams: Option<WatchStreams>,
}

/// The test's side of a [`ScriptedWatcher`]: feeds events and inspects calls.
pub(crate) struct WatcherRemote {
    pub(crate) events: UnboundedSender<Event>,
    pub(crate) errors: UnboundedSender<ConfigError>,
    pub(crate) probe: Arc<WatcherProbe>,
}

pub(crate) fn scripted_watcher() -> (ScriptedWatcher, WatcherRemote) {
    let (events, errors, streams) = WatchStreams::channel();
    let probe = Arc::new(WatcherProbe::default());
    (
        ScriptedWatcher {
            probe: Arc::clone(&probe),
            streams: Some(streams),
        },
        WatcherRemote {
            events,
            errors,
            probe,
        },
    )
}

impl Watcher for ScriptedWatcher {
    fn add(&mut self, path: &Path) -> Result<()> {
        if self.probe.fail_add.load(Ordering::SeqCst) {
            return Err(ConfigError::WatchError(format!(
                "cannot watch {}",
                path.display()
            )));
        }
        self.probe.added.lock().push(path.to_path_buf());
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        self.probe.removed.lock().push(path.to_path_buf());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn take_streams(&mut self) -> Option<WatchStreams> {
        self.streams.take()
    }
}

pub(crate) fn write_event() -> Event {
    Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(PathBuf::from(CONFIG_PATH))
}

pub(crate) fn create_event() -> Event {
    Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from(CONFIG_PATH))
}
