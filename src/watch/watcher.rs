//! The watcher capability consumed by the configuration manager.

use crate::error::{ConfigError, Result};
use notify::event::ModifyKind;
use notify::{Event, EventKind};
use std::path::Path;
use tokio::sync::mpsc;

/// The two streams a [`Watcher`] produces.
///
/// `events` carries filesystem change events for watched paths; `errors`
/// carries failures of the watch mechanism itself.
pub struct WatchStreams {
    /// Change events for watched paths.
    pub events: mpsc::UnboundedReceiver<Event>,
    /// Watcher-internal errors.
    pub errors: mpsc::UnboundedReceiver<ConfigError>,
}

impl WatchStreams {
    /// Create a connected pair of senders and streams.
    ///
    /// Watcher implementations keep the senders and hand the streams to
    /// [`Watcher::take_streams`]. Dropping both senders closes the streams.
    pub fn channel() -> (
        mpsc::UnboundedSender<Event>,
        mpsc::UnboundedSender<ConfigError>,
        Self,
    ) {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (error_tx, errors) = mpsc::unbounded_channel();
        (event_tx, error_tx, Self { events, errors })
    }
}

/// Observes filesystem paths and reports changes.
///
/// The configuration manager owns its watcher exclusively after construction
/// and closes it exactly once, when the manager's cancellation token fires.
pub trait Watcher: Send {
    /// Start watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be watched.
    fn add(&mut self, path: &Path) -> Result<()>;

    /// Stop watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be unwatched.
    fn remove(&mut self, path: &Path) -> Result<()>;

    /// Shut the watcher down. Both streams close once this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying mechanism fails to shut down.
    fn close(&mut self) -> Result<()>;

    /// Hand out the event and error streams. Returns `None` after the first call.
    fn take_streams(&mut self) -> Option<WatchStreams>;
}

/// Whether `event` reports a change to file contents.
///
/// Only content writes count. Create, remove, rename and metadata changes
/// are not writes.
pub fn is_write(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}
