//! File watching and change notification.
//!
//! Provides the [`Watcher`] capability the manager consumes, a `notify`-based
//! implementation, and subscriber-based delivery of reloaded snapshots.

mod notify_watcher;
mod subscriber;
mod watcher;

pub use notify_watcher::NotifyWatcher;
pub use subscriber::{SubscriberRegistry, SubscriptionHandle};
pub use watcher::{WatchStreams, Watcher, is_write};
