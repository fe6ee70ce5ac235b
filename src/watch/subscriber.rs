//! Subscriber-based delivery of reloaded snapshots.

use parking_lot::RwLock;
use std::sync::{Arc, Weak};

type Callback<T> = Box<dyn Fn(&Arc<T>) + Send + Sync>;

/// Internal subscriber registry state.
struct SubscriberRegistryInner<T> {
    subscribers: Vec<(usize, Callback<T>)>,
    next_id: usize,
}

/// Handle for a subscription that can be dropped to unsubscribe.
///
/// Dropping the handle removes the callback before `drop` returns. Do not
/// drop a handle from inside a callback; the registry is locked while
/// callbacks run.
pub struct SubscriptionHandle<T> {
    id: usize,
    registry: Weak<RwLock<SubscriberRegistryInner<T>>>,
}

impl<T> Drop for SubscriptionHandle<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let id = self.id;
            registry.write().subscribers.retain(|(sub_id, _)| *sub_id != id);
        }
    }
}

/// Registry of callbacks that receive every newly published snapshot.
///
/// # Examples
///
/// ```rust
/// use hotreload_config::watch::SubscriberRegistry;
/// use std::sync::Arc;
///
/// let registry = SubscriberRegistry::<u16>::new();
/// let handle = registry.subscribe(|port| println!("now listening on {}", port));
///
/// registry.notify_all(&Arc::new(9090));
///
/// // Unsubscribe by dropping the handle
/// drop(handle);
/// assert_eq!(registry.subscriber_count(), 0);
/// ```
pub struct SubscriberRegistry<T> {
    inner: Arc<RwLock<SubscriberRegistryInner<T>>>,
}

impl<T> SubscriberRegistry<T> {
    /// Create a new subscriber registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SubscriberRegistryInner {
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register `callback`. It stays registered until the handle is dropped.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle<T>
    where
        F: Fn(&Arc<T>) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));

        SubscriptionHandle {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Call every subscriber with `snapshot`, in subscription order.
    pub fn notify_all(&self, snapshot: &Arc<T>) {
        let inner = self.inner.read();
        for (_id, callback) in &inner.subscribers {
            callback(snapshot);
        }
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().subscribers.len()
    }
}

impl<T> Default for SubscriberRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SubscriberRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
