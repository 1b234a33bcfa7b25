use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::{FeedError, FeedEvent, ObserverError};

/// Observer callback: the accepted event plus the post-push items, newest first.
type Observer = Arc<dyn Fn(&FeedEvent, &[FeedEvent]) -> Result<(), ObserverError> + Send + Sync>;

/// Hook receiving every observer failure caught during `push`.
pub type ErrorReporter = Arc<dyn Fn(&ObserverFailure) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ObserverFailure {
    pub observer_id: u64,
    pub event: FeedEvent,
    pub error: ObserverError,
}

struct ObserverEntry {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Observer,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<ObserverEntry>,
}

pub struct BoundedLiveFeed {
    capacity: usize,
    items: Mutex<VecDeque<FeedEvent>>,
    observers: Arc<Mutex<Registry>>,
    reporter: ErrorReporter,
}

impl std::fmt::Debug for BoundedLiveFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedLiveFeed")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("observers", &self.observer_count())
            .field("reporter", &"<function>")
            .finish()
    }
}

impl BoundedLiveFeed {
    /// Create a feed whose observer failures are logged as warnings.
    pub fn new(capacity: usize) -> Result<Self, FeedError> {
        Self::with_error_reporter(capacity, Arc::new(log_observer_failure))
    }

    pub fn with_error_reporter(capacity: usize, reporter: ErrorReporter) -> Result<Self, FeedError> {
        if capacity == 0 {
            return Err(FeedError::Config("feed capacity must be greater than 0".to_string()));
        }
        Ok(Self {
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity + 1)),
            observers: Arc::new(Mutex::new(Registry::default())),
            reporter,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.observers).entries.len()
    }

    /// Insert `event` at the front, evicting the oldest entry once the feed
    /// is over capacity, then notify observers in registration order.
    ///
    /// A malformed event is rejected before any mutation and no observer runs.
    /// When observers are registered the items are copied into the slice they
    /// receive, so each such push costs O(capacity).
    pub fn push(&self, event: FeedEvent) -> Result<(), FeedError> {
        event.validate()?;

        let notify = !lock(&self.observers).entries.is_empty();
        let current = {
            let mut items = lock(&self.items);
            items.push_front(event.clone());
            if items.len() > self.capacity {
                if let Some(evicted) = items.pop_back() {
                    tracing::debug!(identifier = %evicted.identifier, "feed evicted oldest event");
                }
            }
            tracing::debug!(
                identifier = %event.identifier,
                category = %event.category,
                len = items.len(),
                "feed accepted event"
            );
            if notify {
                items.iter().cloned().collect::<Vec<_>>()
            } else {
                Vec::new()
            }
        };

        if notify {
            self.notify(&event, &current);
        }
        Ok(())
    }

    /// Register `observer`; it runs once per accepted push until the returned
    /// handle is unsubscribed.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&FeedEvent, &[FeedEvent]) -> Result<(), ObserverError> + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let mut registry = lock(&self.observers);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push(ObserverEntry {
            id,
            active: active.clone(),
            callback: Arc::new(observer),
        });
        Subscription {
            id,
            active,
            registry: Arc::downgrade(&self.observers),
        }
    }

    /// Owned copy of the current items, newest first.
    pub fn snapshot(&self) -> Vec<FeedEvent> {
        lock(&self.items).iter().cloned().collect()
    }

    fn notify(&self, event: &FeedEvent, current: &[FeedEvent]) {
        // Copy the registry so observers may unsubscribe or snapshot without
        // contending on our locks.
        let observers: Vec<(u64, Arc<AtomicBool>, Observer)> = lock(&self.observers)
            .entries
            .iter()
            .map(|entry| (entry.id, entry.active.clone(), entry.callback.clone()))
            .collect();

        for (id, active, callback) in observers {
            if !active.load(Ordering::Acquire) {
                continue;
            }
            let error = match panic::catch_unwind(AssertUnwindSafe(|| callback(event, current))) {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error,
                Err(payload) => ObserverError::Panicked(panic_message(payload.as_ref())),
            };
            (self.reporter)(&ObserverFailure {
                observer_id: id,
                event: event.clone(),
                error,
            });
        }
    }
}

/// Handle returned by `BoundedLiveFeed::subscribe`.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Remove the observer. Later calls are no-ops, as is calling this after
    /// the feed has been dropped.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).entries.retain(|entry| entry.id != self.id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn log_observer_failure(failure: &ObserverFailure) {
    tracing::warn!(
        observer_id = failure.observer_id,
        identifier = %failure.event.identifier,
        "feed observer failed: {}",
        failure.error
    );
}
