//! Notification Registry
//!
//! The callback-registration interface lifecycle signals arrive through, plus
//! an in-process implementation and a lazily created process-wide instance.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::debug;

use crate::lifecycle::LifecycleEvent;

// == Observer ==
/// Receives lifecycle events.
///
/// Called on whatever thread posts the event.
pub trait LifecycleObserver: Send + Sync {
    fn on_lifecycle_event(&self, event: LifecycleEvent);
}

/// A [`LifecycleObserver`] backed by a closure.
pub struct FnObserver<F>(pub F);

impl<F> LifecycleObserver for FnObserver<F>
where
    F: Fn(LifecycleEvent) + Send + Sync,
{
    fn on_lifecycle_event(&self, event: LifecycleEvent) {
        (self.0)(event)
    }
}

// == Subscription Id ==
/// Handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// == Registry Trait ==
/// Where observers register for lifecycle events.
///
/// The registry holds observers strongly until they are unregistered.
pub trait LifecycleRegistry: Send + Sync {
    fn register(&self, observer: Arc<dyn LifecycleObserver>) -> SubscriptionId;

    /// Returns false if `id` was not registered.
    fn unregister(&self, id: SubscriptionId) -> bool;
}

// == Notification Center ==
/// In-process lifecycle registry. Hosts call [`NotificationCenter::post`] when
/// the platform reports a signal.
#[derive(Default)]
pub struct NotificationCenter {
    observers: Mutex<BTreeMap<SubscriptionId, Arc<dyn LifecycleObserver>>>,
    next_id: AtomicU64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every registered observer, in registration order.
    /// Returns the number of observers notified.
    ///
    /// Observers run after the registry lock is released, so they may
    /// register or unregister (including dropping the last handle to a cache)
    /// without deadlocking.
    pub fn post(&self, event: LifecycleEvent) -> usize {
        let snapshot: Vec<Arc<dyn LifecycleObserver>> =
            self.lock_observers().values().cloned().collect();

        debug!("Posting {} to {} observers", event, snapshot.len());
        for observer in &snapshot {
            observer.on_lifecycle_event(event);
        }
        snapshot.len()
    }

    /// Number of live registrations.
    pub fn observer_count(&self) -> usize {
        self.lock_observers().len()
    }

    fn lock_observers(
        &self,
    ) -> std::sync::MutexGuard<'_, BTreeMap<SubscriptionId, Arc<dyn LifecycleObserver>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LifecycleRegistry for NotificationCenter {
    fn register(&self, observer: Arc<dyn LifecycleObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_observers().insert(id, observer);
        debug!("Registered lifecycle observer {}", id);
        id
    }

    fn unregister(&self, id: SubscriptionId) -> bool {
        let removed = self.lock_observers().remove(&id).is_some();
        if removed {
            debug!("Unregistered lifecycle observer {}", id);
        }
        removed
    }
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("observers", &self.observer_count())
            .finish()
    }
}

// == Global Center ==
static GLOBAL_CENTER: OnceLock<Arc<NotificationCenter>> = OnceLock::new();

/// The process-wide notification center used by caches that are not given
/// an explicit registry.
pub fn global() -> Arc<NotificationCenter> {
    GLOBAL_CENTER
        .get_or_init(|| Arc::new(NotificationCenter::new()))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_observer(counter: &Arc<AtomicUsize>) -> Arc<dyn LifecycleObserver> {
        let counter = Arc::clone(counter);
        Arc::new(FnObserver(move |_event: LifecycleEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn test_register_and_post() {
        let center = NotificationCenter::new();
        let counter = Arc::new(AtomicUsize::new(0));

        center.register(counting_observer(&counter));
        center.register(counting_observer(&counter));

        assert_eq!(center.observer_count(), 2);
        assert_eq!(center.post(LifecycleEvent::MemoryPressure), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unregister() {
        let center = NotificationCenter::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let id = center.register(counting_observer(&counter));
        assert!(center.unregister(id));
        assert!(!center.unregister(id), "second unregister should report absence");

        assert_eq!(center.post(LifecycleEvent::EnteringBackground), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let center = NotificationCenter::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let a = center.register(counting_observer(&counter));
        let b = center.register(counting_observer(&counter));
        assert_ne!(a, b);
    }

    #[test]
    fn test_observer_may_unregister_during_post() {
        let center = Arc::new(NotificationCenter::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let center_ref = Arc::clone(&center);
        let slot_ref = Arc::clone(&slot);
        let id = center.register(Arc::new(FnObserver(move |_event: LifecycleEvent| {
            if let Some(id) = slot_ref.lock().unwrap().take() {
                center_ref.unregister(id);
            }
        })));
        *slot.lock().unwrap() = Some(id);

        assert_eq!(center.post(LifecycleEvent::MemoryPressure), 1);
        assert_eq!(center.observer_count(), 0);
    }

    #[test]
    fn test_global_is_shared() {
        let a = global();
        let b = global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
