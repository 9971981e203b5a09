//! Cache Manager Module
//!
//! Owns the bounded store and applies the lifecycle eviction policy to it.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError, Weak};

use tracing::{info, trace};

use crate::cache::store::{BoundedStore, CostFn};
use crate::cache::CacheStats;
use crate::config::CacheOptions;
use crate::lifecycle::{ClearAction, LifecycleEvent, LifecycleObserver, Subscription};

// == Cache Manager ==
/// Mediates between the facade and the bounded store, and reacts to
/// lifecycle signals.
///
/// A manager is always used behind the facade's mutex; lifecycle callbacks
/// take that same mutex before calling [`CacheManager::handle_event`].
#[derive(Debug)]
pub struct CacheManager<K, V> {
    store: BoundedStore<K, V>,
    evict_on_background: bool,
    /// Unregistered when the manager drops
    subscription: Option<Subscription>,
}

impl<K, V> CacheManager<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a manager with no lifecycle subscription.
    pub fn new(options: &CacheOptions, cost: Option<CostFn<V>>) -> Self {
        Self {
            store: BoundedStore::build(options.capacity(), cost),
            evict_on_background: options.evict_on_background,
            subscription: None,
        }
    }

    pub(crate) fn attach_subscription(&mut self, subscription: Subscription) {
        self.subscription = Some(subscription);
    }

    // == Get ==
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get(key)
    }

    // == Put ==
    /// Stores `value` for `key`; `None` removes the key instead.
    pub fn put(&mut self, key: K, value: Option<V>) {
        match value {
            Some(value) => {
                self.store.put(key, value);
            }
            None => {
                self.store.remove(&key);
            }
        }
    }

    // == Clear ==
    /// Empties the store. Returns the number of entries dropped.
    pub fn clear(&mut self) -> usize {
        self.store.evict_all()
    }

    // == Handle Event ==
    /// Applies a lifecycle signal. Returns the number of entries dropped.
    ///
    /// Memory pressure always clears; a background transition clears only
    /// when the manager was built with `evict_on_background`.
    pub fn handle_event(&mut self, event: LifecycleEvent) -> usize {
        let should_clear = match event.action() {
            ClearAction::Always => true,
            ClearAction::IfEvictOnBackground => self.evict_on_background,
            ClearAction::Ignore => false,
        };

        if !should_clear {
            trace!("Ignoring {}", event);
            return 0;
        }

        let dropped = self.store.evict_all();
        self.store.record_lifecycle_clear();
        info!("Lifecycle clear on {}: dropped {} entries", event, dropped);
        dropped
    }

    // == Accessors ==
    pub fn evict_on_background(&self) -> bool {
        self.evict_on_background
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    pub fn store(&self) -> &BoundedStore<K, V> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut BoundedStore<K, V> {
        &mut self.store
    }
}

// == Lifecycle Callbacks ==
/// The observer a cache registers for lifecycle signals.
///
/// Holds only a weak reference to the locked manager, so the registration
/// never keeps a cache alive. Once the cache is gone, events are ignored.
pub(crate) struct CacheCallbacks<K, V> {
    manager: Weak<Mutex<CacheManager<K, V>>>,
}

impl<K, V> CacheCallbacks<K, V> {
    pub fn new(manager: Weak<Mutex<CacheManager<K, V>>>) -> Self {
        Self { manager }
    }
}

impl<K, V> LifecycleObserver for CacheCallbacks<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
    fn on_lifecycle_event(&self, event: LifecycleEvent) {
        let Some(manager) = self.manager.upgrade() else {
            trace!("Cache already dropped, ignoring {}", event);
            return;
        };
        let mut guard = manager.lock().unwrap_or_else(PoisonError::into_inner);
        guard.handle_event(event);
    }
}
