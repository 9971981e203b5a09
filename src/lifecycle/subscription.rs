//! Scoped Subscription
//!
//! Ties a registration to the lifetime of a value: registered on creation,
//! unregistered exactly once when cancelled or dropped.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::lifecycle::{LifecycleObserver, LifecycleRegistry, SubscriptionId};

// == Subscription ==
/// A live registration with a [`LifecycleRegistry`].
pub struct Subscription {
    registry: Arc<dyn LifecycleRegistry>,
    id: SubscriptionId,
    active: bool,
}

impl Subscription {
    /// Registers `observer` with `registry`.
    pub fn new(registry: Arc<dyn LifecycleRegistry>, observer: Arc<dyn LifecycleObserver>) -> Self {
        let id = registry.register(observer);
        Self {
            registry,
            id,
            active: true,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unregisters now instead of at drop.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if !self.registry.unregister(self.id) {
            warn!("Lifecycle observer {} was already unregistered", self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
