//! Lifecycle Module
//!
//! Host lifecycle signals (memory pressure, background transitions) and the
//! registry caches subscribe to them through.

mod event;
mod registry;
mod subscription;

pub use event::{ClearAction, LifecycleEvent, TrimLevel};
pub use registry::{
    global, FnObserver, LifecycleObserver, LifecycleRegistry, NotificationCenter, SubscriptionId,
};
pub use subscription::Subscription;
