//! Lifecycle Events
//!
//! Host signals that can cause a cache to drop its contents.

use std::fmt;

// == Trim Level ==
/// Severity reported by hosts that deliver graded memory trim requests
/// (Android's `ComponentCallbacks2.onTrimMemory`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrimLevel(pub i32);

impl TrimLevel {
    pub const RUNNING_MODERATE: TrimLevel = TrimLevel(5);
    pub const RUNNING_LOW: TrimLevel = TrimLevel(10);
    pub const RUNNING_CRITICAL: TrimLevel = TrimLevel(15);
    /// The UI is no longer visible
    pub const UI_HIDDEN: TrimLevel = TrimLevel(20);
    /// The process is in the background and may be killed
    pub const BACKGROUND: TrimLevel = TrimLevel(40);
    pub const MODERATE: TrimLevel = TrimLevel(60);
    /// The process is next in line to be killed
    pub const COMPLETE: TrimLevel = TrimLevel(80);
}

// == Clear Action ==
/// What a cache should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearAction {
    /// Clear regardless of configuration
    Always,
    /// Clear only if the cache evicts on background
    IfEvictOnBackground,
    /// Leave the cache alone
    Ignore,
}

// == Lifecycle Event ==
/// A signal delivered by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The host is low on memory
    MemoryPressure,
    /// The application is moving to the background
    EnteringBackground,
    /// A graded trim request
    TrimMemory(TrimLevel),
}

impl LifecycleEvent {
    /// Maps the event onto a clear action.
    ///
    /// Trim requests at `UI_HIDDEN` or above, including `COMPLETE`, count as
    /// a background transition. The `RUNNING_*` levels are ignored.
    pub fn action(&self) -> ClearAction {
        match self {
            LifecycleEvent::MemoryPressure => ClearAction::Always,
            LifecycleEvent::EnteringBackground => ClearAction::IfEvictOnBackground,
            LifecycleEvent::TrimMemory(level) if *level >= TrimLevel::UI_HIDDEN => {
                ClearAction::IfEvictOnBackground
            }
            LifecycleEvent::TrimMemory(_) => ClearAction::Ignore,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::MemoryPressure => write!(f, "memory pressure"),
            LifecycleEvent::EnteringBackground => write!(f, "entering background"),
            LifecycleEvent::TrimMemory(level) => write!(f, "trim memory (level {})", level.0),
        }
    }
}
