//! Background Tasks Module
//!
//! Host-side plumbing that runs outside any cache.
//!
//! # Tasks
//! - Lifecycle pump: forwards platform lifecycle signals from a channel into
//!   a notification center

mod pump;

pub use pump::{lifecycle_channel, spawn_lifecycle_pump};
