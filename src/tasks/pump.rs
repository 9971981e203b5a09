//! Lifecycle Pump Task
//!
//! Background task that delivers host lifecycle signals to a notification
//! center, the way a platform delivers them on its own queue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::lifecycle::{LifecycleEvent, NotificationCenter};

/// Capacity of the channel created by [`lifecycle_channel`].
const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Creates a bounded channel suitable for [`spawn_lifecycle_pump`].
pub fn lifecycle_channel() -> (mpsc::Sender<LifecycleEvent>, mpsc::Receiver<LifecycleEvent>) {
    mpsc::channel(DEFAULT_CHANNEL_CAPACITY)
}

/// Spawns a task that posts every event received on `events` to `center`.
///
/// The task ends once every sender has been dropped, or when aborted through
/// the returned handle. Its output is the number of events forwarded.
///
/// # Arguments
/// * `center` - Notification center the caches are registered with
/// * `events` - Receiving half of the host's signal channel
///
/// # Example
/// ```
/// # tokio_test::block_on(async {
/// use lifecycle_cache::lifecycle::{LifecycleEvent, NotificationCenter};
/// use lifecycle_cache::tasks::{lifecycle_channel, spawn_lifecycle_pump};
/// use std::sync::Arc;
///
/// let center = Arc::new(NotificationCenter::new());
/// let (tx, rx) = lifecycle_channel();
/// let handle = spawn_lifecycle_pump(center, rx);
///
/// tx.send(LifecycleEvent::MemoryPressure).await.unwrap();
/// drop(tx);
/// assert_eq!(handle.await.unwrap(), 1);
/// # });
/// ```
pub fn spawn_lifecycle_pump(
    center: Arc<NotificationCenter>,
    mut events: mpsc::Receiver<LifecycleEvent>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        info!("Starting lifecycle pump");

        let mut forwarded = 0u64;
        while let Some(event) = events.recv().await {
            let notified = center.post(event);
            forwarded += 1;
            debug!("Lifecycle pump: delivered {} to {} observers", event, notified);
        }

        info!("Lifecycle pump stopped after {} events", forwarded);
        forwarded
    })
}
