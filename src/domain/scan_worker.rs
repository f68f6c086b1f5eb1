//! Background worker draining the scan event queue.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::domain::scan_event::ScanEvent;

/// Handles one scan event. Implementations never fail: all errors are
/// logged and counted internally.
#[async_trait]
pub trait ScanProcessor: Send + Sync {
    async fn process(&self, event: ScanEvent);
}

/// Processes scan events until every sender is dropped.
///
/// At most `concurrency` events are in flight at once. Events still running
/// when the channel closes are awaited before returning.
pub async fn run_scan_worker<P>(
    mut rx: mpsc::Receiver<ScanEvent>,
    processor: Arc<P>,
    concurrency: usize,
) where
    P: ScanProcessor + ?Sized + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        debug!(qr_code_id = event.qr_code_id, "Processing scan event");
        let processor = processor.clone();
        tasks.spawn(async move {
            processor.process(event).await;
            drop(permit);
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    info!("Scan worker stopped");
}
