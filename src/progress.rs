/*!
 * Progress emitter.
 *
 * Model services report nothing while they work, so user-facing progress
 * is synthesized: a spawned ticker publishes a monotonically increasing
 * percentage through a watch channel, bumping by a small random amount each
 * interval and saturating at a ceiling below 100 while the operation is in
 * flight. `finish` stops the ticker and publishes the single terminal 100,
 * whether the operation succeeded or failed. Dropping an unfinished handle
 * aborts the ticker without ever publishing a false 100.
 *
 * The `ProgressBoard` keys receivers by correlation id so progress for any
 * running job can be polled.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use parking_lot::RwLock;
use rand::Rng;
use tokio::sync::{oneshot, watch};
use uuid::Uuid;

use crate::app_config::ProgressConfig;

/// Smallest and largest per-tick increment
const MIN_STEP: u8 = 2;
const MAX_STEP: u8 = 9;

/// One operation's progress publisher
pub struct ProgressHandle {
    sender: Arc<watch::Sender<u8>>,
    stop: Option<oneshot::Sender<()>>,
    ticker: tokio::task::JoinHandle<()>,
    /// Set by `finish` before the terminal write; the ticker checks it
    /// under the channel lock, so no tick can land after the 100
    finished: Arc<AtomicBool>,
}

impl ProgressHandle {
    /// Start publishing pseudo-progress for one operation
    pub fn start(settings: &ProgressConfig) -> Self {
        let floor = settings.floor.min(99);
        let ceiling = settings.ceiling.clamp(floor, 99);
        let interval = Duration::from_millis(settings.interval_ms.max(10));

        let (sender, _) = watch::channel(floor);
        let sender = Arc::new(sender);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let finished = Arc::new(AtomicBool::new(false));

        let ticker_sender = Arc::clone(&sender);
        let ticker_finished = Arc::clone(&finished);
        let ticker = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            // interval fires immediately on the first tick
            timer.tick().await;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = timer.tick() => {
                        // send_if_modified stores the value whether or not
                        // anyone is subscribed; the flag check under the
                        // channel lock keeps a late tick from landing after
                        // the terminal write
                        ticker_sender.send_if_modified(|current| {
                            if ticker_finished.load(Ordering::SeqCst) || *current >= ceiling {
                                return false;
                            }
                            let step = rand::rng().random_range(MIN_STEP..=MAX_STEP);
                            *current = (*current as u16 + step as u16).min(ceiling as u16) as u8;
                            true
                        });
                    }
                }
            }
        });

        Self { sender, stop: Some(stop_tx), ticker, finished }
    }

    /// New receiver observing this operation's progress
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.sender.subscribe()
    }

    /// The last published value
    pub fn value(&self) -> u8 {
        *self.sender.borrow()
    }

    /// Stop the ticker and publish the terminal 100. Idempotent; called on
    /// success and on failure alike, because the operation is equally over.
    pub fn finish(&mut self) {
        if self.finished.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.ticker.abort();
        // send_replace stores the terminal value even with no receivers
        self.sender.send_replace(100);
        debug!("progress finished at 100");
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        // An abandoned operation must not look complete
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.ticker.abort();
    }
}

/// Pollable progress receivers for running jobs, keyed by correlation id
#[derive(Default)]
pub struct ProgressBoard {
    entries: RwLock<HashMap<Uuid, watch::Receiver<u8>>>,
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job's progress channel
    pub fn register(&self, correlation_id: Uuid, receiver: watch::Receiver<u8>) {
        self.entries.write().insert(correlation_id, receiver);
    }

    /// Current progress for a job, if it is known to the board
    pub fn poll(&self, correlation_id: &Uuid) -> Option<u8> {
        self.entries.read().get(correlation_id).map(|rx| *rx.borrow())
    }

    /// Receiver for a job's progress channel
    pub fn subscribe(&self, correlation_id: &Uuid) -> Option<watch::Receiver<u8>> {
        self.entries.read().get(correlation_id).cloned()
    }

    /// Drop a finished job's channel
    pub fn remove(&self, correlation_id: &Uuid) {
        self.entries.write().remove(correlation_id);
    }
}
