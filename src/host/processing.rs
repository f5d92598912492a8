//! Hands queued screenshots to an external processor.
//!
//! There is no backend in this crate. A processing request is announced as a
//! `processing-start` window event carrying the queued paths and a request
//! generation; whoever consumes the event stream does the work. Cancelling
//! bumps the generation so results tagged with an older one can be dropped.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use super::queues::{QueueKind, ScreenshotQueues};
use super::WindowSlot;
use crate::context::ProcessingController;

pub struct ProcessingBridge {
    queues: Arc<ScreenshotQueues>,
    window: WindowSlot,
    generation: AtomicU64,
    in_flight: AtomicBool,
}

impl ProcessingBridge {
    pub fn new(queues: Arc<ScreenshotQueues>, window: WindowSlot) -> Self {
        Self {
            queues,
            window,
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Mark the request of `generation` finished. Stale generations are ignored.
    pub fn complete(&self, generation: u64) -> bool {
        if generation != self.generation() {
            debug!(generation, current = self.generation(), "Ignoring stale result");
            return false;
        }
        self.in_flight.store(false, Ordering::SeqCst);
        true
    }
}

impl ProcessingController for ProcessingBridge {
    fn process_screenshots(&self) -> impl Future<Output = ()> + Send {
        async move {
            let Some(window) = self.window.lock().clone() else {
                debug!("No window to report processing to");
                return;
            };

            let screenshots = self.queues.snapshot(QueueKind::Main);
            if screenshots.is_empty() {
                info!("No screenshots to process");
                window.emit("processing-no-screenshots", json!({}));
                return;
            }

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.in_flight.store(true, Ordering::SeqCst);
            info!(generation, count = screenshots.len(), "Processing requested");
            window.emit(
                "processing-start",
                json!({ "generation": generation, "screenshots": screenshots }),
            );
        }
    }

    fn cancel_ongoing_requests(&self) {
        let was_in_flight = self.in_flight.swap(false, Ordering::SeqCst);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if was_in_flight {
            info!(generation, "Processing cancelled");
            if let Some(window) = self.window.lock().clone() {
                window.emit("processing-cancelled", json!({ "generation": generation }));
            }
        }
    }
}
