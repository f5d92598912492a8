//! Bounded screenshot queues.
//!
//! The main queue collects screenshots for a new request. The extra queue
//! collects follow-up screenshots taken while solutions are on screen.
//! When a queue is full the oldest entry is evicted and handed back to the
//! caller so its file can be removed.

use std::collections::VecDeque;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::context::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Main,
    Extra,
}

impl QueueKind {
    /// Queue that captures go to while `view` is showing.
    pub fn for_view(view: View) -> Self {
        match view {
            View::Queue => QueueKind::Main,
            View::Solutions | View::Debug => QueueKind::Extra,
        }
    }
}

#[derive(Debug)]
pub struct ScreenshotQueues {
    capacity: usize,
    main: Mutex<VecDeque<PathBuf>>,
    extra: Mutex<VecDeque<PathBuf>>,
}

impl ScreenshotQueues {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            main: Mutex::new(VecDeque::new()),
            extra: Mutex::new(VecDeque::new()),
        }
    }

    fn queue(&self, kind: QueueKind) -> &Mutex<VecDeque<PathBuf>> {
        match kind {
            QueueKind::Main => &self.main,
            QueueKind::Extra => &self.extra,
        }
    }

    /// Append a screenshot, returning the evicted oldest entry if the queue was full.
    pub fn push(&self, kind: QueueKind, path: PathBuf) -> Option<PathBuf> {
        let mut queue = self.queue(kind).lock();
        queue.push_back(path);
        if queue.len() > self.capacity {
            queue.pop_front()
        } else {
            None
        }
    }

    pub fn pop_last(&self, kind: QueueKind) -> Option<PathBuf> {
        self.queue(kind).lock().pop_back()
    }

    pub fn snapshot(&self, kind: QueueKind) -> Vec<PathBuf> {
        self.queue(kind).lock().iter().cloned().collect()
    }

    /// Empty both queues, returning everything that was removed.
    pub fn clear(&self) -> Vec<PathBuf> {
        let mut removed: Vec<PathBuf> = self.main.lock().drain(..).collect();
        removed.extend(self.extra.lock().drain(..));
        removed
    }

    pub fn len(&self, kind: QueueKind) -> usize {
        self.queue(kind).lock().len()
    }
}
