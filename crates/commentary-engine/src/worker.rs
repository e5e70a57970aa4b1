//! Background render worker: drains the queue into the narrator.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::narrator::Narrator;
use crate::queue::DispatchQueue;

/// Single consumer thread that forwards queued lines to the speech sink,
/// spacing utterances by a fixed gap so lines don't talk over each other.
#[derive(Debug)]
pub struct RenderWorker {
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Spawns the worker. It runs until the queue is closed and drained.
    pub fn spawn(
        queue: Arc<DispatchQueue>,
        narrator: Arc<dyn Narrator>,
        utterance_gap: Duration,
    ) -> Self {
        let handle = std::thread::Builder::new()
            .name("commentary-render".to_string())
            .spawn(move || {
                tracing::debug!("render worker started");
                while let Some(item) = queue.dequeue() {
                    tracing::debug!(priority = item.priority, text = %item.text, "speaking");
                    narrator.speak(&item.text);
                    if !utterance_gap.is_zero() {
                        std::thread::sleep(utterance_gap);
                    }
                }
                tracing::debug!("render worker stopped");
            })
            .ok();
        if handle.is_none() {
            tracing::warn!("could not spawn render worker; commentary will be silent");
        }
        Self { handle }
    }

    /// Waits for the worker to exit. The caller must close the queue first,
    /// otherwise this blocks until someone does.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Whether the thread is still attached (not yet joined).
    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }
}
