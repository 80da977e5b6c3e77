use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use crate::foundation::error::{MidirollError, MidirollResult};
use crate::render::frame::GeneratedFrame;

/// Frames allowed to wait between the renderer and the dispatcher.
pub const DEFAULT_QUEUE_CAPACITY: usize = 200;

/// Why a non-blocking push was refused. The frame is handed back.
#[derive(Debug)]
pub enum TryPushError {
    Full(GeneratedFrame),
    Closed(GeneratedFrame),
}

/// Single-producer end of the frame queue.
///
/// Dropping it marks generation as finished; the consumer drains what is left and then sees `None`.
#[derive(Debug)]
pub struct FrameProducer {
    tx: SyncSender<GeneratedFrame>,
}

#[derive(Debug)]
pub struct FrameConsumer {
    rx: Receiver<GeneratedFrame>,
}

/// Bounded FIFO between the frame loop and the encoder dispatcher.
pub fn frame_queue(capacity: usize) -> (FrameProducer, FrameConsumer) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (FrameProducer { tx }, FrameConsumer { rx })
}

impl FrameProducer {
    /// Enqueue, blocking while the queue is full.
    pub fn push(&self, frame: GeneratedFrame) -> MidirollResult<()> {
        self.tx
            .send(frame)
            .map_err(|_| MidirollError::pipeline("encoder dispatcher is not accepting frames"))
    }

    pub fn try_push(&self, frame: GeneratedFrame) -> Result<(), TryPushError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(f) => TryPushError::Full(f),
            TrySendError::Disconnected(f) => TryPushError::Closed(f),
        })
    }
}

impl FrameConsumer {
    /// Next frame in push order, blocking while the queue is empty.
    ///
    /// Returns `None` once the producer is gone and the queue is drained.
    pub fn pop(&self) -> Option<GeneratedFrame> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/queue.rs"]
mod tests;
