use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;

use crate::encode::png::FrameEncoder;
use crate::encode::queue::{DEFAULT_QUEUE_CAPACITY, FrameConsumer, FrameProducer, frame_queue};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MidirollError, MidirollResult};
use crate::render::frame::GeneratedFrame;

/// Options controlling the render -> encode handoff.
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Frames allowed to wait in the queue before `push` blocks.
    pub queue_capacity: usize,
    /// Encoder pool size. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames handed to the pool at once. `None` means twice the pool size.
    pub max_in_flight: Option<usize>,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            threads: None,
            max_in_flight: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames taken off the queue.
    pub frames_received: u64,
    /// Frames the encoder persisted successfully.
    pub frames_encoded: u64,
    /// Highest number of frames being encoded at the same time.
    pub peak_in_flight: usize,
}

/// Running export: a bounded queue drained by a dispatcher thread into an encoder pool.
///
/// Frames may finish encoding out of order; [`ExportPipeline::finish`] returns only after every
/// dispatched frame has completed.
pub struct ExportPipeline {
    producer: FrameProducer,
    dispatcher: JoinHandle<MidirollResult<PipelineStats>>,
}

impl ExportPipeline {
    pub fn start(encoder: Arc<dyn FrameEncoder>, opts: PipelineOpts) -> MidirollResult<Self> {
        let pool = build_thread_pool(opts.threads)?;
        if opts.max_in_flight == Some(0) {
            return Err(MidirollError::validation("max_in_flight must be >= 1 when set"));
        }
        let max_in_flight = opts
            .max_in_flight
            .unwrap_or_else(|| pool.current_num_threads() * 2)
            .max(1);
        let (producer, consumer) = frame_queue(opts.queue_capacity);

        tracing::debug!(
            queue_capacity = opts.queue_capacity.max(1),
            threads = pool.current_num_threads(),
            max_in_flight,
            "starting export pipeline"
        );

        let dispatcher = std::thread::Builder::new()
            .name("midiroll-dispatch".into())
            .spawn(move || dispatch(consumer, pool, encoder, max_in_flight))
            .map_err(|e| {
                MidirollError::pipeline(format!("failed to spawn dispatcher thread: {e}"))
            })?;

        Ok(Self {
            producer,
            dispatcher,
        })
    }

    /// Enqueue a frame, blocking while the queue is full.
    ///
    /// Fails once the dispatcher has stopped; call [`ExportPipeline::finish`] for the cause.
    pub fn push(&self, frame: GeneratedFrame) -> MidirollResult<()> {
        self.producer.push(frame)
    }

    /// Signal the end of generation and wait until every frame is persisted.
    pub fn finish(self) -> MidirollResult<PipelineStats> {
        drop(self.producer);
        self.dispatcher
            .join()
            .map_err(|_| MidirollError::pipeline("dispatcher thread panicked"))?
    }
}

fn dispatch(
    consumer: FrameConsumer,
    pool: rayon::ThreadPool,
    encoder: Arc<dyn FrameEncoder>,
    max_in_flight: usize,
) -> MidirollResult<PipelineStats> {
    let (done_tx, done_rx) = mpsc::channel::<(FrameIndex, MidirollResult<()>)>();
    let mut stats = PipelineStats::default();
    let mut first_err: Option<MidirollError> = None;
    let mut in_flight = 0usize;

    while first_err.is_none() {
        while in_flight >= max_in_flight {
            let done = done_rx
                .recv()
                .map_err(|_| MidirollError::pipeline("encoder pool disconnected"))?;
            in_flight -= 1;
            settle(done, &mut stats, &mut first_err);
        }
        if first_err.is_some() {
            break;
        }

        let Some(frame) = consumer.pop() else {
            break;
        };
        stats.frames_received += 1;
        in_flight += 1;
        stats.peak_in_flight = stats.peak_in_flight.max(in_flight);

        let encoder = Arc::clone(&encoder);
        let done = done_tx.clone();
        pool.spawn(move || {
            let index = frame.index;
            let res = catch_unwind(AssertUnwindSafe(|| encoder.encode(frame)))
                .unwrap_or_else(|_| Err(MidirollError::encode("encoder panicked")));
            let _ = done.send((index, res));
        });
    }

    // Unblocks a producer waiting on a full queue after a failure.
    drop(consumer);

    while in_flight > 0 {
        let done = done_rx
            .recv()
            .map_err(|_| MidirollError::pipeline("encoder pool disconnected"))?;
        in_flight -= 1;
        settle(done, &mut stats, &mut first_err);
    }

    match first_err {
        Some(e) => Err(e),
        None => {
            tracing::debug!(
                frames = stats.frames_encoded,
                peak_in_flight = stats.peak_in_flight,
                "export pipeline drained"
            );
            Ok(stats)
        }
    }
}

fn settle(
    done: (FrameIndex, MidirollResult<()>),
    stats: &mut PipelineStats,
    first_err: &mut Option<MidirollError>,
) {
    match done {
        (_, Ok(())) => stats.frames_encoded += 1,
        (index, Err(e)) => {
            tracing::error!(frame = index.0, error = %e, "frame encode failed");
            if first_err.is_none() {
                *first_err = Some(match e {
                    MidirollError::Encode(_) => e,
                    other => MidirollError::encode(format!("frame {}: {other}", index.0)),
                });
            }
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> MidirollResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MidirollError::validation(
            "encoder 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("midiroll-enc-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MidirollError::pipeline(format!("failed to build encoder thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/pipeline.rs"]
mod tests;
