//! SinkHandle - drives one sink with an isolated queue and worker task

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{Batch, BatchSink, SinkContext, SinkResult};
use observability::metrics::{
    record_batch_events, record_batch_outcome, record_batch_rejected, BatchOutcome,
    DeliveryAggregator, DeliverySummary,
};

use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send batches to worker
    tx: mpsc::Sender<Batch>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<DeliverySummary>,
}

impl SinkHandle {
    /// Spawn the worker task
    ///
    /// The worker runs `init` and `start` before pulling from the queue and
    /// calls `stop` once the queue is closed.
    pub fn spawn<S>(sink: S, ctx: SinkContext, queue_capacity: usize) -> Self
    where
        S: BatchSink + Send + Sync + 'static,
    {
        let name = ctx.name.clone();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_handle =
            tokio::spawn(async move { sink_worker(sink, ctx, rx, worker_metrics).await });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Enqueue a batch without waiting
    ///
    /// Returns false if the queue is full (batch rejected) or the worker is gone.
    pub fn try_send(&self, batch: Batch) -> bool {
        match self.tx.try_send(batch) {
            Ok(()) => {
                self.update_queue_len();
                true
            }
            Err(mpsc::error::TrySendError::Full(b)) => {
                self.metrics.inc_rejected_count();
                record_batch_rejected(&self.name);
                warn!(sink = %self.name, events = b.len(), "Queue full, batch rejected");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Enqueue a batch, waiting for queue space
    pub async fn send(&self, batch: Batch) -> bool {
        match self.tx.send(batch).await {
            Ok(()) => {
                self.update_queue_len();
                true
            }
            Err(_) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }

    fn update_queue_len(&self) {
        let queued = self.tx.max_capacity() - self.tx.capacity();
        self.metrics.set_queue_len(queued);
    }

    /// Close the queue, wait for the worker to drain it and stop the sink
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) -> DeliverySummary {
        drop(self.tx);
        match self.worker_handle.await {
            Ok(summary) => {
                debug!(sink = %self.name, "SinkHandle shutdown complete");
                summary
            }
            Err(e) => {
                error!(sink = %self.name, error = ?e, "Worker task panicked");
                DeliverySummary::default()
            }
        }
    }
}

/// Worker task that delivers batches in queue order
#[instrument(name = "sink_worker_loop", skip_all, fields(sink = %ctx.name))]
async fn sink_worker<S: BatchSink>(
    mut sink: S,
    ctx: SinkContext,
    mut rx: mpsc::Receiver<Batch>,
    metrics: Arc<SinkMetrics>,
) -> DeliverySummary {
    let name = ctx.name.clone();
    let mut aggregator = DeliveryAggregator::new();

    if let Err(e) = sink.init(&ctx).and_then(|()| sink.start()) {
        error!(sink = %name, error = %e, "Sink failed to start, discarding queued batches");
        while let Some(batch) = rx.recv().await {
            metrics.set_queue_len(rx.len());
            if batch.is_empty() {
                continue;
            }
            metrics.inc_failure_count();
            record_batch_outcome(&name, BatchOutcome::Failure, Duration::ZERO);
            aggregator.update(BatchOutcome::Failure, batch.len(), Duration::ZERO);
        }
        return aggregator.summary();
    }

    debug!(sink = %name, "Sink worker started");

    while let Some(batch) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        let started = Instant::now();
        let result = sink.consume(&batch).await;
        let elapsed = started.elapsed();

        let outcome = match result {
            None => {
                metrics.inc_skipped_count();
                BatchOutcome::Skipped
            }
            Some(SinkResult::Success) => {
                metrics.inc_delivered_count();
                BatchOutcome::Success
            }
            Some(SinkResult::Failure(e)) => {
                metrics.inc_failure_count();
                error!(sink = %name, events = batch.len(), error = %e, "Batch delivery failed");
                BatchOutcome::Failure
            }
        };

        record_batch_outcome(&name, outcome, elapsed);
        if outcome != BatchOutcome::Skipped {
            record_batch_events(&name, batch.len());
        }
        aggregator.update(outcome, batch.len(), elapsed);
    }

    sink.stop();

    let summary = aggregator.summary();
    info!(
        sink = %name,
        delivered = summary.delivered,
        failed = summary.failed,
        skipped = summary.skipped,
        "Sink worker stopped"
    );
    summary
}
