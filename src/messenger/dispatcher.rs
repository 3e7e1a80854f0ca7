use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::markup::FormattedMessage;
use crate::metrics::DeliveryMetrics;

use super::recipient::Recipient;
use super::types::{MessageError, MessageResult};

/// A reserved position in the delivery queue
struct PendingDelivery {
    recipient: Arc<dyn Recipient>,
    message: oneshot::Receiver<FormattedMessage>,
    delivered: oneshot::Sender<()>,
}

/// Handle for filling a reserved delivery position.
///
/// Dropping it unfilled gives the position up; later messages are not held
/// back by it.
pub struct DeliverySlot {
    message: oneshot::Sender<FormattedMessage>,
    delivered: oneshot::Receiver<()>,
}

impl DeliverySlot {
    /// Hand over the message and wait until the recipient has it
    pub async fn fill(self, message: FormattedMessage) -> MessageResult<()> {
        self.message
            .send(message)
            .map_err(|_| MessageError::DispatcherClosed)?;
        self.delivered
            .await
            .map_err(|_| MessageError::DispatcherClosed)
    }
}

/// Statistics for the delivery dispatcher
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Positions reserved in the queue
    pub total_reserved: AtomicU64,
    /// Messages handed to recipients
    pub total_delivered: AtomicU64,
    /// Positions given up without a message
    pub total_skipped: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_reserved: self.total_reserved.load(Ordering::Relaxed),
            total_delivered: self.total_delivered.load(Ordering::Relaxed),
            total_skipped: self.total_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub total_reserved: u64,
    pub total_delivered: u64,
    pub total_skipped: u64,
}

/// Funnels finished messages onto a single delivery task.
///
/// Positions are handed out in call order by [`reserve`](Self::reserve) and
/// drained strictly in that order, so two messages for the same recipient
/// arrive in the order they were submitted no matter which worker finished
/// formatting first.
pub struct DeliveryDispatcher {
    queue: mpsc::UnboundedSender<PendingDelivery>,
    worker: JoinHandle<()>,
    stats: Arc<DispatcherStats>,
}

impl DeliveryDispatcher {
    /// Start the delivery task on the current Tokio runtime
    pub fn spawn() -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let stats = Arc::new(DispatcherStats::default());
        let worker = tokio::spawn(run_delivery_loop(rx, stats.clone()));

        Self {
            queue,
            worker,
            stats,
        }
    }

    /// Reserve the next position in the delivery order for `recipient`
    pub fn reserve(&self, recipient: Arc<dyn Recipient>) -> MessageResult<DeliverySlot> {
        let (message_tx, message_rx) = oneshot::channel();
        let (delivered_tx, delivered_rx) = oneshot::channel();

        self.queue
            .send(PendingDelivery {
                recipient,
                message: message_rx,
                delivered: delivered_tx,
            })
            .map_err(|_| MessageError::DispatcherClosed)?;
        self.stats.total_reserved.fetch_add(1, Ordering::Relaxed);

        Ok(DeliverySlot {
            message: message_tx,
            delivered: delivered_rx,
        })
    }

    /// Deliver an already formatted message
    pub async fn deliver(
        &self,
        recipient: Arc<dyn Recipient>,
        message: FormattedMessage,
    ) -> MessageResult<()> {
        self.reserve(recipient)?.fill(message).await
    }

    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop accepting work, drain everything already reserved, and stop the
    /// delivery task
    pub async fn shutdown(self) -> DispatcherStatsSnapshot {
        drop(self.queue);
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "Delivery task terminated abnormally");
        }
        self.stats.snapshot()
    }
}

async fn run_delivery_loop(
    mut rx: mpsc::UnboundedReceiver<PendingDelivery>,
    stats: Arc<DispatcherStats>,
) {
    tracing::info!("Delivery task started");

    while let Some(pending) = rx.recv().await {
        match pending.message.await {
            Ok(message) => {
                pending.recipient.deliver(message);
                stats.total_delivered.fetch_add(1, Ordering::Relaxed);
                DeliveryMetrics::record_delivered();
                let _ = pending.delivered.send(());
            }
            Err(_) => {
                stats.total_skipped.fetch_add(1, Ordering::Relaxed);
                DeliveryMetrics::record_skipped();
                tracing::debug!(
                    recipient = %pending.recipient.name(),
                    "Delivery slot released without a message"
                );
            }
        }
    }

    tracing::info!("Delivery task stopped");
}
