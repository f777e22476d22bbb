//! Inbound delivery worker with bounded retry.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::Result;
use crate::inbound::{InboundEnvelope, InboundNotification};

/// Handles one inbound notification.
///
/// Implementations must tolerate redelivery: the same notification may
/// arrive more than once, and a transition replayed against an aggregate
/// that has moved on surfaces as an ordinary handler error.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn handle(&self, notification: &InboundNotification) -> Result<()>;
}

/// What became of a processed envelope.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The handler accepted the message.
    Handled,

    /// The handler failed; the returned envelope should be redelivered.
    Requeue(InboundEnvelope),

    /// Retries are exhausted; the message was dead-lettered.
    DeadLettered,
}

/// A message that exhausted its retries.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub envelope: InboundEnvelope,
    pub reason: String,
}

/// Drives inbound notifications through a handler with bounded retry.
///
/// A failed message is requeued until it has been redelivered
/// `max_redeliveries` times, then dead-lettered. The worker never panics
/// or propagates handler failures; exhaustion is a logged terminal path.
pub struct DeliveryWorker {
    handler: Arc<dyn InboundHandler>,
    max_redeliveries: u32,
    dead_letters: RwLock<Vec<DeadLetter>>,
}

impl DeliveryWorker {
    /// Creates a worker with the given retry bound.
    pub fn new(handler: Arc<dyn InboundHandler>, max_redeliveries: u32) -> Self {
        Self {
            handler,
            max_redeliveries,
            dead_letters: RwLock::new(Vec::new()),
        }
    }

    /// Processes one envelope, returning its disposition.
    pub async fn process(&self, envelope: InboundEnvelope) -> ProcessOutcome {
        let kind = envelope.notification.kind();

        match self.handler.handle(&envelope.notification).await {
            Ok(()) => {
                metrics::counter!("inbound_messages_handled_total").increment(1);
                ProcessOutcome::Handled
            }
            Err(error) if envelope.redeliveries < self.max_redeliveries => {
                metrics::counter!("inbound_message_retries_total").increment(1);
                tracing::warn!(
                    kind,
                    redeliveries = envelope.redeliveries,
                    %error,
                    "inbound message failed, requeueing"
                );
                ProcessOutcome::Requeue(envelope.redelivered())
            }
            Err(error) => {
                metrics::counter!("inbound_messages_dead_lettered_total").increment(1);
                tracing::error!(
                    kind,
                    redeliveries = envelope.redeliveries,
                    %error,
                    "inbound message exhausted retries, dead-lettering"
                );
                self.dead_letters.write().unwrap().push(DeadLetter {
                    envelope,
                    reason: error.to_string(),
                });
                ProcessOutcome::DeadLettered
            }
        }
    }

    /// Processes an envelope to completion, redelivering on failure until
    /// it is handled or dead-lettered.
    pub async fn process_with_retries(&self, envelope: InboundEnvelope) -> ProcessOutcome {
        let mut envelope = envelope;
        loop {
            match self.process(envelope).await {
                ProcessOutcome::Requeue(next) => envelope = next,
                outcome => return outcome,
            }
        }
    }

    /// Returns the dead-lettered messages.
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters.read().unwrap().clone()
    }
}
