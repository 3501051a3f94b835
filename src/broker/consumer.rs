use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions},
    types::FieldTable,
    Channel,
};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("malformed message payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("handler failed: {0}")]
    Failed(String),
}

/// Pluggable business logic for one queue's messages.
///
/// The consumer acknowledges a delivery only after `handle` returns `Ok`.
/// Delivery is at-least-once, so implementations must tolerate duplicates.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, payload: serde_json::Value) -> Result<(), ProcessingError>;
}

/// Start a consumer task for one queue on the current channel.
///
/// The task ends when the channel dies; the broker supervisor starts a
/// fresh one on reconnect.
pub(crate) async fn start_consumer(
    channel: &Channel,
    queue: String,
    handler: Arc<dyn MessageHandler>,
) -> Result<(), lapin::Error> {
    let mut consumer = channel
        .basic_consume(
            &queue,
            &format!("{queue}.consumer"),
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    info!("Consumer started for queue: {}", queue);

    tokio::spawn(async move {
        while let Some(delivery) = consumer.next().await {
            let delivery = match delivery {
                Ok(delivery) => delivery,
                Err(err) => {
                    warn!("Consumer stream error on queue {}: {}", queue, err);
                    break;
                }
            };

            let outcome = match serde_json::from_slice(&delivery.data) {
                Ok(payload) => handler.handle(payload).await,
                Err(err) => Err(ProcessingError::Malformed(err)),
            };

            let result = match outcome {
                Ok(()) => delivery.ack(BasicAckOptions::default()).await,
                Err(err) => {
                    // Reject without requeue so a poison message cannot be
                    // redelivered forever; dead-lettering is queue policy.
                    error!("Handler {} failed on queue {}: {}", handler.name(), queue, err);
                    delivery
                        .nack(BasicNackOptions {
                            requeue: false,
                            ..Default::default()
                        })
                        .await
                }
            };

            if let Err(err) = result {
                warn!("Failed to settle delivery on queue {}: {}", queue, err);
                break;
            }
        }
        info!("Consumer stopped for queue: {}", queue);
    });

    Ok(())
}
