pub mod consumer;
pub mod handlers;
pub mod publisher;
pub mod topology;

pub use consumer::{MessageHandler, ProcessingError};
pub use publisher::EventPublisher;

use std::sync::Arc;
use std::time::Duration;

use lapin::{
    options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::BrokerConfig;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker channel not initialized")]
    ChannelUnavailable,

    #[error("publish timed out after {0:?}")]
    PublishTimeout(Duration),

    #[error(transparent)]
    Amqp(#[from] lapin::Error),

    #[error("failed to serialize message payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Owns the process's single broker connection and channel.
///
/// A supervised background task (see [`BrokerService::spawn`]) connects,
/// declares the topology, starts the registered consumers, and reconnects
/// with a fixed delay whenever the connection drops. Publishing while
/// disconnected fails fast with [`BrokerError::ChannelUnavailable`]; unsent
/// messages are never queued client-side.
pub struct BrokerService {
    url: String,
    reconnect_delay: Duration,
    publish_timeout: Duration,
    channel: RwLock<Option<Channel>>,
    handlers: RwLock<Vec<(String, Arc<dyn MessageHandler>)>>,
}

impl BrokerService {
    pub fn new(config: &BrokerConfig) -> Arc<Self> {
        Arc::new(Self {
            url: config.url.clone(),
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
            publish_timeout: Duration::from_secs(config.publish_timeout_secs),
            channel: RwLock::new(None),
            handlers: RwLock::new(Vec::new()),
        })
    }

    /// Register a durable consumer; takes effect on the next (re)connect,
    /// so registration must happen before `spawn`.
    pub async fn add_consumer(&self, queue: &str, handler: Arc<dyn MessageHandler>) {
        self.handlers.write().await.push((queue.to_string(), handler));
    }

    /// Start the connection supervisor. Runs until `shutdown` fires.
    pub fn spawn(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }

    async fn run(&self, shutdown: CancellationToken) {
        loop {
            match self.connect_and_serve(&shutdown).await {
                Ok(()) => {
                    // Voluntary close during shutdown
                }
                Err(err) => {
                    error!("Broker connection lost: {}", err);
                }
            }

            if shutdown.is_cancelled() {
                break;
            }

            info!("Reconnecting to broker in {:?}", self.reconnect_delay);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
        self.channel.write().await.take();
        info!("Broker supervisor stopped");
    }

    /// One connection lifetime: connect, declare topology, start consumers,
    /// then park until the connection errors out or shutdown is requested.
    async fn connect_and_serve(&self, shutdown: &CancellationToken) -> Result<(), BrokerError> {
        let connection = Connection::connect(&self.url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        declare_topology(&channel).await?;
        info!("Successfully connected to message broker");

        *self.channel.write().await = Some(channel.clone());

        for (queue, handler) in self.handlers.read().await.iter() {
            consumer::start_consumer(&channel, queue.clone(), handler.clone()).await?;
        }

        let (error_tx, mut error_rx) = tokio::sync::mpsc::channel::<lapin::Error>(1);
        connection.on_error(move |err| {
            let _ = error_tx.try_send(err);
        });

        tokio::select! {
            _ = shutdown.cancelled() => {
                self.channel.write().await.take();
                if let Err(err) = connection.close(200, "shutting down").await {
                    warn!("Error closing broker connection: {}", err);
                }
                Ok(())
            }
            received = error_rx.recv() => {
                self.channel.write().await.take();
                match received {
                    Some(err) => Err(BrokerError::Amqp(err)),
                    None => Ok(()),
                }
            }
        }
    }

    /// Publish a persistent JSON message, bounded by the publish timeout.
    pub async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &serde_json::Value,
    ) -> Result<(), BrokerError> {
        let channel = self
            .channel
            .read()
            .await
            .clone()
            .ok_or(BrokerError::ChannelUnavailable)?;

        let body = serde_json::to_vec(payload)?;
        let publish = async {
            let confirm = channel
                .basic_publish(
                    exchange,
                    routing_key,
                    Default::default(),
                    &body,
                    BasicProperties::default().with_delivery_mode(2),
                )
                .await?;
            confirm.await
        };

        match tokio::time::timeout(self.publish_timeout, publish).await {
            Ok(Ok(_confirmation)) => {
                debug!(
                    "Message published to exchange: {}, routing key: {}",
                    exchange, routing_key
                );
                Ok(())
            }
            Ok(Err(err)) => Err(BrokerError::Amqp(err)),
            Err(_) => Err(BrokerError::PublishTimeout(self.publish_timeout)),
        }
    }

    /// Drop the channel so in-flight publishers fail fast during shutdown.
    pub async fn close(&self) {
        self.channel.write().await.take();
    }
}

async fn declare_topology(channel: &Channel) -> Result<(), lapin::Error> {
    fn durable_exchange() -> ExchangeDeclareOptions {
        ExchangeDeclareOptions {
            durable: true,
            ..Default::default()
        }
    }
    fn durable_queue() -> QueueDeclareOptions {
        QueueDeclareOptions {
            durable: true,
            ..Default::default()
        }
    }

    channel
        .exchange_declare(
            topology::EXCHANGE_RESUME,
            ExchangeKind::Direct,
            durable_exchange(),
            FieldTable::default(),
        )
        .await?;
    channel
        .exchange_declare(
            topology::EXCHANGE_USER,
            ExchangeKind::Direct,
            durable_exchange(),
            FieldTable::default(),
        )
        .await?;

    for (queue, exchange, routing_key) in topology::BINDINGS {
        channel
            .queue_declare(queue, durable_queue(), FieldTable::default())
            .await?;
        channel
            .queue_bind(
                queue,
                exchange,
                routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;
    }

    Ok(())
}
