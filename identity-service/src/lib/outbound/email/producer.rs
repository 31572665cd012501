use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::domain::account::errors::DeliveryError;
use crate::domain::account::models::EmailMessage;
use crate::domain::account::ports::EmailSender;
use crate::outbound::email::messages::EmailOutboxMessage;

#[derive(Debug, Error)]
pub enum KafkaProducerError {
    #[error("Failed to send message to Kafka: {0}")]
    SendError(String),

    #[error("Failed to serialize message: {0}")]
    SerializationError(String),
}

impl From<KafkaProducerError> for DeliveryError {
    fn from(err: KafkaProducerError) -> Self {
        match err {
            KafkaProducerError::SerializationError(msg) => DeliveryError::SerializationFailed(msg),
            KafkaProducerError::SendError(msg) => DeliveryError::PublishFailed(msg),
        }
    }
}

/// Email sender that enqueues messages on a Kafka topic.
///
/// A successful `send` means the broker acknowledged the message, not that
/// it was delivered to the recipient.
pub struct KafkaEmailSender {
    producer: FutureProducer,
    topic: String,
    sender: String,
    timeout: Duration,
}

impl KafkaEmailSender {
    /// Create a new Kafka email sender with "at least once" delivery semantics
    ///
    /// # Notes:
    /// - `acks=all`: Wait for all in-sync replicas to acknowledge
    /// - `enable.idempotence=true`: Prevents duplicate messages during retries
    /// - `message.timeout.ms` is bounded by the dispatch timeout so a dead
    ///   broker cannot hold a request open
    pub fn new(config: &EmailConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.brokers,
            topic = %config.topic,
            "Initializing Kafka producer for email outbox"
        );

        let timeout = config.dispatch_timeout();
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", timeout.as_millis().to_string())
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "3")
            .set("retry.backoff.ms", "100")
            .create()?;

        tracing::info!("Kafka email producer initialized successfully");

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            sender: config.sender.clone(),
            timeout,
        })
    }

    async fn publish(&self, message: &EmailOutboxMessage) -> Result<(), KafkaProducerError> {
        let payload = serde_json::to_string(message)
            .map_err(|e| KafkaProducerError::SerializationError(e.to_string()))?;

        // Keyed by recipient so emails to one address stay ordered.
        let record = FutureRecord::to(&self.topic)
            .key(&message.to)
            .payload(&payload);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| {
                tracing::debug!(
                    topic = %self.topic,
                    message_id = %message.message_id,
                    "Email enqueued"
                );
            })
            .map_err(|(err, _)| KafkaProducerError::SendError(err.to_string()))
    }
}

#[async_trait]
impl EmailSender for KafkaEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), DeliveryError> {
        let outbox = EmailOutboxMessage::new(&self.sender, message, Utc::now());

        self.publish(&outbox).await.map_err(|e| {
            tracing::error!(
                message_id = %outbox.message_id,
                error = %e,
                "Failed to enqueue email"
            );
            e.into()
        })
    }
}
