use anyhow::Context;
use async_nats::jetstream;
use async_trait::async_trait;
use tracing::{debug, info};

use common::domain::{DomainResult, SystemEvent, SystemEventPublisher};

/// Header carrying the originating request's correlation identifier.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// JetStream-backed publisher for profile system events.
pub struct SystemEventProducer {
    jetstream: jetstream::Context,
    base_subject: String,
}

impl SystemEventProducer {
    pub fn new(jetstream: jetstream::Context, base_subject: String) -> Self {
        info!(
            "Created SystemEventProducer with base subject: {}",
            base_subject
        );
        Self {
            jetstream,
            base_subject,
        }
    }
}

/// Build the subject for an event: {base}.{source}.{type}.{action}
fn subject_for(base_subject: &str, event: &SystemEvent) -> String {
    format!(
        "{}.{}.{}.{}",
        base_subject, event.source, event.event_type, event.action
    )
}

#[async_trait]
impl SystemEventPublisher for SystemEventProducer {
    async fn publish(&self, event: SystemEvent) -> DomainResult<()> {
        let payload = serde_json::to_vec(&event).context("Failed to serialize system event")?;
        let subject = subject_for(&self.base_subject, &event);

        let mut headers = async_nats::HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, event.correlation_id.as_str());

        debug!(
            subject = %subject,
            action = %event.action,
            profile = %event.details.name,
            size_bytes = payload.len(),
            "Publishing system event"
        );

        let ack = self
            .jetstream
            .publish_with_headers(subject.clone(), headers, payload.into())
            .await
            .context("Failed to publish system event to JetStream")?;

        // Await acknowledgment from JetStream
        ack.await
            .context("Failed to receive JetStream acknowledgment")?;

        debug!(
            subject = %subject,
            correlation_id = %event.correlation_id,
            "System event published and acknowledged"
        );

        Ok(())
    }
}
