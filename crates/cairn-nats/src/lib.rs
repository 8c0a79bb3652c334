pub mod client;
pub mod system_event_producer;

pub use client::NatsClient;
pub use system_event_producer::{SystemEventProducer, CORRELATION_ID_HEADER};
