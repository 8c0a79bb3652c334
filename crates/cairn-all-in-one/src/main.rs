mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use cairn_metadata::{
    AddDeviceProfileRequest, DeviceProfileService, ListDeviceProfilesRequest,
};
use cairn_nats::{NatsClient, SystemEventProducer};
use common::domain::{
    DeviceProfile, DeviceResource, InMemoryMetadataStore, ResourceProperties,
    StaticUnitsOfMeasure, StaticWritableSettings,
};
use common::telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() {
    let config = match config::ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_telemetry(&TelemetryConfig {
        service_name: "cairn-all-in-one".to_string(),
        log_level: config.log_level.clone(),
    });

    info!("Starting cairn-all-in-one service");

    if let Err(err) = run(config).await {
        error!(error = %err, "service terminated with error");
        std::process::exit(1);
    }
}

async fn run(config: config::ServiceConfig) -> Result<()> {
    let timeout = Duration::from_secs(config.startup_timeout_secs);
    let nats = NatsClient::connect(&config.nats_url, timeout).await?;
    nats.ensure_stream(&config.system_events_stream).await?;

    let store = Arc::new(InMemoryMetadataStore::new());
    let producer = Arc::new(SystemEventProducer::new(
        nats.jetstream().clone(),
        config.system_events_stream.clone(),
    ));
    let settings = Arc::new(StaticWritableSettings {
        uom_validation: config.uom_validation,
        max_resources: config.max_resources,
        strict_device_profile_deletes: config.strict_device_profile_deletes,
    });
    let units = Arc::new(StaticUnitsOfMeasure::new(config.valid_units.clone()));

    let service = DeviceProfileService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        units,
        settings,
        producer,
    );

    seed_demo_profile(&service).await?;

    info!("cairn metadata service ready, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, stopping service");

    nats.close().await;
    Ok(())
}

/// Register a sample profile so a fresh deployment has a catalog entry and a
/// first system event on the stream.
async fn seed_demo_profile(service: &DeviceProfileService) -> Result<()> {
    let profile = DeviceProfile {
        name: "demo-thermostat".to_string(),
        manufacturer: "Cairn Labs".to_string(),
        model: "DT-1".to_string(),
        description: "demo thermostat profile".to_string(),
        labels: vec!["demo".to_string()],
        device_resources: vec![DeviceResource {
            name: "temperature".to_string(),
            description: "ambient temperature".to_string(),
            properties: ResourceProperties {
                value_type: "Float64".to_string(),
                read_write: "R".to_string(),
                units: "Celsius".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }],
        ..Default::default()
    };

    let id = service
        .add_device_profile(AddDeviceProfileRequest {
            correlation_id: xid::new().to_string(),
            profile,
        })
        .await?;
    info!(id = %id, "seeded demo device profile");

    let (_, total_count) = service
        .all_device_profiles(ListDeviceProfilesRequest {
            offset: 0,
            limit: -1,
            labels: Vec::new(),
        })
        .await?;
    info!(total_count, "device profiles in catalog");

    Ok(())
}
