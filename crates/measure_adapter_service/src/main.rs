mod config;

use adapter_runner::Runner;
use common::nats::NatsClient;
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig, TelemetryProviders};
use crate::config::ServiceConfig;
use measure_adapter::{
    request_schema_validator, AdapterSettings, HttpProviderClient, MeasureAdapter,
    MeasureAdapterConfig,
};
use std::sync::Arc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
    }) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        subscribe_subject = %config.subscribe_subject,
        publish_subject = %config.publish_subject,
        "Starting measure adapter"
    );
    debug!("Configuration: {:?}", config);

    let settings = match config.load_filials() {
        Ok(filials) => AdapterSettings {
            filials,
            routes: config.provider_routes(),
        },
        Err(e) => {
            error!("Failed to load filial directory: {}", e);
            std::process::exit(1);
        }
    };

    let nats_client = match NatsClient::connect(&config.nats_url, config.nats_connect_timeout()).await
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to connect to NATS: {:#}", e);
            std::process::exit(1);
        }
    };

    let adapter_config = MeasureAdapterConfig {
        subscribe_subject: config.subscribe_subject.clone(),
        publish_subject: config.publish_subject.clone(),
    };

    // A live instance answers the sentinel on the task subject
    if nats_client
        .has_responder(
            &adapter_config.subscribe_subject,
            adapter_config.sentinel(),
            config.singleton_probe_timeout(),
        )
        .await
    {
        error!("Instance of this adapter is already running");
        if let Err(e) = nats_client.close().await {
            error!("Failed to close NATS connection: {:#}", e);
        }
        shutdown_telemetry(telemetry_providers);
        std::process::exit(0);
    }

    let schema_validator = match request_schema_validator() {
        Ok(validator) => Arc::new(validator),
        Err(e) => {
            error!("Failed to compile request schemas: {}", e);
            std::process::exit(1);
        }
    };

    let provider = match HttpProviderClient::new(
        config.provider_url.clone(),
        config.provider_request_timeout(),
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create provider client: {:#}", e);
            std::process::exit(1);
        }
    };

    let adapter = match MeasureAdapter::new(
        &nats_client,
        settings,
        schema_validator,
        provider,
        adapter_config,
    )
    .await
    {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("Failed to initialize measure adapter: {:#}", e);
            std::process::exit(1);
        }
    };

    Runner::new()
        .with_named_process("measure_adapter", adapter.into_runner_process())
        .with_closer({
            let nats_for_close = Arc::clone(&nats_client);
            move || async move {
                info!("Running cleanup tasks...");
                nats_for_close.close().await?;
                shutdown_telemetry(telemetry_providers);
                info!("Cleanup complete");
                Ok::<(), anyhow::Error>(())
            }
        })
        .with_closer_timeout(config.closer_timeout())
        .run()
        .await;
}
