// Reference notification source: JSON lines on stdin, published envelopes on stdout

use std::sync::Arc;

use anyhow::{Context, Result};
use geofence_bridge::{pump_json_lines, Config, EventBus, TransitionWorker};
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, stdout carries events)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,geofence_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting geofence bridge");

    let config = Config::from_env().context("Failed to load configuration")?;
    let strings = config
        .string_table()
        .context("Failed to load string table")?;
    tracing::info!(?config, strings = strings.len(), "Configuration loaded");

    let bus = EventBus::with_capacity(config.bus_capacity);
    let mut listener = bus.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match listener.recv().await {
                Ok(envelope) => match serde_json::to_string(&envelope) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::error!(error = %e, "Failed to encode event envelope"),
                },
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event printer lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let dispatcher = config.dispatcher(Arc::new(strings), Arc::new(bus.clone()));
    let worker = TransitionWorker::spawn(dispatcher, config.queue_capacity);

    let input = pump_json_lines(BufReader::new(tokio::io::stdin()), &worker).await;
    tracing::info!(
        lines = input.lines,
        submitted = input.submitted,
        skipped = input.skipped,
        "Input closed"
    );

    let stats = worker.shutdown().await?;
    tracing::info!(
        handled = stats.handled,
        published = stats.published,
        "Transition worker stopped"
    );

    // Dropping the last bus handle closes the printer's receiver
    drop(bus);
    printer.await.context("Event printer task failed")?;

    Ok(())
}
