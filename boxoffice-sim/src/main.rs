use std::sync::Arc;

use anyhow::Context;
use boxoffice_order::TicketService;
use boxoffice_store::Config;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod simulation;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boxoffice_sim=info,boxoffice_order=info,boxoffice_offer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        rows = config.venue.rows,
        columns = config.venue.columns,
        allocator = ?config.venue.allocator,
        ttl_seconds = config.holds.ttl_seconds,
        "Starting box office simulation"
    );

    let service = Arc::new(TicketService::from_config(&config).context("Failed to build ticket service")?);
    let capacity = service.num_seats_available();

    let cancel = CancellationToken::new();
    let sweeper = service.start_sweeper(cancel.child_token());

    // Ctrl-C ends the run early
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, winding down");
            interrupt.cancel();
        }
    });

    let report = simulation::run(service.clone(), &config.simulation, cancel.clone()).await;
    sweeper.shutdown().await;

    println!("Order in which each seat was reserved (same number = same reservation, 0 = unreserved)\n");
    print!("{}", simulation::seat_map(config.venue.rows, config.venue.columns, &report.seat_order));
    println!();

    let summary = json!({
        "allocator": format!("{:?}", config.venue.allocator),
        "capacity": capacity,
        "available": service.num_seats_available(),
        "held": service.held_seat_count(),
        "reserved": service.reserved_seat_count(),
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
