use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use boxoffice_core::seat::seat_id;
use boxoffice_core::SeatId;
use boxoffice_order::TicketService;
use boxoffice_store::app_config::SimulationConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Outcome of one simulated booking rush
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub holds: usize,
    pub shortfalls: usize,
    pub reservations: usize,
    pub abandoned: usize,
    pub rejected: usize,
    /// Reservation number (1-based, in confirmation order) per seat
    #[serde(skip)]
    pub seat_order: HashMap<SeatId, usize>,
}

impl Report {
    fn merge(&mut self, other: Report) {
        self.holds += other.holds;
        self.shortfalls += other.shortfalls;
        self.reservations += other.reservations;
        self.abandoned += other.abandoned;
        self.rejected += other.rejected;
        self.seat_order.extend(other.seat_order);
    }
}

/// Run customers against `service` until the venue is nearly full or `cancel` fires.
pub async fn run(service: Arc<TicketService>, sim: &SimulationConfig, cancel: CancellationToken) -> Report {
    let order = Arc::new(AtomicUsize::new(0));
    let mut workers = Vec::with_capacity(sim.workers);

    for worker in 0..sim.workers {
        workers.push(tokio::spawn(customer(
            worker,
            service.clone(),
            sim.clone(),
            order.clone(),
            cancel.clone(),
        )));
    }

    let mut report = Report::default();
    for handle in workers {
        match handle.await {
            Ok(partial) => report.merge(partial),
            Err(e) => warn!("Customer task failed: {}", e),
        }
    }
    report
}

async fn customer(
    worker: usize,
    service: Arc<TicketService>,
    sim: SimulationConfig,
    order: Arc<AtomicUsize>,
    cancel: CancellationToken,
) -> Report {
    let mut rng = StdRng::from_entropy();
    let mut report = Report::default();
    let email = format!("customer{}@boxoffice.test", worker);

    while !cancel.is_cancelled() {
        if service.num_seats_available() <= sim.stop_when_available_at_most {
            info!(worker, available = service.num_seats_available(), "Venue nearly full, stopping");
            cancel.cancel();
            break;
        }

        let party = rng.gen_range(1..=sim.max_party_size);
        let think = Duration::from_millis(rng.gen_range(sim.min_think_ms..=sim.max_think_ms));

        let Some(hold) = service.find_and_hold_seats(party, &email) else {
            report.shortfalls += 1;
            if pause(&cancel, think).await {
                break;
            }
            continue;
        };
        report.holds += 1;

        if pause(&cancel, think).await {
            break;
        }

        if !rng.gen_bool(sim.reserve_ratio) {
            report.abandoned += 1;
            continue;
        }

        match service.reserve_seats(hold.id(), hold.email()) {
            Ok(_) => {
                let number = order.fetch_add(1, Ordering::Relaxed) + 1;
                report.reservations += 1;
                report.seat_order.extend(hold.seats().iter().map(|seat| (*seat, number)));
            }
            Err(e) => {
                warn!(worker, code = e.code(), "Could not reserve held seats: {}", e);
                report.rejected += 1;
            }
        }
    }

    report
}

/// Sleep for `think`; returns `true` if cancelled first
async fn pause(cancel: &CancellationToken, think: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(think) => false,
    }
}

/// Grid of reservation numbers, one line per row; 0 marks an unreserved seat.
pub fn seat_map(rows: u32, columns: u32, seat_order: &HashMap<SeatId, usize>) -> String {
    let mut out = String::new();
    for row in 1..=rows {
        let line: Vec<String> = (1..=columns)
            .map(|column| {
                let seat = seat_id(row, column);
                format!("{:3}", seat_order.get(&seat).copied().unwrap_or(0))
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}
