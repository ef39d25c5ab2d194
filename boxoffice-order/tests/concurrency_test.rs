use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

use boxoffice_core::SeatId;
use boxoffice_order::{build_allocator, ReserveError, TicketService};
use boxoffice_store::AllocatorKind;
use chrono::{Duration, Utc};

const ROWS: u32 = 10;
const COLUMNS: u32 = 24;
const CAPACITY: usize = (ROWS * COLUMNS) as usize;

fn service(kind: AllocatorKind) -> Arc<TicketService> {
    let allocator = build_allocator(kind, ROWS, COLUMNS).unwrap();
    Arc::new(TicketService::new(allocator, Duration::seconds(60)))
}

fn assert_partition(ts: &TicketService) {
    let held = ts.holds().held_seats();
    let reserved = ts.reservations().reserved_seats();

    assert!(held.is_disjoint(&reserved));
    assert_eq!(held.len(), ts.held_seat_count());
    assert_eq!(reserved.len(), ts.reserved_seat_count());
    assert_eq!(ts.num_seats_available() + held.len() + reserved.len(), CAPACITY);
}

#[test]
fn test_reserve_and_sweep_race_has_one_winner() {
    for kind in [AllocatorKind::Sequential, AllocatorKind::FrontAndCenter] {
        let ts = service(kind);

        for _ in 0..60 {
            let hold = ts.find_and_hold_seats(2, "racer@example.com").unwrap();
            let barrier = Arc::new(Barrier::new(2));

            let reserver = {
                let ts = ts.clone();
                let barrier = barrier.clone();
                let (id, email) = (hold.id(), hold.email().to_string());
                thread::spawn(move || {
                    barrier.wait();
                    ts.reserve_seats(id, &email)
                })
            };
            let sweeper = {
                let ts = ts.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    // Far enough ahead that the sweeper sees the hold as expired
                    ts.sweeper().sweep_once(Utc::now() + Duration::hours(1))
                })
            };

            let reserved = reserver.join().unwrap();
            let swept = sweeper.join().unwrap();

            match reserved {
                Ok(_) => assert_eq!(swept, 0),
                Err(ReserveError::Expired(_)) | Err(ReserveError::NotFound(_)) => assert_eq!(swept, 1),
            }
            assert!(ts.holds().is_empty());
            assert_partition(&ts);
        }
    }
}

#[test]
fn test_concurrent_holds_never_overlap() {
    for kind in [AllocatorKind::Sequential, AllocatorKind::FrontAndCenter] {
        let ts = service(kind);

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let ts = ts.clone();
                thread::spawn(move || {
                    let email = format!("worker{}@example.com", worker);
                    let mut granted: Vec<BTreeSet<SeatId>> = Vec::new();
                    for i in 0..20 {
                        let Some(hold) = ts.find_and_hold_seats(1 + (worker + i) % 5, &email) else {
                            continue;
                        };
                        if i % 2 == 0 {
                            ts.reserve_seats(hold.id(), hold.email()).unwrap();
                        }
                        granted.push(hold.seats().clone());
                    }
                    granted
                })
            })
            .collect();

        let mut seen: BTreeSet<SeatId> = BTreeSet::new();
        for worker in workers {
            for seats in worker.join().unwrap() {
                assert!(seen.is_disjoint(&seats), "seats granted twice: {:?}", seats);
                seen.extend(seats);
            }
        }

        assert_partition(&ts);

        // Expire everything still held; reserved seats stay out of the pool
        ts.sweeper().sweep_once(Utc::now() + Duration::hours(1));
        assert_eq!(ts.held_seat_count(), 0);
        assert_eq!(ts.num_seats_available() + ts.reserved_seat_count(), CAPACITY);
    }
}
