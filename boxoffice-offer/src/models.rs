use std::collections::BTreeSet;

use boxoffice_core::SeatId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lookup key of a hold; both the id and the email must match to touch it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatHoldKey {
    pub hold_id: u64,
    pub email: String,
}

impl SeatHoldKey {
    pub fn new(hold_id: u64, email: impl Into<String>) -> Self {
        Self {
            hold_id,
            email: email.into(),
        }
    }
}

/// Temporary claim on a set of seats awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatHold {
    id: u64,
    email: String,
    seats: BTreeSet<SeatId>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SeatHold {
    pub fn new(id: u64, email: impl Into<String>, seats: BTreeSet<SeatId>, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id,
            email: email.into(),
            seats,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn seats(&self) -> &BTreeSet<SeatId> {
        &self.seats
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn key(&self) -> SeatHoldKey {
        SeatHoldKey::new(self.id, self.email.clone())
    }

    /// A hold is expired from its deadline onward
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now)
    }
}
