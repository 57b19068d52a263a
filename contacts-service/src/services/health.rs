//! Service health indicators.
//!
//! Liveness asks "is our own call path to the datastore hung?" and is answered
//! with a minimal read. Readiness asks "can we reach the datastore?" and is
//! answered with an administrative ping. Neither mutates anything; both
//! report how long the round trip took and propagate an outage as
//! [`ContactsError::Unavailable`].

use crate::repository::{ContactsError, ContactsRepository};
use std::time::Instant;

/// Outcome of a successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub duration_micros: u64,
}

#[derive(Clone)]
pub struct HealthProbes {
    repository: ContactsRepository,
}

impl HealthProbes {
    pub fn new(repository: ContactsRepository) -> Self {
        Self { repository }
    }

    /// Fetch any one contact. An empty collection still counts as live.
    pub async fn liveness(&self) -> Result<ProbeReport, ContactsError> {
        let start = Instant::now();
        self.repository.find_one().await?;
        Ok(report(start))
    }

    pub async fn readiness(&self) -> Result<ProbeReport, ContactsError> {
        let start = Instant::now();
        self.repository.ping().await?;
        Ok(report(start))
    }
}

fn report(start: Instant) -> ProbeReport {
    ProbeReport {
        duration_micros: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
    }
}
