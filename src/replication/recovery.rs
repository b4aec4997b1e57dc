use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use super::protocol::{ClockSnapshot, StoreDump, ENDPOINT_CLOCK, ENDPOINT_STORE_DUMP, ENDPOINT_VIEW};
use crate::clock::VectorClock;
use crate::membership::types::{Roster, ViewChange};
use crate::replica::state::ReplicaCore;

/// Grace period before the probe, so peers have time to bind their
/// listeners after a fleet-wide start.
const STARTUP_GRACE: Duration = Duration::from_secs(2);
/// Upper bound on each recovery HTTP call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// The startup probe that detects a crash-restart and refills local state.
///
/// A freshly started replica holds the origin clock. If any live roster
/// peer's clock differs, the only explanation under the failure model is
/// that this replica lost state it should have: the peer can only have
/// advanced through writes this replica would have observed. The fix is to
/// adopt that peer's clock and store wholesale, then announce ourselves so
/// the fleet re-admits us into its views.
pub struct Recovery {
    roster: Arc<Roster>,
    core: Arc<Mutex<ReplicaCore>>,
    http_client: reqwest::Client,
}

impl Recovery {
    pub fn new(roster: Arc<Roster>, core: Arc<Mutex<ReplicaCore>>) -> Self {
        Self {
            roster,
            core,
            http_client: reqwest::Client::new(),
        }
    }

    /// Runs the probe once. Spawned as a background task at startup.
    pub async fn run(self) {
        tokio::time::sleep(STARTUP_GRACE).await;

        for peer in self.roster.peers() {
            let peer_clock = match self.fetch_clock(peer).await {
                Ok(clock) => clock,
                Err(e) => {
                    tracing::warn!("recovery: cannot read clock of {}: {}", peer, e);
                    continue;
                }
            };

            // Writes may have landed during the grace period, and a later
            // roster peer may be further ahead than an earlier one, so the
            // comparison always uses the current local clock.
            let local_clock = {
                let core = self.core.lock().expect("replica state lock poisoned");
                core.clock.clone()
            };
            if peer_clock == local_clock {
                tracing::debug!("recovery: clock of {} matches local state", peer);
                continue;
            }

            tracing::info!(
                "recovery: local clock {:?} differs from {:?} at {}, adopting its state",
                local_clock.slots(),
                peer_clock.slots(),
                peer
            );

            let kvs = match self.fetch_store(peer).await {
                Ok(kvs) => kvs,
                Err(e) => {
                    tracing::warn!("recovery: cannot read store of {}: {}", peer, e);
                    continue;
                }
            };

            {
                let mut core = self.core.lock().expect("replica state lock poisoned");
                core.install(peer_clock, kvs);
            }
            self.announce_self().await;
        }
    }

    async fn fetch_clock(&self, peer: &str) -> Result<VectorClock> {
        let snapshot: ClockSnapshot = self
            .http_client
            .get(format!("http://{}{}", peer, ENDPOINT_CLOCK))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("clock request failed")?
            .json()
            .await
            .context("clock response is not a snapshot")?;
        Ok(snapshot.vc)
    }

    async fn fetch_store(&self, peer: &str) -> Result<HashMap<String, Value>> {
        let dump: StoreDump = self
            .http_client
            .get(format!("http://{}{}", peer, ENDPOINT_STORE_DUMP))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("store dump request failed")?
            .json()
            .await
            .context("store dump response is not a dump")?;
        Ok(dump.kvs)
    }

    /// Tells every roster peer to re-admit this replica into its view.
    async fn announce_self(&self) {
        let body = ViewChange {
            socket_address: self.roster.self_addr().to_string(),
        };

        for peer in self.roster.peers() {
            let result = self
                .http_client
                .put(format!("http://{}{}", peer, ENDPOINT_VIEW))
                .json(&body)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await;

            match result {
                Ok(_) => tracing::info!("recovery: announced self to {}", peer),
                Err(e) => tracing::warn!("recovery: announcement to {} failed: {}", peer, e),
            }
        }
    }
}
