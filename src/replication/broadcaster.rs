use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpStream;

use super::protocol::{CausalMetadata, KvEnvelope, ENDPOINT_KVS, ENDPOINT_VIEW};
use crate::membership::types::{RemoveOutcome, Roster, ViewChange};
use crate::replica::state::ReplicaCore;
use serde_json::Value;

/// Dial timeout for the reachability probe ahead of a replicated write.
const WRITE_DIAL_TIMEOUT: Duration = Duration::from_secs(1);
/// Dial timeout ahead of a view-removal announcement.
const VIEW_DIAL_TIMEOUT: Duration = Duration::from_secs(2);
/// Upper bound on any single outbound HTTP request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// A client-originated mutation to push to peers.
#[derive(Debug, Clone, PartialEq)]
pub enum KvWrite {
    Put { key: String, value: Value },
    Delete { key: String },
}

impl KvWrite {
    pub fn key(&self) -> &str {
        match self {
            KvWrite::Put { key, .. } => key,
            KvWrite::Delete { key } => key,
        }
    }
}

/// One broadcast, assembled under the state lock at commit time.
///
/// `meta` carries the origin's post-tick clock with `from_client: false`;
/// `peers` is the view snapshot (minus self) taken at the same instant.
#[derive(Debug, Clone)]
pub struct BroadcastJob {
    pub write: KvWrite,
    pub meta: CausalMetadata,
    pub peers: Vec<String>,
}

/// Pushes committed client writes to peers and doubles as the fleet's
/// failure detector.
///
/// There are no retries and no outbound queue: a peer that misses a write
/// while down refills itself through recovery after restart.
pub struct Replicator {
    roster: Arc<Roster>,
    core: Arc<Mutex<ReplicaCore>>,
    http_client: reqwest::Client,
}

impl Replicator {
    pub fn new(roster: Arc<Roster>, core: Arc<Mutex<ReplicaCore>>) -> Self {
        Self {
            roster,
            core,
            http_client: reqwest::Client::new(),
        }
    }

    /// Delivers `job` to each of its peers in order. Writes to one peer are
    /// fire-and-forget; an unreachable peer triggers the removal path
    /// instead of the write.
    pub async fn disseminate(&self, job: BroadcastJob) {
        for peer in &job.peers {
            if !probe(peer, WRITE_DIAL_TIMEOUT).await {
                tracing::warn!("{} is unreachable, dropping it from the view", peer);
                self.handle_unreachable_peer(peer).await;
                continue;
            }
            self.send_write(peer, &job).await;
        }
    }

    async fn send_write(&self, peer: &str, job: &BroadcastJob) {
        let url = format!("http://{}{}/{}", peer, ENDPOINT_KVS, job.write.key());
        let (method, value) = match &job.write {
            KvWrite::Put { value, .. } => (reqwest::Method::PUT, Some(value.clone())),
            KvWrite::Delete { .. } => (reqwest::Method::DELETE, None),
        };
        let body = KvEnvelope {
            value,
            causal_metadata: Some(job.meta.clone()),
        };

        let response = self
            .http_client
            .request(method, url)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await;

        // The response body is drained but never consumed: replication is
        // one-shot, and a 503 here means the peer buffered or dropped us.
        match response {
            Ok(resp) if resp.status().is_server_error() => {
                tracing::warn!(
                    "peer {} answered {} to a replicated write for {}",
                    peer,
                    resp.status(),
                    job.write.key()
                );
            }
            Ok(_) => {
                tracing::debug!("replicated write for {} to {}", job.write.key(), peer);
            }
            Err(e) => {
                tracing::warn!("replicated write to {} failed: {}", peer, e);
            }
        }
    }

    /// Removal path of the failure detector: drop the peer locally, then
    /// tell every remaining view member (other than self and the downed
    /// peer) to drop it too.
    async fn handle_unreachable_peer(&self, downed: &str) {
        let survivors = {
            let mut core = self.core.lock().expect("replica state lock poisoned");
            if core.view.remove(downed) == RemoveOutcome::NotPresent {
                // Another broadcast already removed it and told the others.
                return;
            }
            tracing::info!("view after removing {}: {:?}", downed, core.view.list());
            core.view.peers_of(self.roster.self_addr())
        };

        for survivor in survivors {
            if survivor == downed {
                continue;
            }
            self.announce_removal(&survivor, downed).await;
        }
    }

    async fn announce_removal(&self, target: &str, downed: &str) {
        if !probe(target, VIEW_DIAL_TIMEOUT).await {
            tracing::warn!("cannot reach {} to announce that {} is down", target, downed);
            return;
        }

        let body = ViewChange {
            socket_address: downed.to_string(),
        };
        let result = self
            .http_client
            .delete(format!("http://{}{}", target, ENDPOINT_VIEW))
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(_) => tracing::info!("told {} that {} is down", target, downed),
            Err(e) => tracing::warn!("view-delete announcement to {} failed: {}", target, e),
        }
    }
}

/// Short TCP dial that doubles as the liveness probe.
async fn probe(addr: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}
