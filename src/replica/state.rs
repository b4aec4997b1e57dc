use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::clock::{Admissibility, VectorClock};
use crate::membership::types::{AddOutcome, RemoveOutcome, Roster, View};
use crate::replication::broadcaster::{BroadcastJob, KvWrite, Replicator};
use crate::replication::protocol::CausalMetadata;
use crate::storage::memory::{DeleteOutcome, KvStore, PutOutcome};

/// Ceiling on buffered out-of-order peer writes. Past this, premature
/// writes are rejected outright and must reach us again via recovery.
const PENDING_CAP: usize = 1024;

/// A key-value operation as decoded from the request line and body.
#[derive(Debug, Clone)]
pub enum KvOp {
    Put { value: Option<Value> },
    Get,
    Delete,
}

/// Domain-level verdict of one KV request, mapped onto HTTP by the
/// handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvStatus {
    Created,
    Updated,
    Found,
    Deleted,
    NotFound,
    KeyTooLong,
    NoValue,
    /// Causal dependencies not satisfied; the client should retry later.
    CausalRetry,
    /// Metadata whose clock width or origin index does not fit the roster.
    BadMetadata,
}

/// Everything the handler needs to answer one KV request: the verdict, a
/// value for found GETs, response metadata for non-503 outcomes, and an
/// optional broadcast job to run after the lock is gone.
#[derive(Debug)]
pub struct KvResponse {
    pub status: KvStatus,
    pub value: Option<Value>,
    pub meta: Option<CausalMetadata>,
    pub broadcast: Option<BroadcastJob>,
}

impl KvResponse {
    fn bare(status: KvStatus) -> Self {
        Self {
            status,
            value: None,
            meta: None,
            broadcast: None,
        }
    }
}

/// A peer write that arrived causally early, parked until the events it
/// depends on have been observed.
#[derive(Debug)]
struct PendingWrite {
    meta: CausalMetadata,
    write: KvWrite,
}

/// The shared mutable state of one replica: clock, store, view and the
/// pending buffer, always mutated together under one lock.
pub struct ReplicaCore {
    pub clock: VectorClock,
    pub store: KvStore,
    pub view: View,
    pending: BTreeMap<(usize, u64), PendingWrite>,
}

impl ReplicaCore {
    pub fn new(roster: &Roster) -> Self {
        Self {
            clock: VectorClock::new(roster.len()),
            store: KvStore::new(),
            view: View::full(roster),
            pending: BTreeMap::new(),
        }
    }

    /// The recovery overwrite: adopt a live peer's clock and store. The
    /// single sanctioned exception to clock monotonicity.
    pub fn install(&mut self, clock: VectorClock, kvs: HashMap<String, Value>) {
        self.clock = clock;
        self.store.replace(kvs);
        self.prune_pending();
        self.drain_pending();
    }

    fn buffer_pending(&mut self, meta: CausalMetadata, write: KvWrite) {
        if self.pending.len() >= PENDING_CAP {
            tracing::warn!(
                "pending buffer full, dropping early write for {} from replica {}",
                write.key(),
                meta.origin_index
            );
            return;
        }
        let slot = meta.clock.get(meta.origin_index);
        tracing::info!(
            "buffering early peer write for {} (origin {}, slot {})",
            write.key(),
            meta.origin_index,
            slot
        );
        self.pending
            .insert((meta.origin_index, slot), PendingWrite { meta, write });
    }

    /// Applies every buffered write whose dependencies are now satisfied,
    /// to a fixpoint: each applied write may unlock the next.
    fn drain_pending(&mut self) {
        loop {
            let ready = self.pending.iter().find_map(|(entry_key, entry)| {
                self.clock
                    .check(&entry.meta.clock, entry.meta.origin_index, false)
                    .is_apply()
                    .then_some(*entry_key)
            });
            let Some(entry_key) = ready else {
                break;
            };
            let Some(entry) = self.pending.remove(&entry_key) else {
                break;
            };

            self.clock.merge(&entry.meta.clock);
            match entry.write {
                KvWrite::Put { key, value } => {
                    let outcome = self.store.put(&key, value);
                    if !outcome.mutated() {
                        tracing::warn!("buffered peer write for {} was invalid", key);
                    }
                    tracing::info!("applied buffered peer put for {}", key);
                }
                KvWrite::Delete { key } => {
                    let _ = self.store.delete(&key);
                    tracing::info!("applied buffered peer delete for {}", key);
                }
            }
        }
    }

    /// Drops buffered writes the clock already covers, after a recovery
    /// overwrite moved the frontier.
    fn prune_pending(&mut self) {
        let clock = self.clock.clone();
        self.pending
            .retain(|(origin, slot), _| *slot > clock.get(*origin));
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// One replica of the store: the static roster, the lock-guarded core,
/// and the outbound replication path.
///
/// The process constructs exactly one of these at boot and shares it with
/// every handler.
pub struct Replica {
    roster: Arc<Roster>,
    core: Arc<Mutex<ReplicaCore>>,
    replicator: Replicator,
}

impl Replica {
    pub fn new(roster: Arc<Roster>) -> Self {
        let core = Arc::new(Mutex::new(ReplicaCore::new(&roster)));
        let replicator = Replicator::new(roster.clone(), core.clone());
        Self {
            roster,
            core,
            replicator,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn replicator(&self) -> &Replicator {
        &self.replicator
    }

    /// Shared handle to the guarded core, for the recovery task.
    pub fn state_handle(&self) -> Arc<Mutex<ReplicaCore>> {
        self.core.clone()
    }

    /// Serves one KV request. This is the atomic section: everything from
    /// the causal check to the response-metadata snapshot happens under a
    /// single lock acquisition, and the returned broadcast job (if any)
    /// carries snapshots taken at commit time.
    pub fn apply_kv(&self, key: &str, op: KvOp, meta: Option<CausalMetadata>) -> KvResponse {
        let mut core = self.core.lock().expect("replica state lock poisoned");
        let self_index = self.roster.self_index();
        let is_get = matches!(op, KvOp::Get);

        // Absent metadata is a client's first contact with the fleet.
        let from_client = meta.as_ref().map(|m| m.from_client).unwrap_or(true);

        if let Some(meta) = &meta {
            if meta.clock.len() != core.clock.len() || meta.origin_index >= core.clock.len() {
                return KvResponse::bare(KvStatus::BadMetadata);
            }

            match core
                .clock
                .check(&meta.clock, meta.origin_index, meta.from_client)
            {
                Admissibility::Apply => {}
                Admissibility::Premature => {
                    if !meta.from_client && !is_get {
                        if let Some(write) = op_to_write(key, &op) {
                            core.buffer_pending(meta.clone(), write);
                        }
                    }
                    return KvResponse::bare(KvStatus::CausalRetry);
                }
                Admissibility::Stale => {
                    tracing::debug!(
                        "dropping stale peer delivery for {} from replica {}",
                        key,
                        meta.origin_index
                    );
                    return KvResponse::bare(KvStatus::CausalRetry);
                }
            }

            if !is_get {
                core.clock.merge(&meta.clock);
            }
        }

        let (status, value) = match &op {
            KvOp::Put { value } => {
                let value = value.clone().unwrap_or(Value::Null);
                let status = match core.store.put(key, value) {
                    PutOutcome::Created => KvStatus::Created,
                    PutOutcome::Updated => KvStatus::Updated,
                    PutOutcome::KeyTooLong => KvStatus::KeyTooLong,
                    PutOutcome::NoValue => KvStatus::NoValue,
                };
                (status, None)
            }
            KvOp::Get => match core.store.get(key) {
                Some(value) => (KvStatus::Found, Some(value.clone())),
                None => (KvStatus::NotFound, None),
            },
            KvOp::Delete => match core.store.delete(key) {
                DeleteOutcome::Deleted => (KvStatus::Deleted, None),
                DeleteOutcome::NotFound => (KvStatus::NotFound, None),
            },
        };

        let mutated = matches!(
            status,
            KvStatus::Created | KvStatus::Updated | KvStatus::Deleted
        );
        if mutated {
            if from_client {
                core.clock.tick(self_index);
            }
            // This write may be the event a buffered peer write was
            // waiting on.
            core.drain_pending();
        }

        let broadcast = if mutated && from_client {
            op_to_write(key, &op).map(|write| BroadcastJob {
                write,
                meta: CausalMetadata {
                    clock: core.clock.clone(),
                    origin_index: self_index,
                    from_client: false,
                },
                peers: core.view.peers_of(self.roster.self_addr()),
            })
        } else {
            None
        };

        KvResponse {
            status,
            value,
            meta: Some(CausalMetadata {
                clock: core.clock.clone(),
                origin_index: self_index,
                from_client,
            }),
            broadcast,
        }
    }

    pub fn clock_snapshot(&self) -> VectorClock {
        let core = self.core.lock().expect("replica state lock poisoned");
        core.clock.clone()
    }

    pub fn store_dump(&self) -> HashMap<String, Value> {
        let core = self.core.lock().expect("replica state lock poisoned");
        core.store.dump()
    }

    pub fn view_add(&self, addr: &str) -> AddOutcome {
        let mut core = self.core.lock().expect("replica state lock poisoned");
        core.view.add(addr)
    }

    /// Removes a peer from the view. The local address is never removable:
    /// a replica always keeps itself in its own view while it runs.
    pub fn view_remove(&self, addr: &str) -> RemoveOutcome {
        if addr == self.roster.self_addr() {
            tracing::warn!("refusing to remove own address {} from the view", addr);
            return RemoveOutcome::NotPresent;
        }
        let mut core = self.core.lock().expect("replica state lock poisoned");
        core.view.remove(addr)
    }

    pub fn view_list(&self) -> Vec<String> {
        let core = self.core.lock().expect("replica state lock poisoned");
        core.view.list()
    }
}

fn op_to_write(key: &str, op: &KvOp) -> Option<KvWrite> {
    match op {
        KvOp::Put { value: Some(value) } => Some(KvWrite::Put {
            key: key.to_string(),
            value: value.clone(),
        }),
        KvOp::Put { value: None } => None,
        KvOp::Get => None,
        KvOp::Delete => Some(KvWrite::Delete {
            key: key.to_string(),
        }),
    }
}
