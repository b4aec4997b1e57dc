//! Replication Module
//!
//! Everything that crosses the wire between replicas.
//!
//! ## Core Mechanisms
//! - **Protocol**: Endpoint paths and the JSON shapes shared by clients and
//!   replicas, including the opaque causal metadata envelope that clients
//!   echo back on every request.
//! - **Broadcast**: A locally committed client write is pushed to every
//!   view peer, best-effort and fire-and-forget. A short TCP dial before
//!   each push doubles as the failure detector: an unreachable peer is
//!   dropped from the local view and its removal announced to survivors.
//! - **Recovery**: Shortly after startup a replica probes its roster peers'
//!   clocks. Any divergence from a live peer means the local replica lost
//!   state, so it adopts that peer's clock and store and announces itself
//!   back into the fleet's views.

pub mod broadcaster;
pub mod protocol;
pub mod recovery;

pub use broadcaster::Replicator;
pub use recovery::Recovery;

#[cfg(test)]
mod tests;
