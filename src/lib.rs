//! Causally Consistent Replicated Key-Value Store Library
//!
//! This library crate defines the core modules that make up one replica of
//! the store. It serves as the foundation for the binary executable
//! (`main.rs`); one process hosts exactly one replica out of a fixed roster.
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`clock`**: The vector-clock engine. Decides whether an incoming
//!   request's causal dependencies are satisfied, and advances the local
//!   clock on merges and client-originated writes.
//! - **`membership`**: The static roster (slot assignment for the vector
//!   clock) and the live view: the subset of replicas currently believed
//!   reachable, plus the `/view` HTTP surface that mutates it.
//! - **`storage`**: The in-memory key-value state. Values are opaque JSON,
//!   stored and returned verbatim.
//! - **`replication`**: The wire protocol shared by all replicas, the
//!   write-broadcast path with its reachability-based failure detector,
//!   and the crash-recovery probe that refills a restarted replica.
//! - **`replica`**: The request frontend. Ties clock, store, view and
//!   replicator together behind a single state lock and exposes the
//!   `/kvs`, `/getVC` and `/getKVS` endpoints.

pub mod clock;
pub mod membership;
pub mod replica;
pub mod replication;
pub mod storage;
