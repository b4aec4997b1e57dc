//! In-Memory Storage Module
//!
//! Implements the replica-local key-value state.
//!
//! ## Core Concepts
//! - **Opaque values**: Values are arbitrary non-null JSON, held as
//!   `serde_json::Value` and returned verbatim. The store never reparses
//!   them into domain types.
//! - **Validation**: Keys longer than 50 bytes and null values are rejected
//!   at the store boundary; everything else is a plain map operation.
//! - **No durability**: State lives and dies with the process. A restarted
//!   replica refills itself through the recovery protocol, not from disk.

pub mod memory;

pub use memory::{DeleteOutcome, KvStore, PutOutcome, MAX_KEY_LEN};
