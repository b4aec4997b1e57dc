//! Replica Frontend Module
//!
//! The request engine that ties the other subsystems together.
//!
//! ## Core Mechanisms
//! - **Atomic apply path**: Clock check, merge, store mutation, tick,
//!   pending-buffer drain and metadata snapshot all happen under one lock
//!   acquisition, so two concurrent client writes can never interleave
//!   tick and snapshot and produce duplicate or skipped slot values.
//! - **Broadcast hand-off**: The apply path returns a fully assembled
//!   broadcast job (post-tick metadata plus a view snapshot); handlers run
//!   it after the lock is released.
//! - **Pending buffer**: Peer writes that arrive causally early are parked
//!   keyed by origin slot and applied, in order, as soon as the events they
//!   depend on have been observed.

pub mod handlers;
pub mod state;

pub use state::{KvOp, Replica};
