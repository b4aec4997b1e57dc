//! Vector Clock Module
//!
//! Implements the logical clock that drives causal consistency decisions.
//!
//! ## Core Mechanisms
//! - **Admissibility**: Every incoming request carries the sender's clock
//!   snapshot. Client requests are admitted when the local clock dominates
//!   the snapshot; peer replication requests additionally must be the next
//!   event in FIFO order from their origin replica.
//! - **Merge**: After an admitted non-GET request, the local clock is raised
//!   to the slot-wise maximum of itself and the request clock.
//! - **Tick**: The local slot advances only when a client-originated write
//!   actually mutates the store, so slot `i` counts, fleet-wide, the client
//!   writes originated at replica `i` that the holder has observed.

pub mod vector;

pub use vector::{Admissibility, VectorClock};
