//! Membership Module
//!
//! Tracks which replicas exist and which are currently believed reachable.
//!
//! ## Core Mechanisms
//! - **Roster**: The static, configuration-time list of all replica
//!   addresses, identical on every replica. A replica's position in the
//!   roster is its vector-clock slot; the roster never changes while the
//!   process runs.
//! - **View**: The live subset of the roster. Shrinks when the broadcast
//!   path's failure detector finds a peer unreachable, grows when a
//!   recovered replica announces itself. Convergence across replicas is
//!   best-effort and eventual; there is no quorum.
//! - **HTTP surface**: Peers and operators mutate the view through the
//!   `/view` endpoint (PUT to add, DELETE to remove, GET to list).

pub mod handlers;
pub mod types;

pub use types::{Roster, View};

#[cfg(test)]
mod tests;
