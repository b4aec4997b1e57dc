use serde::{Deserialize, Serialize};

/// Verdict of the causal admissibility check for an incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admissibility {
    /// Every causal dependency is satisfied; the request can be applied now.
    Apply,
    /// The request depends on write events this replica has not observed
    /// yet. Peer writes in this state are candidates for the pending buffer.
    Premature,
    /// A peer delivery whose origin slot the local clock already covers:
    /// a duplicate or out-of-date transmission. Never buffered.
    Stale,
}

impl Admissibility {
    pub fn is_apply(self) -> bool {
        matches!(self, Admissibility::Apply)
    }
}

/// Fixed-width logical clock, one slot per roster member.
///
/// Slot `i` counts client-originated writes from replica `i` that the
/// holder has observed. Slots only move forward over the lifetime of a
/// replica, with a single exception: the wholesale overwrite performed by
/// crash recovery when a restarted replica adopts a live peer's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorClock {
    slots: Vec<u64>,
}

impl VectorClock {
    /// A clock of `len` slots, all at zero (the origin clock).
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> u64 {
        self.slots[index]
    }

    pub fn slots(&self) -> &[u64] {
        &self.slots
    }

    /// True iff every slot of `self` is ≤ the corresponding slot of `other`.
    pub fn dominated_by(&self, other: &VectorClock) -> bool {
        self.slots.len() == other.slots.len()
            && self
                .slots
                .iter()
                .zip(other.slots.iter())
                .all(|(mine, theirs)| mine <= theirs)
    }

    /// Decides whether a request carrying `req` may be applied against the
    /// local clock.
    ///
    /// Client rule: admissible iff the local clock dominates `req` (a client
    /// must not claim writes this replica has not seen).
    ///
    /// Peer rule: the `origin_index` slot of `req` must be exactly one past
    /// the local slot (FIFO per origin), and no other slot of `req` may
    /// exceed the local clock (no dependency on unseen events elsewhere).
    pub fn check(&self, req: &VectorClock, origin_index: usize, from_client: bool) -> Admissibility {
        if from_client {
            if req.dominated_by(self) {
                return Admissibility::Apply;
            }
            return Admissibility::Premature;
        }

        let origin_slot = req.get(origin_index);
        let local_slot = self.get(origin_index);
        if origin_slot <= local_slot {
            return Admissibility::Stale;
        }
        if origin_slot != local_slot + 1 {
            return Admissibility::Premature;
        }
        for (index, (req_slot, mine)) in req.slots.iter().zip(self.slots.iter()).enumerate() {
            if index != origin_index && req_slot > mine {
                return Admissibility::Premature;
            }
        }
        Admissibility::Apply
    }

    /// Raises each local slot to the maximum of itself and `req`.
    pub fn merge(&mut self, req: &VectorClock) {
        for (mine, theirs) in self.slots.iter_mut().zip(req.slots.iter()) {
            if *theirs > *mine {
                *mine = *theirs;
            }
        }
    }

    /// Advances the local replica's own slot by one.
    pub fn tick(&mut self, self_index: usize) {
        self.slots[self_index] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(slots: &[u64]) -> VectorClock {
        VectorClock {
            slots: slots.to_vec(),
        }
    }

    #[test]
    fn origin_clock_is_all_zeros() {
        let vc = VectorClock::new(3);
        assert_eq!(vc.slots(), &[0, 0, 0]);
    }

    #[test]
    fn client_check_accepts_dominated_metadata() {
        let local = clock(&[2, 1, 0]);
        assert!(local.check(&clock(&[2, 1, 0]), 1, true).is_apply());
        assert!(local.check(&clock(&[1, 0, 0]), 0, true).is_apply());
        assert!(local.check(&clock(&[0, 0, 0]), 2, true).is_apply());
    }

    #[test]
    fn client_check_rejects_future_metadata() {
        let local = clock(&[0, 0, 0]);
        // A client claiming [9,0,0] has seen writes this replica has not.
        assert_eq!(
            local.check(&clock(&[9, 0, 0]), 0, true),
            Admissibility::Premature
        );
        let local = clock(&[2, 1, 0]);
        assert_eq!(
            local.check(&clock(&[2, 2, 0]), 1, true),
            Admissibility::Premature
        );
    }

    #[test]
    fn peer_check_requires_next_origin_slot() {
        let local = clock(&[1, 0, 0]);
        assert!(local.check(&clock(&[1, 1, 0]), 1, false).is_apply());
        // Two ahead: an intermediate write from the same origin is missing.
        assert_eq!(
            local.check(&clock(&[1, 2, 0]), 1, false),
            Admissibility::Premature
        );
    }

    #[test]
    fn peer_check_flags_covered_slots_as_stale() {
        let local = clock(&[1, 3, 0]);
        assert_eq!(
            local.check(&clock(&[1, 3, 0]), 1, false),
            Admissibility::Stale
        );
        assert_eq!(
            local.check(&clock(&[0, 1, 0]), 1, false),
            Admissibility::Stale
        );
    }

    #[test]
    fn peer_check_rejects_unseen_third_party_dependency() {
        // Origin slot is the expected successor, but the write was issued
        // after the origin observed a third replica's write we lack.
        let local = clock(&[0, 0, 0]);
        assert_eq!(
            local.check(&clock(&[1, 0, 1]), 0, false),
            Admissibility::Premature
        );
    }

    #[test]
    fn merge_is_slotwise_max() {
        let mut local = clock(&[2, 0, 5]);
        local.merge(&clock(&[1, 3, 5]));
        assert_eq!(local.slots(), &[2, 3, 5]);
    }

    #[test]
    fn tick_advances_only_the_own_slot() {
        let mut local = clock(&[0, 0, 0]);
        local.tick(1);
        local.tick(1);
        assert_eq!(local.slots(), &[0, 2, 0]);
    }

    #[test]
    fn dominated_by_is_slotwise() {
        assert!(clock(&[1, 1, 0]).dominated_by(&clock(&[1, 1, 1])));
        assert!(!clock(&[2, 0, 0]).dominated_by(&clock(&[1, 9, 9])));
        assert!(clock(&[0, 0, 0]).dominated_by(&clock(&[0, 0, 0])));
    }

    #[test]
    fn serializes_as_bare_array() {
        let vc = clock(&[1, 0, 2]);
        assert_eq!(serde_json::to_string(&vc).unwrap(), "[1,0,2]");
        let back: VectorClock = serde_json::from_str("[1,0,2]").unwrap();
        assert_eq!(back, vc);
    }
}
