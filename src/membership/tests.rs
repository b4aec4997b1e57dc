//! Membership Module Tests
//!
//! Validates roster construction from configuration values, view mutation
//! semantics, and the `/view` wire shapes.

#[cfg(test)]
mod tests {
    use crate::membership::types::{
        AddOutcome, RemoveOutcome, Roster, View, ViewChange, ViewListing,
    };

    const VIEW: &str = "10.10.0.2:8090,10.10.0.3:8090,10.10.0.4:8090";

    fn roster_at(index: usize) -> Roster {
        let addrs: Vec<&str> = VIEW.split(',').collect();
        Roster::new(addrs[index], VIEW).unwrap()
    }

    // ============================================================
    // ROSTER TESTS
    // ============================================================

    #[test]
    fn roster_assigns_slots_by_view_order() {
        let roster = roster_at(1);
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.self_index(), 1);
        assert_eq!(roster.self_addr(), "10.10.0.3:8090");
        assert_eq!(roster.addrs()[0], "10.10.0.2:8090");
    }

    #[test]
    fn roster_trims_whitespace_in_view() {
        let roster = Roster::new("b:8090", " a:8090 , b:8090 ,c:8090").unwrap();
        assert_eq!(roster.self_index(), 1);
        assert_eq!(roster.addrs(), &["a:8090", "b:8090", "c:8090"]);
    }

    #[test]
    fn roster_rejects_address_outside_view() {
        let err = Roster::new("10.10.0.9:8090", VIEW).unwrap_err();
        assert!(err.to_string().contains("does not appear in VIEW"));
    }

    #[test]
    fn roster_rejects_empty_view() {
        assert!(Roster::new("a:8090", "").is_err());
    }

    #[test]
    fn roster_peers_excludes_self() {
        let roster = roster_at(0);
        let peers: Vec<&str> = roster.peers().collect();
        assert_eq!(peers, vec!["10.10.0.3:8090", "10.10.0.4:8090"]);
    }

    #[test]
    fn roster_self_port() {
        assert_eq!(roster_at(2).self_port().unwrap(), 8090);
        assert!(Roster::new("noport", "noport").unwrap().self_port().is_err());
    }

    // ============================================================
    // VIEW TESTS
    // ============================================================

    #[test]
    fn view_starts_with_full_roster() {
        let view = View::full(&roster_at(0));
        assert_eq!(view.len(), 3);
        assert!(view.contains("10.10.0.4:8090"));
    }

    #[test]
    fn view_add_is_idempotent() {
        let mut view = View::full(&roster_at(0));
        view.remove("10.10.0.4:8090");

        assert_eq!(view.add("10.10.0.4:8090"), AddOutcome::Added);
        assert_eq!(view.add("10.10.0.4:8090"), AddOutcome::AlreadyPresent);
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn view_remove_reports_presence() {
        let mut view = View::full(&roster_at(0));
        assert_eq!(view.remove("10.10.0.3:8090"), RemoveOutcome::Deleted);
        assert_eq!(view.remove("10.10.0.3:8090"), RemoveOutcome::NotPresent);
        assert!(!view.contains("10.10.0.3:8090"));
    }

    #[test]
    fn view_list_preserves_insertion_order() {
        let mut view = View::full(&roster_at(0));
        view.remove("10.10.0.2:8090");
        view.add("10.10.0.2:8090");

        // Re-added members go to the back.
        assert_eq!(
            view.list(),
            vec!["10.10.0.3:8090", "10.10.0.4:8090", "10.10.0.2:8090"]
        );
    }

    #[test]
    fn view_peers_of_excludes_the_given_address() {
        let view = View::full(&roster_at(0));
        let peers = view.peers_of("10.10.0.2:8090");
        assert_eq!(peers, vec!["10.10.0.3:8090", "10.10.0.4:8090"]);
    }

    // ============================================================
    // WIRE SHAPE TESTS
    // ============================================================

    #[test]
    fn view_change_uses_hyphenated_field() {
        let change: ViewChange =
            serde_json::from_str(r#"{"socket-address": "10.10.0.2:8090"}"#).unwrap();
        assert_eq!(change.socket_address, "10.10.0.2:8090");

        let encoded = serde_json::to_string(&change).unwrap();
        assert!(encoded.contains("socket-address"));
    }

    #[test]
    fn view_listing_round_trips() {
        let listing = ViewListing {
            view: vec!["a:1".to_string(), "b:2".to_string()],
        };
        let encoded = serde_json::to_string(&listing).unwrap();
        assert_eq!(encoded, r#"{"view":["a:1","b:2"]}"#);
    }
}
