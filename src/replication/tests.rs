//! Replication Module Tests
//!
//! Pins the wire shapes shared by clients and replicas: field names are
//! part of the protocol (clients echo metadata opaquely, and peers parse
//! it), so these tests guard exact JSON spelling.

#[cfg(test)]
mod tests {
    use crate::clock::VectorClock;
    use crate::replication::broadcaster::KvWrite;
    use crate::replication::protocol::{
        CausalMetadata, ClockSnapshot, KvEnvelope, KvReply, StoreDump,
    };
    use serde_json::json;

    fn clock(slots: &str) -> VectorClock {
        serde_json::from_str(slots).unwrap()
    }

    #[test]
    fn causal_metadata_uses_the_legacy_field_names() {
        let meta = CausalMetadata {
            clock: clock("[1,0,2]"),
            origin_index: 2,
            from_client: false,
        };
        let encoded = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            encoded,
            json!({"ReqVector": [1, 0, 2], "ReqIpIndex": 2, "IsReqFromClient": false})
        );

        let decoded: CausalMetadata = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, meta);
    }

    #[test]
    fn absent_and_null_metadata_both_mean_first_contact() {
        let envelope: KvEnvelope = serde_json::from_str(r#"{"value": 5}"#).unwrap();
        assert!(envelope.causal_metadata.is_none());
        assert_eq!(envelope.value, Some(json!(5)));

        let envelope: KvEnvelope =
            serde_json::from_str(r#"{"value": 5, "causal-metadata": null}"#).unwrap();
        assert!(envelope.causal_metadata.is_none());

        // GET and DELETE bodies carry no value at all.
        let envelope: KvEnvelope = serde_json::from_str(r#"{"causal-metadata": null}"#).unwrap();
        assert!(envelope.value.is_none());
    }

    #[test]
    fn envelope_round_trips_through_the_broadcast_path() {
        let meta = CausalMetadata {
            clock: clock("[2,0,0]"),
            origin_index: 0,
            from_client: false,
        };
        let outbound = KvEnvelope {
            value: Some(json!({"n": 1})),
            causal_metadata: Some(meta.clone()),
        };

        let wire = serde_json::to_string(&outbound).unwrap();
        let inbound: KvEnvelope = serde_json::from_str(&wire).unwrap();
        assert_eq!(inbound.value, Some(json!({"n": 1})));
        assert_eq!(inbound.causal_metadata, Some(meta));
    }

    #[test]
    fn reply_omits_absent_fields() {
        let meta = CausalMetadata {
            clock: clock("[1,0,0]"),
            origin_index: 0,
            from_client: true,
        };
        let encoded = serde_json::to_value(KvReply::result("created", meta)).unwrap();
        assert_eq!(
            encoded,
            json!({
                "result": "created",
                "causal-metadata":
                    {"ReqVector": [1, 0, 0], "ReqIpIndex": 0, "IsReqFromClient": true},
            })
        );

        let encoded = serde_json::to_value(KvReply::error("Key does not exist")).unwrap();
        assert_eq!(encoded, json!({"error": "Key does not exist"}));
    }

    #[test]
    fn clock_snapshot_wire_shape() {
        let snapshot = ClockSnapshot {
            vc: clock("[1,2,3]"),
        };
        assert_eq!(
            serde_json::to_string(&snapshot).unwrap(),
            r#"{"VC":[1,2,3]}"#
        );
    }

    #[test]
    fn store_dump_wire_shape() {
        let mut kvs = std::collections::HashMap::new();
        kvs.insert("x".to_string(), json!([1, 2]));
        let dump = StoreDump { kvs };

        let encoded = serde_json::to_value(&dump).unwrap();
        assert_eq!(encoded, json!({"KVS": {"x": [1, 2]}}));

        let decoded: StoreDump = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.kvs.get("x"), Some(&json!([1, 2])));
    }

    #[test]
    fn kv_write_exposes_its_key() {
        let put = KvWrite::Put {
            key: "a".to_string(),
            value: json!(1),
        };
        let delete = KvWrite::Delete {
            key: "b".to_string(),
        };
        assert_eq!(put.key(), "a");
        assert_eq!(delete.key(), "b");
    }
}
