//! Replication Network Protocol
//!
//! Defines the HTTP endpoints and JSON shapes used between clients and
//! replicas and between peer replicas. Replication reuses the client-facing
//! `/kvs` surface: a peer write is an ordinary PUT or DELETE whose causal
//! metadata says `IsReqFromClient: false`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::clock::VectorClock;

// --- API Endpoints ---

/// Key-value surface; keys are path segments under this prefix.
pub const ENDPOINT_KVS: &str = "/kvs";
/// Membership surface (PUT add, GET list, DELETE remove).
pub const ENDPOINT_VIEW: &str = "/view";
/// Read-only vector-clock snapshot, used by the recovery probe.
pub const ENDPOINT_CLOCK: &str = "/getVC";
/// Read-only full-store dump, used by the recovery pull.
pub const ENDPOINT_STORE_DUMP: &str = "/getKVS";

// --- Data Transfer Objects ---

/// The causal metadata attached to every KV request and response.
///
/// A replica mints this on each response; clients carry it opaquely and
/// echo it on their next request so any replica can re-establish the
/// client's causal frontier. Replicas stamp `from_client: false` onto the
/// copies they broadcast to peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalMetadata {
    /// The sender's clock snapshot at send time.
    #[serde(rename = "ReqVector")]
    pub clock: VectorClock,
    /// Roster index of the replica that produced this metadata.
    #[serde(rename = "ReqIpIndex")]
    pub origin_index: usize,
    /// True for client traffic (including first contact), false for
    /// peer-to-peer replication messages.
    #[serde(rename = "IsReqFromClient")]
    pub from_client: bool,
}

/// Body of every `/kvs/{key}` request.
///
/// `value` is only meaningful for PUT. Absent or null `causal-metadata`
/// denotes a client's first contact with the fleet.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KvEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(
        rename = "causal-metadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub causal_metadata: Option<CausalMetadata>,
}

/// Body of every `/kvs/{key}` response.
///
/// Exactly one of `result` or `error` is set; `value` accompanies a found
/// GET; metadata is attached to every non-503 response.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct KvReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        rename = "causal-metadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub causal_metadata: Option<CausalMetadata>,
}

impl KvReply {
    pub fn result(result: &str, meta: CausalMetadata) -> Self {
        Self {
            result: Some(result.to_string()),
            causal_metadata: Some(meta),
            ..Self::default()
        }
    }

    pub fn found(value: Value, meta: CausalMetadata) -> Self {
        Self {
            result: Some("found".to_string()),
            value: Some(value),
            causal_metadata: Some(meta),
            ..Self::default()
        }
    }

    pub fn error(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    pub fn error_with_meta(error: &str, meta: CausalMetadata) -> Self {
        Self {
            error: Some(error.to_string()),
            causal_metadata: Some(meta),
            ..Self::default()
        }
    }
}

/// Body of `GET /getVC`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClockSnapshot {
    #[serde(rename = "VC")]
    pub vc: VectorClock,
}

/// Body of `GET /getKVS`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreDump {
    #[serde(rename = "KVS")]
    pub kvs: HashMap<String, Value>,
}
