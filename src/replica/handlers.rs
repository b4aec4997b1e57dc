//! Key-Value API Handlers
//!
//! HTTP endpoints for the KV surface and the two read-only state probes
//! (`/getVC`, `/getKVS`) that crash recovery pulls from.
//!
//! Handlers stay thin: decode, run the replica's atomic apply path, run
//! the returned broadcast job (if any) after the lock is released, and map
//! the domain verdict onto a status code and reply body.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use super::state::{KvOp, KvResponse, KvStatus, Replica};
use crate::replication::protocol::{ClockSnapshot, KvEnvelope, KvReply, StoreDump};

pub async fn handle_kv_put(
    Extension(replica): Extension<Arc<Replica>>,
    Path(key): Path<String>,
    Json(body): Json<KvEnvelope>,
) -> (StatusCode, Json<KvReply>) {
    let outcome = replica.apply_kv(&key, KvOp::Put { value: body.value }, body.causal_metadata);
    finish(&replica, outcome).await
}

pub async fn handle_kv_get(
    Extension(replica): Extension<Arc<Replica>>,
    Path(key): Path<String>,
    Json(body): Json<KvEnvelope>,
) -> (StatusCode, Json<KvReply>) {
    let outcome = replica.apply_kv(&key, KvOp::Get, body.causal_metadata);
    finish(&replica, outcome).await
}

pub async fn handle_kv_delete(
    Extension(replica): Extension<Arc<Replica>>,
    Path(key): Path<String>,
    Json(body): Json<KvEnvelope>,
) -> (StatusCode, Json<KvReply>) {
    let outcome = replica.apply_kv(&key, KvOp::Delete, body.causal_metadata);
    finish(&replica, outcome).await
}

/// `GET /getVC`: the local clock, read by peers' recovery probes.
pub async fn handle_clock_snapshot(
    Extension(replica): Extension<Arc<Replica>>,
) -> (StatusCode, Json<ClockSnapshot>) {
    (
        StatusCode::OK,
        Json(ClockSnapshot {
            vc: replica.clock_snapshot(),
        }),
    )
}

/// `GET /getKVS`: the full local store, pulled by a recovering peer.
pub async fn handle_store_dump(
    Extension(replica): Extension<Arc<Replica>>,
) -> (StatusCode, Json<StoreDump>) {
    (
        StatusCode::OK,
        Json(StoreDump {
            kvs: replica.store_dump(),
        }),
    )
}

/// Runs the broadcast (outside the state lock) and translates the domain
/// verdict into the wire response.
async fn finish(replica: &Replica, outcome: KvResponse) -> (StatusCode, Json<KvReply>) {
    let KvResponse {
        status,
        value,
        meta,
        broadcast,
    } = outcome;

    if let Some(job) = broadcast {
        replica.replicator().disseminate(job).await;
    }

    let (code, reply) = match (status, meta) {
        (KvStatus::Created, Some(meta)) => (StatusCode::CREATED, KvReply::result("created", meta)),
        (KvStatus::Updated, Some(meta)) => (StatusCode::OK, KvReply::result("updated", meta)),
        (KvStatus::Deleted, Some(meta)) => (StatusCode::OK, KvReply::result("deleted", meta)),
        (KvStatus::Found, Some(meta)) => (
            StatusCode::OK,
            KvReply::found(value.unwrap_or(Value::Null), meta),
        ),
        (KvStatus::NotFound, Some(meta)) => (
            StatusCode::NOT_FOUND,
            KvReply::error_with_meta("Key does not exist", meta),
        ),
        (KvStatus::KeyTooLong, Some(meta)) => (
            StatusCode::BAD_REQUEST,
            KvReply::error_with_meta("Key is too long", meta),
        ),
        (KvStatus::NoValue, Some(meta)) => (
            StatusCode::BAD_REQUEST,
            KvReply::error_with_meta("PUT request does not specify a value", meta),
        ),
        (KvStatus::CausalRetry, _) => (
            StatusCode::SERVICE_UNAVAILABLE,
            KvReply::error("Causal dependencies not satisfied; try again later"),
        ),
        (KvStatus::BadMetadata, _) => (
            StatusCode::BAD_REQUEST,
            KvReply::error("causal-metadata does not match this replica's roster"),
        ),
        (status, None) => {
            tracing::error!("verdict {:?} produced no response metadata", status);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                KvReply::error("internal state error"),
            )
        }
    };

    (code, Json(reply))
}
