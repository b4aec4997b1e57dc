//! View API Handlers
//!
//! HTTP endpoints that expose the live membership set. Recovered replicas
//! announce themselves here (PUT), the failure detector on other replicas
//! disseminates removals here (DELETE), and operators inspect the current
//! view (GET).

use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;

use super::types::{AddOutcome, RemoveOutcome, ViewChange, ViewListing, ViewReply};
use crate::replica::state::Replica;

/// `PUT /view`: re-admit a replica into the local view.
pub async fn handle_view_add(
    Extension(replica): Extension<Arc<Replica>>,
    Json(req): Json<ViewChange>,
) -> (StatusCode, Json<ViewReply>) {
    match replica.view_add(&req.socket_address) {
        AddOutcome::Added => {
            tracing::info!("view: added {}", req.socket_address);
            (StatusCode::CREATED, Json(ViewReply::result("added")))
        }
        AddOutcome::AlreadyPresent => (StatusCode::OK, Json(ViewReply::result("already present"))),
    }
}

/// `GET /view`: list the current members in insertion order.
pub async fn handle_view_list(
    Extension(replica): Extension<Arc<Replica>>,
) -> (StatusCode, Json<ViewListing>) {
    (
        StatusCode::OK,
        Json(ViewListing {
            view: replica.view_list(),
        }),
    )
}

/// `DELETE /view`: drop a replica reported unreachable.
pub async fn handle_view_remove(
    Extension(replica): Extension<Arc<Replica>>,
    Json(req): Json<ViewChange>,
) -> (StatusCode, Json<ViewReply>) {
    match replica.view_remove(&req.socket_address) {
        RemoveOutcome::Deleted => {
            tracing::info!("view: removed {}", req.socket_address);
            (StatusCode::CREATED, Json(ViewReply::result("deleted")))
        }
        RemoveOutcome::NotPresent => (
            StatusCode::NOT_FOUND,
            Json(ViewReply::error("View has no such replica")),
        ),
    }
}
