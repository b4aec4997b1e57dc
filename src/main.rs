use axum::{
    extract::Extension,
    routing::{get, put},
    Router,
};
use causal_kvs::membership::handlers::{handle_view_add, handle_view_list, handle_view_remove};
use causal_kvs::membership::types::Roster;
use causal_kvs::replica::handlers::{
    handle_clock_snapshot, handle_kv_delete, handle_kv_get, handle_kv_put, handle_store_dump,
};
use causal_kvs::replica::state::Replica;
use causal_kvs::replication::protocol::{
    ENDPOINT_CLOCK, ENDPOINT_KVS, ENDPOINT_STORE_DUMP, ENDPOINT_VIEW,
};
use causal_kvs::replication::recovery::Recovery;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Roster order in VIEW defines vector-clock slot assignment; the
    // position of SOCKET_ADDRESS within it is this replica's slot.
    let roster = Arc::new(Roster::from_env()?);
    tracing::info!(
        "replica {} holds slot {} of roster {:?}",
        roster.self_addr(),
        roster.self_index(),
        roster.addrs()
    );

    let replica = Arc::new(Replica::new(roster.clone()));

    // One-shot crash-recovery probe, after a grace period so the rest of
    // the fleet has time to bind its listeners.
    let recovery = Recovery::new(roster.clone(), replica.state_handle());
    tokio::spawn(async move {
        recovery.run().await;
    });

    let app = Router::new()
        .route(
            &format!("{}/:key", ENDPOINT_KVS),
            put(handle_kv_put).get(handle_kv_get).delete(handle_kv_delete),
        )
        .route(
            ENDPOINT_VIEW,
            put(handle_view_add)
                .get(handle_view_list)
                .delete(handle_view_remove),
        )
        .route(ENDPOINT_CLOCK, get(handle_clock_snapshot))
        .route(ENDPOINT_STORE_DUMP, get(handle_store_dump))
        .layer(Extension(replica.clone()));

    let listen = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), roster.self_port()?);
    tracing::info!("listening on {}", listen);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
