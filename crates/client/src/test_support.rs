//! Helpers for tests that need an HTTP peer.

use std::net::SocketAddr;

use axum::Router;
use url::Url;

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(clippy::expect_used)]
pub async fn spawn_server(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("test listener address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    base_url(addr)
}

/// A base URL on which nothing is listening.
#[allow(clippy::expect_used)]
pub fn unreachable_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let addr = listener.local_addr().expect("probe listener address");
    drop(listener);
    base_url(addr)
}

#[allow(clippy::expect_used)]
fn base_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("http://{addr}/")).expect("valid test url")
}
