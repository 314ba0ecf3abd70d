//! Shared helpers for integration tests: a server on an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;

use visitor_counter::api::build_app;
use visitor_counter::app_state::AppState;
use visitor_counter::config::AppConfig;
use visitor_counter::persistence::VisitorStore;

/// A running server backed by the in-memory store.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{path}", self.addr)
    }
}

/// Spawns the full application with pings disabled.
pub async fn spawn_server() -> TestServer {
    let config = AppConfig {
        cable_ping_interval_secs: 0,
        ..AppConfig::default()
    };
    spawn_server_with(config).await
}

/// Spawns the full application with `config`.
#[allow(clippy::panic)]
pub async fn spawn_server_with(config: AppConfig) -> TestServer {
    let state = AppState::new(VisitorStore::in_memory(), &config);
    let app = build_app(state.clone(), &config);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer { addr, state }
}

/// A reqwest client that does not follow redirects.
#[allow(clippy::panic)]
pub fn client() -> reqwest::Client {
    let Ok(client) = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
    else {
        panic!("failed to build client");
    };
    client
}
