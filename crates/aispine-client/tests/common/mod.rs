//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use aispine_client::{Client, ClientConfig};

pub const TEST_KEY: &str = "sk_test_key";

/// Route client logs to the test harness output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("aispine_client=debug")
        .with_test_writer()
        .try_init();
}

/// A client pointed at a mock server
pub fn client_for(server: &mockito::ServerGuard) -> Client {
    init_tracing();
    Client::new(
        ClientConfig::new(TEST_KEY)
            .with_base_url(server.url())
            .with_timeout(Duration::from_secs(5)),
    )
    .unwrap_or_else(|e| panic!("failed to build client: {e}"))
}
