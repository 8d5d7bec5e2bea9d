//! Shared helpers for testing against a wiremock server.
//!
//! Enabled by the `test-support` feature. The service crates pull this
//! in from their dev-dependencies so every test suite builds its mock
//! client the same way.

use crate::auth::ArmCredential;
use crate::client::ArmClient;
use wiremock::MockServer;

use std::time::Duration;

/// The bearer token mock clients authenticate with. Match it in tests
/// with `header("Authorization", "Bearer test-access-token")`.
pub const TEST_TOKEN: &str = "test-access-token";

/// Build an [`ArmClient`] pointed at `server`, authenticated with
/// [`TEST_TOKEN`], with a polling interval short enough for tests.
pub async fn mock_client(server: &MockServer) -> ArmClient {
    ArmClient::builder()
        .endpoint(server.uri())
        .credential(ArmCredential::bearer_token(TEST_TOKEN))
        .polling_interval(Duration::from_millis(10))
        .build()
        .expect("should build mock client")
}
