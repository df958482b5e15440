#![allow(dead_code)]

// std
use std::sync::Arc;
// self
use ambio_client::{
	client::Client,
	config::ApiConfig,
	http::ReqwestTransport,
	session::TokenSecret,
	store::{MemoryStore, TokenStore},
};

/// Client type used across the integration tests.
pub type TestClient = Client<ReqwestTransport>;

/// Builds a client against the mock server, tolerating httpmock's self-signed certs.
pub fn build_client(base_url: &str) -> (TestClient, Arc<MemoryStore>) {
	let http = ambio_client::reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");
	let config = ApiConfig::builder(base_url)
		.build()
		.expect("Test base URL should produce a valid configuration.");
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn TokenStore> = store_backend.clone();
	let client = Client::with_transport(store, config, ReqwestTransport::with_client(http));

	(client, store_backend)
}

/// Seeds an access/refresh token pair into the provided store.
pub async fn seed_tokens(store: &MemoryStore, access: &str, refresh: &str) {
	store
		.set_tokens(TokenSecret::new(access), Some(TokenSecret::new(refresh)))
		.await
		.expect("Failed to seed tokens into the test store.");
}

/// Reads the stored access token as a plain string, if present.
pub async fn stored_access(store: &MemoryStore) -> Option<String> {
	store
		.access_token()
		.await
		.expect("Failed to read the access token from the test store.")
		.map(|secret| secret.expose().to_owned())
}

/// Reads the stored refresh token as a plain string, if present.
pub async fn stored_refresh(store: &MemoryStore) -> Option<String> {
	store
		.refresh_token()
		.await
		.expect("Failed to read the refresh token from the test store.")
		.map(|secret| secret.expose().to_owned())
}
