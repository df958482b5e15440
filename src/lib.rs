//! Typed client for the Ambio environmental-sensor platform—bearer-token sessions with
//! single-flight refresh, alert history queries, and polling watchers in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod alerts;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod resources;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::Client,
		config::ApiConfig,
		http::ReqwestTransport,
		session::TokenSecret,
		store::{MemoryStore, TokenStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = Client<ReqwestTransport>;

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs a [`Client`] backed by an in-memory token store and the reqwest transport
	/// used across integration tests.
	pub fn build_reqwest_test_client(base_url: &str) -> (ReqwestTestClient, Arc<MemoryStore>) {
		let config = ApiConfig::builder(base_url)
			.build()
			.expect("Test base URL should produce a valid configuration.");
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let client = Client::with_transport(store, config, test_reqwest_transport());

		(client, store_backend)
	}

	/// Seeds an access/refresh token pair into the provided store.
	pub async fn seed_tokens(store: &MemoryStore, access: &str, refresh: &str) {
		store
			.set_tokens(TokenSecret::new(access), Some(TokenSecret::new(refresh)))
			.await
			.expect("Failed to seed tokens into the test store.");
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Value, json};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
