//! Storage contracts and built-in stores for the session's token pair.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, session::TokenSecret};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the session's access/refresh secrets.
///
/// Tokens are opaque strings; no shape validation happens here. The store is the only
/// shared mutable state in the crate, and refresh rotation always goes through the
/// coordinator's single-flight gate before touching it.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the stored access token, if present.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Returns the stored refresh token, if present.
	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Writes the access token unconditionally; writes the refresh token only when one is
	/// provided, preserving the stored secret across refresh-only rotations.
	fn set_tokens(&self, access: TokenSecret, refresh: Option<TokenSecret>) -> StoreFuture<'_, ()>;

	/// Overwrites the access token, leaving the refresh token untouched.
	fn set_access_token(&self, access: TokenSecret) -> StoreFuture<'_, ()>;

	/// Erases both secrets.
	fn clear_tokens(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unreachable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unreachable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
