//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	session::{TokenPair, TokenSecret},
	store::{StoreFuture, TokenStore},
};

type StoreCell = Arc<RwLock<TokenPair>>;

/// Thread-safe store that keeps the token pair in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreCell);
impl MemoryStore {
	fn set_now(cell: StoreCell, access: TokenSecret, refresh: Option<TokenSecret>) {
		let mut guard = cell.write();

		guard.access = Some(access);

		if refresh.is_some() {
			guard.refresh = refresh;
		}
	}

	fn set_access_now(cell: StoreCell, access: TokenSecret) {
		cell.write().access = Some(access);
	}

	fn clear_now(cell: StoreCell) {
		*cell.write() = TokenPair::default();
	}
}
impl TokenStore for MemoryStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let cell = self.0.clone();

		Box::pin(async move { Ok(cell.read().access.clone()) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let cell = self.0.clone();

		Box::pin(async move { Ok(cell.read().refresh.clone()) })
	}

	fn set_tokens(&self, access: TokenSecret, refresh: Option<TokenSecret>) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::set_now(cell, access, refresh);

			Ok(())
		})
	}

	fn set_access_token(&self, access: TokenSecret) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::set_access_now(cell, access);

			Ok(())
		})
	}

	fn clear_tokens(&self) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::clear_now(cell);

			Ok(())
		})
	}
}
