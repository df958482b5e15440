//! Simple file-backed [`TokenStore`] that survives process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	session::{TokenPair, TokenSecret},
	store::{StoreError, StoreFuture, TokenStore},
};

/// Persists the token pair to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<TokenPair>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { TokenPair::default() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<TokenPair, StoreError> {
		if !path.exists() {
			return Ok(TokenPair::default());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(TokenPair::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &TokenPair) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize token snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenStore for FileStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.inner.read().access.clone()) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.inner.read().refresh.clone()) })
	}

	fn set_tokens(&self, access: TokenSecret, refresh: Option<TokenSecret>) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.access = Some(access);

			if refresh.is_some() {
				guard.refresh = refresh;
			}

			self.persist_locked(&guard)
		})
	}

	fn set_access_token(&self, access: TokenSecret) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.access = Some(access);

			self.persist_locked(&guard)
		})
	}

	fn clear_tokens(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			*guard = TokenPair::default();

			self.persist_locked(&guard)
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"ambio_client_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set_tokens(TokenSecret::new("access"), Some(TokenSecret::new("refresh"))))
			.expect("Failed to save fixture tokens to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let access = rt
			.block_on(reopened.access_token())
			.expect("Failed to read access token from file store.")
			.expect("File store lost the access token after reopen.");
		let refresh = rt
			.block_on(reopened.refresh_token())
			.expect("Failed to read refresh token from file store.")
			.expect("File store lost the refresh token after reopen.");

		assert_eq!(access.expose(), "access");
		assert_eq!(refresh.expose(), "refresh");

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn access_rotation_preserves_the_refresh_token() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set_tokens(TokenSecret::new("a1"), Some(TokenSecret::new("r1"))))
			.expect("Failed to save fixture tokens to file store.");
		rt.block_on(store.set_access_token(TokenSecret::new("a2")))
			.expect("Failed to rotate the access token.");

		let access = rt
			.block_on(store.access_token())
			.expect("Failed to read access token.")
			.expect("Access token should be present after rotation.");
		let refresh = rt
			.block_on(store.refresh_token())
			.expect("Failed to read refresh token.")
			.expect("Refresh token should survive an access-only rotation.");

		assert_eq!(access.expose(), "a2");
		assert_eq!(refresh.expose(), "r1");

		rt.block_on(store.clear_tokens()).expect("Failed to clear the file store.");

		assert!(
			rt.block_on(store.access_token()).expect("Failed to read access token.").is_none()
		);
		assert!(
			rt.block_on(store.refresh_token()).expect("Failed to read refresh token.").is_none()
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
