// std
use std::{env, fs, path::PathBuf, process};
// crates.io
use time::OffsetDateTime;
// self
use ambio_client::{
	session::TokenSecret,
	store::{FileStore, MemoryStore, TokenStore},
};

async fn access(store: &dyn TokenStore) -> Option<String> {
	store
		.access_token()
		.await
		.expect("Failed to read the access token.")
		.map(|secret| secret.expose().to_owned())
}

async fn refresh(store: &dyn TokenStore) -> Option<String> {
	store
		.refresh_token()
		.await
		.expect("Failed to read the refresh token.")
		.map(|secret| secret.expose().to_owned())
}

#[tokio::test]
async fn memory_store_round_trips_the_pair() {
	let store = MemoryStore::default();

	store
		.set_tokens(TokenSecret::new("a1"), Some(TokenSecret::new("r1")))
		.await
		.expect("Failed to store the token pair.");

	assert_eq!(access(&store).await.as_deref(), Some("a1"));
	assert_eq!(refresh(&store).await.as_deref(), Some("r1"));

	store.set_access_token(TokenSecret::new("a2")).await.expect("Failed to rotate the access token.");

	// An access-only rotation must leave the refresh token untouched.
	assert_eq!(access(&store).await.as_deref(), Some("a2"));
	assert_eq!(refresh(&store).await.as_deref(), Some("r1"));

	store.clear_tokens().await.expect("Failed to clear the store.");

	assert_eq!(access(&store).await, None);
	assert_eq!(refresh(&store).await, None);
}

#[tokio::test]
async fn set_tokens_without_a_refresh_preserves_the_stored_one() {
	let store = MemoryStore::default();

	store
		.set_tokens(TokenSecret::new("a1"), Some(TokenSecret::new("r1")))
		.await
		.expect("Failed to store the token pair.");
	store
		.set_tokens(TokenSecret::new("a2"), None)
		.await
		.expect("Failed to apply the refresh-preserving rotation.");

	assert_eq!(access(&store).await.as_deref(), Some("a2"));
	assert_eq!(refresh(&store).await.as_deref(), Some("r1"));
}

fn temp_path() -> PathBuf {
	let unique = format!(
		"ambio_client_store_it_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	);

	env::temp_dir().join(unique)
}

#[tokio::test]
async fn file_store_survives_a_reopen() {
	let path = temp_path();

	{
		let store = FileStore::open(&path).expect("Failed to open the file store.");

		store
			.set_tokens(TokenSecret::new("a1"), Some(TokenSecret::new("r1")))
			.await
			.expect("Failed to store the token pair.");
	}

	let reopened = FileStore::open(&path).expect("Failed to reopen the file store.");

	assert_eq!(access(&reopened).await.as_deref(), Some("a1"));
	assert_eq!(refresh(&reopened).await.as_deref(), Some("r1"));

	reopened.clear_tokens().await.expect("Failed to clear the file store.");
	drop(reopened);

	let cleared = FileStore::open(&path).expect("Failed to reopen the cleared file store.");

	assert_eq!(access(&cleared).await, None);
	assert_eq!(refresh(&cleared).await, None);

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
	});
}
