//! Validated client configuration and endpoint resolution.

// self
use crate::{_prelude::*, error::ConfigError};

/// Default interval between alert/statistics polling rounds.
pub const DEFAULT_POLL_INTERVAL: StdDuration = StdDuration::from_secs(30);

/// Immutable configuration consumed by [`Client`](crate::client::Client).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
	/// API origin every endpoint path is joined onto.
	pub base_url: Url,
	/// Interval between polling rounds for watchers.
	pub poll_interval: StdDuration,
	/// Optional User-Agent header attached to every request.
	pub user_agent: Option<String>,
}
impl ApiConfig {
	/// Creates a new builder for the provided base URL string.
	pub fn builder(base_url: impl AsRef<str>) -> ApiConfigBuilder {
		ApiConfigBuilder::new(base_url)
	}

	/// Resolves a relative endpoint path (optionally carrying a query string) against the
	/// base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}
}

/// Builder API for assembling [`ApiConfig`] values.
#[derive(Clone, Debug)]
pub struct ApiConfigBuilder {
	base_url: String,
	poll_interval: StdDuration,
	user_agent: Option<String>,
}
impl ApiConfigBuilder {
	fn new(base_url: impl AsRef<str>) -> Self {
		Self {
			base_url: base_url.as_ref().to_owned(),
			poll_interval: DEFAULT_POLL_INTERVAL,
			user_agent: None,
		}
	}

	/// Overrides the polling interval used by alert watchers.
	pub fn poll_interval(mut self, interval: StdDuration) -> Self {
		self.poll_interval = interval;

		self
	}

	/// Sets the User-Agent header attached to every request.
	pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = Some(agent.into());

		self
	}

	/// Validates the collected settings and produces an [`ApiConfig`].
	pub fn build(self) -> Result<ApiConfig, ConfigError> {
		let base_url = Url::parse(&self.base_url)
			.map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if !matches!(base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { scheme: base_url.scheme().to_owned() });
		}

		Ok(ApiConfig {
			base_url,
			poll_interval: self.poll_interval,
			user_agent: self.user_agent,
		})
	}
}
