//! Client-level error types shared across the session, request, and alert surfaces.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Generic fallback shown to users when no specific message applies.
const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Non-2xx response outside the recoverable 401 path.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Server returned a success status with a body that does not match the expected shape.
	#[error("Response body did not match the expected shape.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},

	/// The refresh attempt following a 401 failed, or no refresh token was available.
	///
	/// By the time this error reaches a caller the session state has already been
	/// cleared and [`SessionPhase::Expired`](crate::client::SessionPhase) broadcast;
	/// treat it as "the app is navigating away".
	#[error("Session has expired; sign in again.")]
	SessionExpired,
	/// Login rejected the supplied email/password pair.
	#[error("Invalid email or password.")]
	InvalidCredentials,
	/// Login rejected an inactive account.
	#[error("This account has been deactivated.")]
	AccountInactive,
	/// Password reset token was rejected as expired or already used.
	#[error("This password reset link has expired. Request a new one.")]
	ResetTokenInvalid,
}
impl Error {
	/// Returns a human-readable message safe to render in a UI.
	///
	/// Only the login, account, and reset-token cases carry specific wording; every other
	/// failure maps to a generic retry message rather than a raw status or JSON payload.
	pub fn user_message(&self) -> String {
		match self {
			Self::SessionExpired
			| Self::InvalidCredentials
			| Self::AccountInactive
			| Self::ResetTokenInvalid => self.to_string(),
			Self::Api(api) => api
				.validation_message()
				.map(ToOwned::to_owned)
				.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.into()),
			_ => GENERIC_FAILURE_MESSAGE.into(),
		}
	}
}

/// Non-2xx API response carrying the HTTP status and parsed error body.
#[derive(Clone, Debug, ThisError)]
#[error("API request failed with status {status}.")]
pub struct ApiError {
	/// HTTP status code returned by the server.
	pub status: u16,
	/// Parsed JSON error body; an empty object when the body was empty or not JSON.
	pub body: Value,
}
impl ApiError {
	/// Returns the server-supplied `message` field, if present.
	pub fn message(&self) -> Option<&str> {
		self.body.get("message").and_then(Value::as_str)
	}

	/// Returns `true` for 404 responses.
	pub fn is_not_found(&self) -> bool {
		self.status == 404
	}

	/// Returns the `message` field of a 400 validation response, if present.
	pub fn validation_message(&self) -> Option<&str> {
		if self.status == 400 { self.message() } else { None }
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than http/https.
	#[error("Base URL scheme `{scheme}` is not supported.")]
	UnsupportedScheme {
		/// Scheme found on the rejected URL.
		scheme: String,
	},
	/// Endpoint path cannot be joined onto the base URL.
	#[error("Endpoint path `{path}` is invalid.")]
	InvalidEndpoint {
		/// Rejected endpoint path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Upload part metadata was rejected by the transport.
	#[error("Upload content type is invalid.")]
	InvalidUploadContentType {
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_error_exposes_server_message() {
		let error = ApiError { status: 400, body: json!({"message": "Name is required."}) };

		assert_eq!(error.message(), Some("Name is required."));
		assert_eq!(error.validation_message(), Some("Name is required."));
		assert!(!error.is_not_found());

		let not_found = ApiError { status: 404, body: json!({}) };

		assert!(not_found.is_not_found());
		assert_eq!(not_found.validation_message(), None);
	}

	#[test]
	fn user_messages_never_leak_raw_payloads() {
		let api: Error = ApiError { status: 500, body: json!({"trace": "stack"}) }.into();

		assert_eq!(api.user_message(), GENERIC_FAILURE_MESSAGE);
		assert_eq!(Error::InvalidCredentials.user_message(), "Invalid email or password.");
		assert_eq!(Error::AccountInactive.user_message(), "This account has been deactivated.");
		assert_eq!(
			Error::ResetTokenInvalid.user_message(),
			"This password reset link has expired. Request a new one.",
		);
	}

	#[test]
	fn validation_message_reaches_the_user() {
		let api: Error = ApiError { status: 400, body: json!({"message": "Email is taken."}) }.into();

		assert_eq!(api.user_message(), "Email is taken.");
	}
}
