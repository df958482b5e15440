//! Transport primitives for API calls.
//!
//! The module exposes [`ApiTransport`] alongside the request/response value types so
//! downstream crates can integrate custom HTTP clients. The trait is the crate's only
//! dependency on an HTTP stack: the client builds an [`ApiRequest`] (method, resolved URL,
//! assembled headers, body) and expects back the raw status and bytes, leaving JSON
//! decoding and the 401 recovery policy to the caller.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;

/// HTTP methods used by the API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// GET request.
	Get,
	/// POST request.
	Post,
	/// PUT request.
	Put,
	/// PATCH request.
	Patch,
	/// DELETE request.
	Delete,
}
impl Method {
	/// Returns the wire-format method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// File payload submitted as a multipart form part.
///
/// Multipart requests must never carry a preset `Content-Type` header; the transport owns
/// the boundary parameter and sets the header itself.
#[derive(Clone, Debug)]
pub struct MultipartFile {
	/// Form field name the server reads the file from.
	pub field: String,
	/// Client-side file name forwarded in the part headers.
	pub file_name: String,
	/// MIME type of the part, when known.
	pub content_type: Option<String>,
	/// Raw file bytes.
	pub bytes: Vec<u8>,
}

/// Request body variants supported by the client.
#[derive(Clone, Debug, Default)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// JSON payload; implies `Content-Type: application/json`.
	Json(Value),
	/// Multipart upload; the transport supplies the content type and boundary.
	Multipart(MultipartFile),
}
impl RequestBody {
	/// Returns `true` when the body serializes as JSON.
	pub fn is_json(&self) -> bool {
		matches!(self, Self::Json(_))
	}
}

/// Fully assembled request handed to a transport.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL including any query string.
	pub url: Url,
	/// Header name/value pairs assembled by the client.
	pub headers: Vec<(String, String)>,
	/// Request body.
	pub body: RequestBody,
}

/// Raw response returned by a transport.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Unparsed response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing API requests.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared across client
/// clones without additional wrappers, and the futures they return must be `Send` so the
/// client's boxed operations hop executors freely. A transport reports only
/// transport-level failures through its error type; non-2xx statuses are data, returned
/// inside [`ApiResponse`].
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes one HTTP request and returns the raw status + bytes.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	type TransportError = ReqwestError;

	fn execute(&self, request: ApiRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Patch => reqwest::Method::PATCH,
				Method::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}

			builder = match request.body {
				RequestBody::Empty => builder,
				RequestBody::Json(value) => builder.json(&value),
				RequestBody::Multipart(file) => {
					let mut part = reqwest::multipart::Part::bytes(file.bytes)
						.file_name(file.file_name);

					if let Some(mime) = &file.content_type {
						part = part.mime_str(mime)?;
					}

					builder.multipart(reqwest::multipart::Form::new().part(file.field, part))
				},
			};

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn method_labels_match_the_wire_format() {
		assert_eq!(Method::Get.as_str(), "GET");
		assert_eq!(Method::Patch.to_string(), "PATCH");
	}

	#[test]
	fn success_covers_the_whole_2xx_range() {
		assert!(ApiResponse { status: 200, body: vec![] }.is_success());
		assert!(ApiResponse { status: 204, body: vec![] }.is_success());
		assert!(!ApiResponse { status: 301, body: vec![] }.is_success());
		assert!(!ApiResponse { status: 401, body: vec![] }.is_success());
	}
}
