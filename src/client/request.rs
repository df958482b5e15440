//! Authenticated request execution with transparent recovery from access-token expiry.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	client::Client,
	error::{ApiError, TransportError},
	http::{ApiRequest, ApiResponse, ApiTransport, Method, MultipartFile, RequestBody},
	obs::{self, OpKind, OpOutcome, OpSpan},
	session::TokenSecret,
};

/// Distinguishes the first dispatch of a logical call from its single post-refresh replay.
///
/// A logical call never issues more than two physical requests: the transition
/// `First -> RetryAfterRefresh` happens at most once and there is no way back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
	First,
	RetryAfterRefresh,
}

impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Performs one authenticated API call and decodes the JSON response.
	///
	/// The bearer token is attached when one is stored. A 401 on the first attempt runs
	/// the refresh coordinator and replays the call exactly once with the rotated token;
	/// any other non-2xx status (including a 401 on the replay) surfaces as
	/// [`ApiError`] with the parsed error body preserved.
	pub async fn request<R>(
		&self,
		method: Method,
		path: &str,
		body: RequestBody,
		extra_headers: &[(&str, &str)],
	) -> Result<R>
	where
		R: DeserializeOwned,
	{
		const KIND: OpKind = OpKind::Request;

		let span = OpSpan::new(KIND, "request");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(self.dispatch(method, path, body, extra_headers)).await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Performs a GET request against an authenticated endpoint.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Get, path, RequestBody::Empty, &[]).await
	}

	/// Performs a POST request with a JSON body.
	pub async fn post<R>(&self, path: &str, body: Value) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Post, path, RequestBody::Json(body), &[]).await
	}

	/// Performs a PUT request with a JSON body.
	pub async fn put<R>(&self, path: &str, body: Value) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Put, path, RequestBody::Json(body), &[]).await
	}

	/// Performs a PATCH request with a JSON body.
	pub async fn patch<R>(&self, path: &str, body: Value) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Patch, path, RequestBody::Json(body), &[]).await
	}

	/// Performs a DELETE request.
	pub async fn delete<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Delete, path, RequestBody::Empty, &[]).await
	}

	/// Uploads a file as a multipart form POST.
	pub async fn upload<R>(&self, path: &str, file: MultipartFile) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(Method::Post, path, RequestBody::Multipart(file), &[]).await
	}

	async fn dispatch<R>(
		&self,
		method: Method,
		path: &str,
		body: RequestBody,
		extra_headers: &[(&str, &str)],
	) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let url = self.config.endpoint(path)?;
		let mut token = self.store.access_token().await?;
		let mut attempt = Attempt::First;

		loop {
			let response =
				self.send_once(method, url.clone(), &body, extra_headers, token.as_ref()).await?;

			if response.is_success() {
				return decode_success(&response);
			}

			match (response.status, attempt) {
				(401, Attempt::First) => {
					token = Some(self.refresh_access_token(token).await?);
					attempt = Attempt::RetryAfterRefresh;
				},
				_ => return Err(into_api_error(response)),
			}
		}
	}

	async fn send_once(
		&self,
		method: Method,
		url: Url,
		body: &RequestBody,
		extra_headers: &[(&str, &str)],
		token: Option<&TokenSecret>,
	) -> Result<ApiResponse> {
		let headers = request_headers(token, body, extra_headers, self.config.user_agent.as_deref());
		let request = ApiRequest { method, url, headers, body: body.clone() };

		self.transport
			.execute(request)
			.await
			.map_err(|e| TransportError::network(e).into())
	}

	/// Executes an unauthenticated call (login, refresh, password recovery).
	///
	/// No bearer is attached and no refresh/replay happens: a 401 from these endpoints
	/// means the submitted credentials were rejected, not that a token expired. The raw
	/// response is returned so callers can map statuses individually.
	pub(crate) async fn execute_public(
		&self,
		method: Method,
		path: &str,
		body: Value,
	) -> Result<ApiResponse> {
		let url = self.config.endpoint(path)?;
		let body = RequestBody::Json(body);

		self.send_once(method, url, &body, &[], None).await
	}
}

/// Assembles the header set for one request.
///
/// The bearer header is present iff a token is stored. JSON bodies carry
/// `Content-Type: application/json`; multipart and empty bodies set no content type so the
/// transport can supply the multipart boundary itself.
fn request_headers(
	token: Option<&TokenSecret>,
	body: &RequestBody,
	extra: &[(&str, &str)],
	user_agent: Option<&str>,
) -> Vec<(String, String)> {
	let mut headers = Vec::with_capacity(extra.len() + 3);

	if let Some(agent) = user_agent {
		headers.push(("user-agent".into(), agent.into()));
	}
	if body.is_json() {
		headers.push(("content-type".into(), "application/json".into()));
	}
	if let Some(token) = token {
		headers.push(("authorization".into(), format!("Bearer {}", token.expose())));
	}

	for (name, value) in extra {
		headers.push(((*name).into(), (*value).into()));
	}

	headers
}

/// Decodes a 2xx response body into the requested type.
///
/// Empty and non-JSON bodies are treated as an empty JSON object, matching the API's
/// convention for bodyless success responses.
pub(crate) fn decode_success<R>(response: &ApiResponse) -> Result<R>
where
	R: DeserializeOwned,
{
	serde_path_to_error::deserialize(lenient_json(&response.body))
		.map_err(|source| Error::ResponseParse { source, status: response.status })
}

/// Converts a non-2xx response into [`Error::Api`], preserving the parsed body.
pub(crate) fn into_api_error(response: ApiResponse) -> Error {
	ApiError { status: response.status, body: lenient_json(&response.body) }.into()
}

fn lenient_json(bytes: &[u8]) -> Value {
	serde_json::from_slice(bytes).unwrap_or_else(|_| Value::Object(Default::default()))
}
