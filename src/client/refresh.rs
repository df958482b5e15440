//! Single-flight token refresh shared by the reactive 401 path and the proactive timer.
//!
//! Every refresh attempt funnels through [`Client::refresh_access_token`], so a burst of
//! simultaneously expiring requests (or a proactive timer firing alongside one) produces
//! exactly one call to the refresh endpoint. Waiters that queue behind an in-flight
//! refresh observe its outcome instead of issuing their own exchange: success hands every
//! caller the same rotated token, and failure tears the session down once for all of them.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	client::{Client, SessionPhase},
	http::{ApiTransport, Method},
	obs::{self, OpKind, OpOutcome, OpSpan},
	session::TokenSecret,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshGrant {
	access_token: String,
	expires_in: i64,
	#[serde(default)]
	refresh_token: Option<String>,
}

impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Exchanges the refresh token for a new access token, coalescing concurrent callers.
	///
	/// `observed` is the access token the caller held when it decided a refresh was
	/// needed (the one its request carried into the 401, or the one the proactive timer
	/// read before firing). If the stored token has already moved past it by the time the
	/// flight guard is acquired, another refresh won the race and its result is returned
	/// without a second network call.
	///
	/// Failure is terminal: missing refresh token, endpoint rejection, transport failure,
	/// and an unparseable grant all clear the store, drop the cached user, broadcast
	/// [`SessionPhase::Expired`], and surface [`Error::SessionExpired`].
	pub async fn refresh_access_token(
		&self,
		observed: Option<TokenSecret>,
	) -> Result<TokenSecret> {
		const KIND: OpKind = OpKind::Refresh;

		let span = OpSpan::new(KIND, "refresh_access_token");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.refresh_metrics.record_attempt();

				let _flight = self.refresh_guard.lock().await;
				let current = self.store.access_token().await.map_err(|err| {
					self.refresh_metrics.record_failure();
					Error::from(err)
				})?;

				// A flight that completed while this caller waited already rotated the
				// token; its outcome is this caller's outcome.
				if let Some(current) = current
					&& observed.as_ref() != Some(&current)
				{
					self.refresh_metrics.record_coalesced();
					self.refresh_metrics.record_success();

					return Ok(current);
				}

				let refresh = match self.store.refresh_token().await {
					Ok(Some(secret)) => secret,
					Ok(None) => return Err(self.fail_refresh().await),
					Err(_) => return Err(self.fail_refresh().await),
				};
				let response = match self
					.execute_public(
						Method::Post,
						"/api/auth/refresh",
						json!({ "refreshToken": refresh.expose() }),
					)
					.await
				{
					Ok(response) if response.is_success() => response,
					_ => return Err(self.fail_refresh().await),
				};
				let grant: RefreshGrant = match super::request::decode_success(&response) {
					Ok(grant) => grant,
					Err(_) => return Err(self.fail_refresh().await),
				};
				let access = TokenSecret::new(grant.access_token);
				let rotated_refresh = grant.refresh_token.map(TokenSecret::new);
				let persisted = match rotated_refresh {
					Some(secret) =>
						self.store.set_tokens(access.clone(), Some(secret)).await,
					None => self.store.set_access_token(access.clone()).await,
				};

				if persisted.is_err() {
					return Err(self.fail_refresh().await);
				}

				self.schedule_refresh(Duration::seconds(grant.expires_in));
				self.refresh_metrics.record_success();

				Ok(access)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Tears the session down after an unrecoverable refresh failure.
	///
	/// Local state is cleared before the error reaches the original caller, so by the
	/// time `SessionExpired` propagates the host is already being signalled to navigate
	/// to the login boundary.
	async fn fail_refresh(&self) -> Error {
		self.refresh_metrics.record_failure();

		let _ = self.store.clear_tokens().await;

		self.clear_user();
		self.refresh_timer.disarm();

		let _ = self.phase.send(SessionPhase::Expired);

		Error::SessionExpired
	}
}
