//! Login/logout lifecycle, the startup auth check, and the proactive refresh timer.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use tokio::{sync::watch, task::JoinHandle, time};
// self
use crate::{
	_prelude::*,
	client::Client,
	http::{ApiTransport, Method},
	obs::{self, OpKind, OpOutcome, OpSpan},
	session::{TokenSecret, UserProfile},
};

/// Lead time subtracted from a token's expiry when arming the proactive refresh timer.
///
/// Expiries at or below the lead arm nothing; the reactive 401 path covers them.
pub const PROACTIVE_REFRESH_LEAD: Duration = Duration::seconds(60);

/// Authenticated/unauthenticated duality of the whole application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
	/// No session is held.
	#[default]
	Unauthenticated,
	/// A session is held and believed valid.
	Authenticated,
	/// The session was terminated by an unrecoverable refresh failure; hosts should
	/// navigate to the login boundary.
	Expired,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginGrant {
	access_token: String,
	refresh_token: String,
	expires_in: i64,
	user: UserProfile,
}

impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Authenticates with email + password and establishes the session.
	///
	/// On success both tokens are persisted, the profile is cached,
	/// [`SessionPhase::Authenticated`] is broadcast, and the proactive refresh timer is
	/// armed from the grant's expiry. A 401 maps to [`Error::InvalidCredentials`], a 403
	/// to [`Error::AccountInactive`].
	pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
		const KIND: OpKind = OpKind::Login;

		let span = OpSpan::new(KIND, "login");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self
					.execute_public(
						Method::Post,
						"/api/auth/login",
						json!({ "email": email, "password": password }),
					)
					.await?;

				if response.is_success() {
					let grant: LoginGrant = super::request::decode_success(&response)?;

					self.store
						.set_tokens(
							TokenSecret::new(grant.access_token),
							Some(TokenSecret::new(grant.refresh_token)),
						)
						.await?;
					self.set_user(grant.user.clone());

					let _ = self.phase.send(SessionPhase::Authenticated);

					self.schedule_refresh(Duration::seconds(grant.expires_in));

					return Ok(grant.user);
				}

				match response.status {
					401 => Err(Error::InvalidCredentials),
					403 => Err(Error::AccountInactive),
					_ => Err(super::request::into_api_error(response)),
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Ends the session, clearing local state unconditionally.
	///
	/// The server-side revocation call is best-effort: a network failure or error status
	/// never prevents the local tokens, cached profile, and timer from being cleared.
	pub async fn logout(&self) {
		self.refresh_timer.disarm();

		if let Ok(Some(refresh)) = self.store.refresh_token().await {
			let _ = self
				.execute_public(
					Method::Post,
					"/api/auth/logout",
					json!({ "refreshToken": refresh.expose() }),
				)
				.await;
		}

		let _ = self.store.clear_tokens().await;

		self.clear_user();

		let _ = self.phase.send(SessionPhase::Unauthenticated);
	}

	/// Restores the session at startup from whatever the token store holds.
	///
	/// Never fails: with no stored access token the session stays unauthenticated; with
	/// one, the profile fetch runs through the authenticated path (which already performs
	/// the one refresh-and-retry), and any failure clears the tokens and settles on
	/// unauthenticated.
	pub async fn check_auth(&self) -> Option<UserProfile> {
		let stored = self.store.access_token().await.ok().flatten();

		if stored.is_none() {
			let _ = self.phase.send(SessionPhase::Unauthenticated);

			return None;
		}

		match self.me().await {
			Ok(user) => {
				let _ = self.phase.send(SessionPhase::Authenticated);

				Some(user)
			},
			Err(_) => {
				let _ = self.store.clear_tokens().await;

				self.clear_user();
				self.refresh_timer.disarm();

				let _ = self.phase.send(SessionPhase::Unauthenticated);

				None
			},
		}
	}

	/// Subscribes to session phase transitions.
	///
	/// Hosts watch this channel for [`SessionPhase::Expired`] to drive the redirect to
	/// the login boundary.
	pub fn session_phase(&self) -> watch::Receiver<SessionPhase> {
		self.phase.subscribe()
	}

	/// Arms the proactive refresh timer for a token expiring in `expires_in`.
	///
	/// Arming always cancels the previously armed timer, so at most one is live. When
	/// less than the lead time remains no timer is armed at all. On fire the timer runs
	/// the shared refresh coordinator; a failure there has already torn the session down,
	/// so the timer swallows it.
	///
	/// Must be called from within a Tokio runtime context.
	pub fn schedule_refresh(&self, expires_in: Duration) {
		let Some(delay) = proactive_refresh_delay(expires_in) else {
			self.refresh_timer.disarm();

			return;
		};
		let generation = self.refresh_timer.next_generation();
		let client = self.clone();
		let handle = tokio::spawn(async move {
			time::sleep(delay).await;

			if !client.refresh_timer.try_fire(generation) {
				return;
			}

			let observed = client.store.access_token().await.ok().flatten();
			let _ = client.refresh_access_token(observed).await;
		});

		self.refresh_timer.arm(generation, handle);
	}
}

/// Computes the delay before a proactive refresh should fire, if one should at all.
pub(crate) fn proactive_refresh_delay(expires_in: Duration) -> Option<StdDuration> {
	StdDuration::try_from(expires_in - PROACTIVE_REFRESH_LEAD)
		.ok()
		.filter(|delay| !delay.is_zero())
}

/// One-shot timer slot enforcing the single-armed-timer invariant.
///
/// Generations serialize arm/fire/disarm races: a timer may only fire while it is still
/// the newest armed one, and an arm that lost a race to a newer arm aborts its own handle
/// instead of clobbering the winner.
#[derive(Debug, Default)]
pub(crate) struct RefreshTimer {
	generation: AtomicU64,
	slot: Mutex<Option<ArmedTimer>>,
}

#[derive(Debug)]
struct ArmedTimer {
	generation: u64,
	handle: JoinHandle<()>,
}

impl RefreshTimer {
	pub(crate) fn next_generation(&self) -> u64 {
		self.generation.fetch_add(1, Ordering::Relaxed) + 1
	}

	pub(crate) fn arm(&self, generation: u64, handle: JoinHandle<()>) {
		if self.generation.load(Ordering::Relaxed) != generation {
			handle.abort();

			return;
		}

		let mut slot = self.slot.lock();

		if let Some(old) = slot.take() {
			old.handle.abort();
		}

		*slot = Some(ArmedTimer { generation, handle });
	}

	/// Cancels any armed timer and invalidates timers that are past their sleep but have
	/// not fired yet.
	pub(crate) fn disarm(&self) {
		self.generation.fetch_add(1, Ordering::Relaxed);

		if let Some(old) = self.slot.lock().take() {
			old.handle.abort();
		}
	}

	/// Claims the right to fire for the given generation, releasing the slot.
	pub(crate) fn try_fire(&self, generation: u64) -> bool {
		if self.generation.load(Ordering::Relaxed) != generation {
			return false;
		}

		let mut slot = self.slot.lock();

		if matches!(slot.as_ref(), Some(armed) if armed.generation == generation) {
			*slot = None;
		}

		true
	}
}
