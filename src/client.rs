//! Central API client owning the authenticated-session lifecycle.

pub mod auth;
pub mod profile;
pub mod refresh;
pub mod request;

pub use auth::*;
pub use profile::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	config::ApiConfig,
	http::ApiTransport,
	session::{Capabilities, UserProfile},
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
// crates.io
use tokio::sync::watch;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestApiClient = Client<ReqwestTransport>;

/// Coordinates every API interaction for one authenticated session.
///
/// The client owns the HTTP transport, token store, and configuration so individual
/// operation groups (login/logout, profile edits, alert queries, resource CRUD) can focus
/// on endpoint-specific shaping. All clones share the same session: the token store, the
/// refresh flight guard, the cached user profile, and the phase channel are one set of
/// state behind `Arc`s, which is what lets background timers and pollers hold a clone
/// without forking the session.
pub struct Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// HTTP transport used for every outbound request.
	pub transport: Arc<T>,
	/// Token store persisting the session's secrets.
	pub store: Arc<dyn TokenStore>,
	/// Validated configuration (base URL, polling interval, user agent).
	pub config: ApiConfig,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	pub(crate) user: Arc<RwLock<Option<CurrentUser>>>,
	pub(crate) phase: Arc<watch::Sender<SessionPhase>>,
	pub(crate) refresh_guard: Arc<AsyncMutex<()>>,
	pub(crate) refresh_timer: Arc<RefreshTimer>,
}

/// Cached profile plus the capability set derived from it once at login.
#[derive(Clone, Debug)]
pub(crate) struct CurrentUser {
	pub(crate) profile: UserProfile,
	pub(crate) capabilities: Capabilities,
}

impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn TokenStore>,
		config: ApiConfig,
		transport: impl Into<Arc<T>>,
	) -> Self {
		let (phase, _) = watch::channel(SessionPhase::Unauthenticated);

		Self {
			transport: transport.into(),
			store,
			config,
			refresh_metrics: Default::default(),
			user: Default::default(),
			phase: Arc::new(phase),
			refresh_guard: Default::default(),
			refresh_timer: Default::default(),
		}
	}

	/// Returns a copy of the cached profile of the authenticated user, if any.
	pub fn current_user(&self) -> Option<UserProfile> {
		self.user.read().as_ref().map(|user| user.profile.clone())
	}

	/// Returns the capability set computed for the authenticated user, if any.
	pub fn capabilities(&self) -> Option<Capabilities> {
		self.user.read().as_ref().map(|user| user.capabilities)
	}

	pub(crate) fn set_user(&self, profile: UserProfile) {
		let capabilities = Capabilities::for_user(&profile);

		*self.user.write() = Some(CurrentUser { profile, capabilities });
	}

	pub(crate) fn clear_user(&self) {
		*self.user.write() = None;
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport> {
	/// Creates a new client for the provided store + configuration.
	///
	/// The client provisions its own reqwest-backed transport so callers do not need to
	/// pass HTTP handles explicitly. Use [`Client::with_transport`] to supply a custom
	/// transport (or a preconfigured [`ReqwestClient`]).
	pub fn new(store: Arc<dyn TokenStore>, config: ApiConfig) -> Self {
		Self::with_transport(store, config, ReqwestTransport::default())
	}
}
impl<T> Clone for Client<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			user: self.user.clone(),
			phase: self.phase.clone(),
			refresh_guard: self.refresh_guard.clone(),
			refresh_timer: self.refresh_timer.clone(),
		}
	}
}
impl<T> Debug for Client<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("config", &self.config)
			.field("phase", &*self.phase.borrow())
			.field("user", &self.user.read().as_ref().map(|user| user.profile.id.clone()))
			.finish()
	}
}
