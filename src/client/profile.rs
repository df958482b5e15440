//! Profile and account-recovery operations for the authenticated user.

// self
use crate::{
	_prelude::*,
	client::Client,
	http::{ApiTransport, Method, MultipartFile},
	session::UserProfile,
};

/// Multipart form field the server reads the avatar image from.
const AVATAR_FIELD: &str = "avatar";

/// Partial profile update; absent fields are left untouched server-side.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
	/// New display name.
	pub name: Option<String>,
	/// New login email address.
	pub email: Option<String>,
}
impl ProfileUpdate {
	/// Creates an empty update.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());

		self
	}

	/// Sets the email address.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	fn into_body(self) -> Value {
		let mut fields = serde_json::Map::new();

		if let Some(name) = self.name {
			fields.insert("name".into(), Value::String(name));
		}
		if let Some(email) = self.email {
			fields.insert("email".into(), Value::String(email));
		}

		Value::Object(fields)
	}
}

#[derive(Debug, Deserialize)]
struct AvatarPayload {
	user: UserProfile,
}

impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Fetches the authenticated user's profile and refreshes the cache.
	pub async fn me(&self) -> Result<UserProfile> {
		let user: UserProfile = self.get("/api/auth/me").await?;

		self.set_user(user.clone());

		Ok(user)
	}

	/// Applies a partial profile update and refreshes the cache.
	pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile> {
		let user: UserProfile = self.put("/api/auth/me", update.into_body()).await?;

		self.set_user(user.clone());

		Ok(user)
	}

	/// Uploads a new avatar image as a multipart form and refreshes the cache.
	pub async fn upload_avatar(
		&self,
		file_name: impl Into<String>,
		content_type: Option<String>,
		bytes: Vec<u8>,
	) -> Result<UserProfile> {
		let file = MultipartFile {
			field: AVATAR_FIELD.into(),
			file_name: file_name.into(),
			content_type,
			bytes,
		};
		let payload: AvatarPayload = self.upload("/api/auth/me/avatar", file).await?;

		self.set_user(payload.user.clone());

		Ok(payload.user)
	}

	/// Removes the current avatar and refreshes the cache.
	pub async fn delete_avatar(&self) -> Result<UserProfile> {
		let payload: AvatarPayload = self.delete("/api/auth/me/avatar").await?;

		self.set_user(payload.user.clone());

		Ok(payload.user)
	}

	/// Changes the account password.
	pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
		let _: Value = self
			.post(
				"/api/auth/change-password",
				json!({ "currentPassword": current, "newPassword": new }),
			)
			.await?;

		Ok(())
	}

	/// Fetches the per-user preference payload.
	pub async fn preferences(&self) -> Result<Value> {
		self.get("/api/auth/me/preferences").await
	}

	/// Replaces the per-user preference payload and mirrors it into the cached profile.
	pub async fn set_preferences(&self, preferences: Value) -> Result<Value> {
		let stored: Value = self
			.put("/api/auth/me/preferences", json!({ "preferences": preferences }))
			.await?;

		if let Some(user) = self.user.write().as_mut() {
			user.profile.preferences = Some(stored.clone());
		}

		Ok(stored)
	}

	/// Requests a password-reset email.
	///
	/// The endpoint answers success whether or not the address is registered, so there is
	/// no user-existence signal to interpret here.
	pub async fn forgot_password(&self, email: &str) -> Result<()> {
		let response = self
			.execute_public(Method::Post, "/api/auth/forgot-password", json!({ "email": email }))
			.await?;

		if response.is_success() {
			Ok(())
		} else {
			Err(super::request::into_api_error(response))
		}
	}

	/// Completes a password reset with an emailed token.
	///
	/// Expired or already-used tokens surface as [`Error::ResetTokenInvalid`] so the UI
	/// can offer to send a fresh link.
	pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
		let response = self
			.execute_public(
				Method::Post,
				"/api/auth/reset-password",
				json!({ "token": token, "newPassword": new_password }),
			)
			.await?;

		if response.is_success() {
			return Ok(());
		}

		match response.status {
			400 | 401 => Err(Error::ResetTokenInvalid),
			_ => Err(super::request::into_api_error(response)),
		}
	}
}
