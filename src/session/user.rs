//! User profile records and role enumerations returned by the auth endpoints.

// self
use crate::_prelude::*;

/// Role assigned to a user within their organization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Full administrative rights within the user's scope.
	Admin,
	/// Regular operator access.
	#[default]
	Member,
	/// Role string the client does not recognize; treated as least-privileged.
	#[serde(other)]
	Unknown,
}
impl Role {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Role::Admin => "admin",
			Role::Member => "member",
			Role::Unknown => "unknown",
		}
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Whether the user belongs to the platform operator or to a tenant company.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
	/// Platform-level Ambio staff.
	Ambio,
	/// Tenant company user.
	#[default]
	Company,
}
impl UserKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			UserKind::Ambio => "ambio",
			UserKind::Company => "company",
		}
	}
}
impl Display for UserKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Denormalized profile of the authenticated user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// Opaque user identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Login email address.
	pub email: String,
	/// Organization-level role.
	#[serde(default)]
	pub role: Role,
	/// Platform/tenant membership.
	#[serde(default)]
	pub user_type: UserKind,
	/// Owning company; absent for platform staff.
	#[serde(default)]
	pub company_id: Option<String>,
	/// Avatar image location, when one has been uploaded.
	#[serde(default)]
	pub avatar_url: Option<String>,
	/// Opaque per-user preference payload.
	#[serde(default)]
	pub preferences: Option<Value>,
}
impl UserProfile {
	/// Returns `true` for platform-level Ambio staff.
	pub fn is_ambio(&self) -> bool {
		matches!(self.user_type, UserKind::Ambio)
	}

	/// Returns `true` for users holding the admin role.
	pub fn is_admin(&self) -> bool {
		matches!(self.role, Role::Admin)
	}
}
