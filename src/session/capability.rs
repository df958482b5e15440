//! Capability predicates computed once per session instead of per call site.

// self
use crate::session::user::{Role, UserKind, UserProfile};

/// What the authenticated user may do, derived from role + membership in one place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
	/// Create, update, and delete tenant companies.
	pub can_manage_companies: bool,
	/// Create, update, and delete user accounts.
	pub can_manage_users: bool,
	/// Browse the user directory.
	pub can_view_users: bool,
	/// Assign unowned sensors to tenant companies.
	pub can_assign_sensors: bool,
	/// Edit the profile of the user's own company.
	pub can_edit_company_profile: bool,
	/// Configure per-sensor alert thresholds.
	pub can_configure_thresholds: bool,
}
impl Capabilities {
	/// Derives the capability set for a profile.
	///
	/// Platform staff administer companies, users, and sensor assignment across tenants.
	/// Company admins manage their own company's users, profile, and thresholds; company
	/// members get the read-only surface.
	pub fn for_user(user: &UserProfile) -> Self {
		let admin = matches!(user.role, Role::Admin);

		match user.user_type {
			UserKind::Ambio => Self {
				can_manage_companies: admin,
				can_manage_users: admin,
				can_view_users: true,
				can_assign_sensors: true,
				can_edit_company_profile: false,
				can_configure_thresholds: true,
			},
			UserKind::Company => Self {
				can_manage_companies: false,
				can_manage_users: admin,
				can_view_users: admin,
				can_assign_sensors: false,
				can_edit_company_profile: admin,
				can_configure_thresholds: admin,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn profile(role: Role, kind: UserKind) -> UserProfile {
		UserProfile {
			id: "u-1".into(),
			name: "Test".into(),
			email: "test@ambio.example".into(),
			role,
			user_type: kind,
			company_id: None,
			avatar_url: None,
			preferences: None,
		}
	}

	#[test]
	fn ambio_admins_manage_the_platform() {
		let caps = Capabilities::for_user(&profile(Role::Admin, UserKind::Ambio));

		assert!(caps.can_manage_companies);
		assert!(caps.can_manage_users);
		assert!(caps.can_assign_sensors);
		assert!(!caps.can_edit_company_profile);
	}

	#[test]
	fn company_members_get_the_read_only_surface() {
		let caps = Capabilities::for_user(&profile(Role::Member, UserKind::Company));

		assert_eq!(caps, Capabilities::default());
	}

	#[test]
	fn company_admins_stay_scoped_to_their_tenant() {
		let caps = Capabilities::for_user(&profile(Role::Admin, UserKind::Company));

		assert!(caps.can_manage_users);
		assert!(caps.can_edit_company_profile);
		assert!(caps.can_configure_thresholds);
		assert!(!caps.can_manage_companies);
		assert!(!caps.can_assign_sensors);
	}

	#[test]
	fn unknown_roles_are_least_privileged() {
		let caps = Capabilities::for_user(&profile(Role::Unknown, UserKind::Company));

		assert_eq!(caps, Capabilities::default());
	}
}
