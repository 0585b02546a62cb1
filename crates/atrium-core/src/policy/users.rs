// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile access policy.
//!
//! - Admin: read all profiles in its own building; provision resident and
//!   technician profiles there; edit/delete resident profiles there.
//! - Every principal: read and edit its own profile (name and phone only —
//!   role, building and apartment move only through the admin path).
//! - Nothing crosses a building boundary.

use crate::error::AuthorizationError;
use crate::principal::Principal;
use crate::types::Role;

use super::types::UserScope;

/// Returns true if the principal may read the target profile.
pub fn can_read(principal: &Principal, target: &Principal) -> bool {
	if principal.id == target.id {
		return true;
	}

	principal.is_admin() && principal.same_building(&target.building_id)
}

/// The widest profile listing the principal is allowed, or denial.
/// Listing is an admin capability; everyone else only reads itself.
pub fn query_scope(principal: &Principal) -> Result<UserScope, AuthorizationError> {
	if principal.is_admin() {
		Ok(UserScope {
			building_id: principal.building_id.clone(),
		})
	} else {
		Err(AuthorizationError::Denied)
	}
}

/// Returns true if the principal may apply a self-service profile patch
/// (display name, phone) to the target.
pub fn can_edit_profile(principal: &Principal, target: &Principal) -> bool {
	principal.id == target.id
}

/// Returns true if the principal may apply an admin edit (including
/// apartment reassignment) to the target. Admins edit resident profiles of
/// their own building only.
pub fn can_admin_edit(principal: &Principal, target: &Principal) -> bool {
	principal.is_admin()
		&& principal.same_building(&target.building_id)
		&& target.role == Role::Resident
}

/// Returns true if the principal may provision a new profile with the given
/// role in its own building. Admins provision residents and technicians;
/// admin profiles come only from self-registration.
pub fn can_provision(principal: &Principal, role: Role) -> bool {
	principal.is_admin() && matches!(role, Role::Resident | Role::Technician)
}

/// Returns true if the principal may delete the target profile.
pub fn can_delete(principal: &Principal, target: &Principal) -> bool {
	can_admin_edit(principal, target)
}
