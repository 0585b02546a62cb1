// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification access policy.
//!
//! - Admin: every notification of its own building, plus create and delete.
//! - Resident/technician: read-only, filtered to audiences `{all, own role}`
//!   within their own building.

use crate::error::AuthorizationError;
use crate::notification::Notification;
use crate::principal::Principal;
use crate::types::{BuildingId, Role, TargetRole};

use super::types::NotificationScope;

/// Returns true if the principal may read the given notification.
pub fn can_read(principal: &Principal, notification: &Notification) -> bool {
	if !principal.same_building(&notification.building_id) {
		return false;
	}

	match principal.role {
		Role::Admin => true,
		Role::Resident | Role::Technician => notification.targets_role(principal.role),
	}
}

/// The widest notification query the principal is allowed.
///
/// Every role can read some notifications of its own building, so this
/// never denies; residents and technicians get an audience restriction.
pub fn query_scope(principal: &Principal) -> Result<NotificationScope, AuthorizationError> {
	let target_roles = match principal.role {
		Role::Admin => None,
		Role::Resident | Role::Technician => {
			Some(vec![TargetRole::All, TargetRole::from(principal.role)])
		}
	};

	Ok(NotificationScope {
		building_id: principal.building_id.clone(),
		target_roles,
	})
}

/// Returns true if the principal may create a notification in the given
/// building. Admin of that building only.
pub fn can_create(principal: &Principal, building_id: &BuildingId) -> bool {
	principal.is_admin() && principal.same_building(building_id)
}

/// Returns true if the principal may delete the given notification. Admin
/// of the same building only.
pub fn can_delete(principal: &Principal, notification: &Notification) -> bool {
	principal.is_admin() && principal.same_building(&notification.building_id)
}
