// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification entity: an announcement targeted at a role within one
//! building.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BuildingId, NotificationCategory, NotificationId, Role, TargetRole, UserId};

/// An announcement created by a building admin.
///
/// Readable by any principal of the building whose role matches
/// `target_role` (or when the target is `all`). Deleted only by an admin of
/// the same building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
	pub id: NotificationId,
	pub building_id: BuildingId,

	pub category: NotificationCategory,
	pub title: String,
	pub content: String,

	/// The audience within the building.
	pub target_role: TargetRole,

	/// The admin who created the notification.
	pub created_by: UserId,

	pub created_at: DateTime<Utc>,
}

impl Notification {
	/// Returns true if a principal with the given role is in the audience.
	pub fn targets_role(&self, role: Role) -> bool {
		self.target_role.matches_role(role)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn make_notification(target_role: TargetRole) -> Notification {
		Notification {
			id: NotificationId::generate(),
			building_id: BuildingId::new("tower-a"),
			category: NotificationCategory::Reminder,
			title: "Service fee due".to_string(),
			content: "Please settle September service fees by the 30th.".to_string(),
			target_role,
			created_by: UserId::generate(),
			created_at: Utc::now(),
		}
	}

	#[test]
	fn all_targets_everyone() {
		let n = make_notification(TargetRole::All);
		assert!(n.targets_role(Role::Resident));
		assert!(n.targets_role(Role::Admin));
		assert!(n.targets_role(Role::Technician));
	}

	#[test]
	fn role_target_is_exclusive() {
		let n = make_notification(TargetRole::Technician);
		assert!(n.targets_role(Role::Technician));
		assert!(!n.targets_role(Role::Resident));
		assert!(!n.targets_role(Role::Admin));
	}
}
