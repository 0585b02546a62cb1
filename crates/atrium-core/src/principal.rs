// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Principal: an authenticated actor with a resolved role and
//! building/apartment scope.
//!
//! The principal is the durable profile behind an external identity. It is
//! re-resolved on every call and passed explicitly to every accessor and
//! mutation; nothing in this codebase reads a principal from ambient state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ApartmentId, BuildingId, Role, UserId};

/// An authenticated actor: the durable profile record behind an external
/// identity.
///
/// # Invariants
///
/// - A resident always has a non-empty `apartment_id` within `building_id`.
/// - An apartment is unique within a building.
/// - Every principal belongs to exactly one building.
///
/// # PII Handling
///
/// `display_name`, `contact_email` and `contact_phone` are user-provided PII
/// and should be redacted in logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
	/// Unique identifier of the profile record.
	pub id: UserId,

	/// Subject identifier at the external identity provider.
	pub external_id: String,

	/// Display name shown in the UI.
	pub display_name: String,

	/// The principal's role within its building.
	pub role: Role,

	/// The building this principal belongs to.
	pub building_id: BuildingId,

	/// The apartment occupied by the principal. Present only for residents.
	pub apartment_id: Option<ApartmentId>,

	/// Email address for notifications.
	pub contact_email: Option<String>,

	/// Phone number.
	pub contact_phone: Option<String>,

	/// Device tokens registered for push delivery. Registered idempotently,
	/// pruned when the delivery service reports them stale.
	pub push_tokens: Vec<String>,

	/// When the profile was created.
	pub created_at: DateTime<Utc>,

	/// When the profile was last updated.
	pub updated_at: DateTime<Utc>,
}

impl Principal {
	/// Returns true if the principal is a building admin.
	pub fn is_admin(&self) -> bool {
		self.role == Role::Admin
	}

	/// Returns true if the principal is a resident.
	pub fn is_resident(&self) -> bool {
		self.role == Role::Resident
	}

	/// Returns true if the principal is a technician.
	pub fn is_technician(&self) -> bool {
		self.role == Role::Technician
	}

	/// Returns true if the principal belongs to the given building.
	pub fn same_building(&self, building_id: &BuildingId) -> bool {
		&self.building_id == building_id
	}
}

/// Fields of a profile a principal may edit about itself.
///
/// Role, building and apartment are deliberately absent; those move only
/// through the admin mutation path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
	/// New display name, if changing.
	pub display_name: Option<String>,

	/// New phone number, if changing.
	pub contact_phone: Option<String>,
}

impl ProfilePatch {
	/// Returns true if the patch changes nothing.
	pub fn is_empty(&self) -> bool {
		self.display_name.is_none() && self.contact_phone.is_none()
	}
}
