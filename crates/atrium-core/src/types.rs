// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for the Atrium domain.
//!
//! This module defines the foundational types used throughout the system:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for different entity
//!   types ([`UserId`], [`BillId`], [`RequestId`], [`NotificationId`])
//!   preventing accidental mixing
//! - **Partition keys**: [`BuildingId`] and [`ApartmentId`], human-assigned
//!   identifiers that scope every entity
//! - **Role enums**: [`Role`] for principals and [`TargetRole`] for
//!   notification targeting
//! - **Status enums**: [`BillStatus`] and [`RequestStatus`] (a forward-only
//!   state machine)
//!
//! All ID types implement transparent serde serialization (as UUID strings)
//! and provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a principal (user profile).");
define_id_type!(BillId, "Unique identifier for a bill.");
define_id_type!(RequestId, "Unique identifier for a maintenance request.");
define_id_type!(NotificationId, "Unique identifier for a notification.");

// =============================================================================
// Partition Keys
// =============================================================================

/// Identifier for a building, the top-level isolation boundary.
///
/// Buildings are human-assigned (e.g. a slug chosen at admin registration),
/// not UUIDs. No data operation may cross a building boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(String);

impl BuildingId {
	/// Create a building ID from a raw string.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// The raw string value.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for BuildingId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for BuildingId {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

/// Identifier for an apartment within a building (e.g. "A1204").
///
/// Unique within a building: no two residents of the same building share an
/// apartment. The same apartment ID may exist in different buildings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApartmentId(String);

impl ApartmentId {
	/// Create an apartment ID from a raw string.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// The raw string value.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ApartmentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for ApartmentId {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

// =============================================================================
// Roles
// =============================================================================

/// The role of a principal within its building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Occupies exactly one apartment; creates and rates requests.
	Resident,
	/// Manages the building: users, notifications, request assignment.
	Admin,
	/// Works assigned requests; no bill access.
	Technician,
}

impl Role {
	/// Returns all available roles.
	pub fn all() -> &'static [Role] {
		&[Role::Resident, Role::Admin, Role::Technician]
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Resident => write!(f, "resident"),
			Role::Admin => write!(f, "admin"),
			Role::Technician => write!(f, "technician"),
		}
	}
}

impl std::str::FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"resident" => Ok(Role::Resident),
			"admin" => Ok(Role::Admin),
			"technician" => Ok(Role::Technician),
			other => Err(format!("unknown role: {other}")),
		}
	}
}

/// The audience of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRole {
	/// Every principal in the building.
	All,
	/// Residents only.
	Resident,
	/// Admins only.
	Admin,
	/// Technicians only.
	Technician,
}

impl TargetRole {
	/// Returns true if a principal with the given role is in this audience.
	pub fn matches_role(&self, role: Role) -> bool {
		match self {
			TargetRole::All => true,
			TargetRole::Resident => role == Role::Resident,
			TargetRole::Admin => role == Role::Admin,
			TargetRole::Technician => role == Role::Technician,
		}
	}
}

impl fmt::Display for TargetRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TargetRole::All => write!(f, "all"),
			TargetRole::Resident => write!(f, "resident"),
			TargetRole::Admin => write!(f, "admin"),
			TargetRole::Technician => write!(f, "technician"),
		}
	}
}

impl std::str::FromStr for TargetRole {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"all" => Ok(TargetRole::All),
			"resident" => Ok(TargetRole::Resident),
			"admin" => Ok(TargetRole::Admin),
			"technician" => Ok(TargetRole::Technician),
			other => Err(format!("unknown target role: {other}")),
		}
	}
}

impl From<Role> for TargetRole {
	fn from(role: Role) -> Self {
		match role {
			Role::Resident => TargetRole::Resident,
			Role::Admin => TargetRole::Admin,
			Role::Technician => TargetRole::Technician,
		}
	}
}

// =============================================================================
// Bill Status
// =============================================================================

/// Payment status of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
	/// Settled; `paid_date` is set, `due_date` is not.
	Paid,
	/// Outstanding; `due_date` is set, `paid_date` is not.
	Unpaid,
}

impl fmt::Display for BillStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BillStatus::Paid => write!(f, "paid"),
			BillStatus::Unpaid => write!(f, "unpaid"),
		}
	}
}

impl std::str::FromStr for BillStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"paid" => Ok(BillStatus::Paid),
			"unpaid" => Ok(BillStatus::Unpaid),
			other => Err(format!("unknown bill status: {other}")),
		}
	}
}

// =============================================================================
// Request Status
// =============================================================================

/// Status of a maintenance request.
///
/// A forward-only state machine: `pending → processing → completed`. No
/// transition skips a state or moves backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
	/// Newly created, not yet picked up.
	Pending,
	/// Assigned and being worked.
	Processing,
	/// Done; `completed_at` is set.
	Completed,
}

impl RequestStatus {
	/// Returns true if a transition from this status to `next` is legal.
	pub fn can_transition_to(&self, next: RequestStatus) -> bool {
		matches!(
			(self, next),
			(RequestStatus::Pending, RequestStatus::Processing)
				| (RequestStatus::Processing, RequestStatus::Completed)
		)
	}
}

impl fmt::Display for RequestStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RequestStatus::Pending => write!(f, "pending"),
			RequestStatus::Processing => write!(f, "processing"),
			RequestStatus::Completed => write!(f, "completed"),
		}
	}
}

impl std::str::FromStr for RequestStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(RequestStatus::Pending),
			"processing" => Ok(RequestStatus::Processing),
			"completed" => Ok(RequestStatus::Completed),
			other => Err(format!("unknown request status: {other}")),
		}
	}
}

/// Category of a maintenance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
	Electric,
	Water,
	Other,
}

impl fmt::Display for RequestCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RequestCategory::Electric => write!(f, "electric"),
			RequestCategory::Water => write!(f, "water"),
			RequestCategory::Other => write!(f, "other"),
		}
	}
}

impl std::str::FromStr for RequestCategory {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"electric" => Ok(RequestCategory::Electric),
			"water" => Ok(RequestCategory::Water),
			"other" => Ok(RequestCategory::Other),
			other => Err(format!("unknown request category: {other}")),
		}
	}
}

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
	Warning,
	Event,
	Reminder,
}

impl fmt::Display for NotificationCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NotificationCategory::Warning => write!(f, "warning"),
			NotificationCategory::Event => write!(f, "event"),
			NotificationCategory::Reminder => write!(f, "reminder"),
		}
	}
}

impl std::str::FromStr for NotificationCategory {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"warning" => Ok(NotificationCategory::Warning),
			"event" => Ok(NotificationCategory::Event),
			"reminder" => Ok(NotificationCategory::Reminder),
			other => Err(format!("unknown notification category: {other}")),
		}
	}
}
