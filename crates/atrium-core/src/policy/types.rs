// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query-scope types returned by the policy.
//!
//! A scope is the widest set of rows a principal may see for one entity
//! family. Accessors bind every scope field into the store query and let
//! caller-supplied filters narrow, never widen, the result.

use serde::{Deserialize, Serialize};

use crate::types::{ApartmentId, BuildingId, TargetRole, UserId};

/// The widest bill query a principal is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillScope {
	/// Always the principal's own building.
	pub building_id: BuildingId,
	/// `Some` pins the query to one apartment (residents); `None` spans the
	/// building (admins).
	pub apartment_id: Option<ApartmentId>,
}

/// The widest request query a principal is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestScope {
	/// Always the principal's own building.
	pub building_id: BuildingId,
	/// `Some` pins the query to one apartment (residents).
	pub apartment_id: Option<ApartmentId>,
	/// `Some` pins the query to one assignee (technicians).
	pub assigned_to: Option<UserId>,
}

/// The widest notification query a principal is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationScope {
	/// Always the principal's own building.
	pub building_id: BuildingId,
	/// `Some` restricts to the listed audiences (residents and technicians
	/// see `{all, own role}`); `None` spans every audience (admins).
	pub target_roles: Option<Vec<TargetRole>>,
}

/// The widest profile query a principal is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserScope {
	/// Always the principal's own building.
	pub building_id: BuildingId,
}
