// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Maintenance request entity and its lifecycle helpers.
//!
//! A request moves through the forward-only machine
//! `pending → processing → completed`, may be assigned to one technician,
//! and carries a write-once rating settable by its creator once completed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{ApartmentId, BuildingId, RequestCategory, RequestId, RequestStatus, UserId};

/// A maintenance/service ticket raised by a resident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
	pub id: RequestId,
	pub building_id: BuildingId,
	pub apartment_id: ApartmentId,

	pub category: RequestCategory,
	pub title: String,
	pub description: String,

	pub status: RequestStatus,

	/// The resident who raised the request.
	pub created_by: UserId,

	/// The technician working the request, unset while pending.
	pub assigned_to: Option<UserId>,

	pub created_at: DateTime<Utc>,

	/// Set exactly when the status becomes completed.
	pub completed_at: Option<DateTime<Utc>>,

	/// Write-once resident rating, 1..=5, settable only after completion.
	pub rating: Option<u8>,

	pub updated_at: DateTime<Utc>,
}

impl Request {
	/// Returns true if the request is assigned to the given user.
	pub fn is_assigned_to(&self, user_id: &UserId) -> bool {
		self.assigned_to.as_ref() == Some(user_id)
	}

	/// Returns true if the given user created the request.
	pub fn is_created_by(&self, user_id: &UserId) -> bool {
		&self.created_by == user_id
	}

	/// Returns true if the request is completed.
	pub fn is_completed(&self) -> bool {
		self.status == RequestStatus::Completed
	}
}

/// Validates a rating value (1..=5).
pub fn validate_rating(rating: u8) -> Result<(), ValidationError> {
	if (1..=5).contains(&rating) {
		Ok(())
	} else {
		Err(ValidationError::InvalidRating)
	}
}
