// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Domain error taxonomy.
//!
//! Three classes of caller-visible failure are defined here:
//!
//! - [`AuthenticationError`]: the principal could not be resolved; callers
//!   must re-authenticate
//! - [`AuthorizationError`]: the principal is resolved but the operation is
//!   not permitted; always explicit, never expressed as an empty result set
//! - [`ValidationError`]: a domain invariant was violated; caller-correctable
//!
//! Infrastructure failures (store unreachable, provider timeout) are a
//! separate class carried by the db and service crates so that callers can
//! retry them without misreading them as domain errors.

use crate::types::RequestStatus;

/// The principal could not be resolved from a session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
	/// The session token could not be verified.
	#[error("session is invalid or expired")]
	Invalid,

	/// The identity exists at the provider but has no profile record.
	/// This is inconsistent state and must never default to any role.
	#[error("identity has no profile record")]
	NoProfile,
}

/// The principal lacks permission for the requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
	/// Deny-by-default: any role/operation combination not explicitly
	/// allowed by the policy.
	#[error("access denied")]
	Denied,
}

/// A domain invariant was violated.
///
/// These are expected conditions, surfaced with enough detail for a caller
/// to explain the problem, but never leaking data from another building or
/// apartment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
	/// The apartment is already occupied within this building.
	#[error("apartment is already assigned within this building")]
	DuplicateApartment,

	/// The requested status change does not follow
	/// `pending → processing → completed`.
	#[error("invalid status transition: {from} -> {to}")]
	InvalidTransition {
		from: RequestStatus,
		to: RequestStatus,
	},

	/// The request already carries a rating; ratings are write-once.
	#[error("request has already been rated")]
	AlreadyRated,

	/// A required field was missing or empty.
	#[error("missing required field: {0}")]
	MissingRequiredField(&'static str),

	/// Rating outside the accepted 1..=5 range.
	#[error("rating must be between 1 and 5")]
	InvalidRating,

	/// Billing period not in `YYYY-MM` form.
	#[error("billing period must be formatted as YYYY-MM")]
	InvalidPeriod,

	/// `due_date`/`paid_date` do not match the bill's status: an unpaid
	/// bill carries a due date only, a paid bill a paid date only.
	#[error("bill dates do not match its status")]
	MismatchedBillDates,

	/// The assignee does not exist, is not a technician, or belongs to a
	/// different building.
	#[error("assignee is not a technician of this building")]
	InvalidAssignee,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transition_error_names_both_states() {
		let err = ValidationError::InvalidTransition {
			from: RequestStatus::Pending,
			to: RequestStatus::Completed,
		};
		assert_eq!(
			err.to_string(),
			"invalid status transition: pending -> completed"
		);
	}

	#[test]
	fn missing_field_names_the_field() {
		let err = ValidationError::MissingRequiredField("title");
		assert_eq!(err.to_string(), "missing required field: title");
	}

	#[test]
	fn denied_is_explicit() {
		assert_eq!(AuthorizationError::Denied.to_string(), "access denied");
	}
}
