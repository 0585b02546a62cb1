// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Maintenance request access policy.
//!
//! - Admin: all requests in its own building; may assign and transition.
//! - Resident: only requests of its own apartment; may create and, once a
//!   request it created is completed, rate it.
//! - Technician: only requests assigned to it; may transition those, never
//!   reassign them.

use crate::error::AuthorizationError;
use crate::principal::Principal;
use crate::request::Request;
use crate::types::Role;

use super::types::RequestScope;

/// Returns true if the principal may read the given request.
pub fn can_read(principal: &Principal, request: &Request) -> bool {
	if !principal.same_building(&request.building_id) {
		return false;
	}

	match principal.role {
		Role::Admin => true,
		Role::Resident => principal.apartment_id.as_ref() == Some(&request.apartment_id),
		Role::Technician => request.is_assigned_to(&principal.id),
	}
}

/// The widest request query the principal is allowed, or denial.
pub fn query_scope(principal: &Principal) -> Result<RequestScope, AuthorizationError> {
	match principal.role {
		Role::Admin => Ok(RequestScope {
			building_id: principal.building_id.clone(),
			apartment_id: None,
			assigned_to: None,
		}),
		Role::Resident => match &principal.apartment_id {
			Some(apartment_id) => Ok(RequestScope {
				building_id: principal.building_id.clone(),
				apartment_id: Some(apartment_id.clone()),
				assigned_to: None,
			}),
			None => Err(AuthorizationError::Denied),
		},
		Role::Technician => Ok(RequestScope {
			building_id: principal.building_id.clone(),
			apartment_id: None,
			assigned_to: Some(principal.id),
		}),
	}
}

/// Returns true if the principal may create a request.
///
/// Only residents create requests; the created request's building and
/// apartment are always forced to the creator's own values and its status
/// to pending, regardless of what a client supplies.
pub fn can_create(principal: &Principal) -> bool {
	principal.is_resident() && principal.apartment_id.is_some()
}

/// Returns true if the principal may change the request's assignee.
///
/// Admin only, within its own building, and never once completed. A
/// technician may not reassign a request, not even its own.
pub fn can_assign(principal: &Principal, request: &Request) -> bool {
	principal.is_admin() && principal.same_building(&request.building_id) && !request.is_completed()
}

/// Returns true if the principal may move the request's status forward.
///
/// Admin (any request in its building) or the assigned technician. A
/// technician never touches another technician's request.
pub fn can_transition(principal: &Principal, request: &Request) -> bool {
	if !principal.same_building(&request.building_id) {
		return false;
	}

	match principal.role {
		Role::Admin => true,
		Role::Technician => request.is_assigned_to(&principal.id),
		Role::Resident => false,
	}
}

/// Returns true if the principal may rate the request.
///
/// Only the original resident creator, and only once the request is
/// completed. Write-once enforcement (no rating exists yet) is a
/// validation concern handled by the store's conditional write.
pub fn can_rate(principal: &Principal, request: &Request) -> bool {
	principal.is_resident()
		&& principal.same_building(&request.building_id)
		&& request.is_created_by(&principal.id)
		&& request.is_completed()
}
