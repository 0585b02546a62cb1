// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bill access policy.
//!
//! - Admin: all bills in its own building.
//! - Resident: only bills matching its own building **and** apartment.
//! - Technician: no bill access at all.

use crate::bill::Bill;
use crate::error::AuthorizationError;
use crate::principal::Principal;
use crate::types::Role;

use super::types::BillScope;

/// Returns true if the principal may read the given bill.
pub fn can_read(principal: &Principal, bill: &Bill) -> bool {
	if !principal.same_building(&bill.building_id) {
		return false;
	}

	match principal.role {
		Role::Admin => true,
		Role::Resident => principal.apartment_id.as_ref() == Some(&bill.apartment_id),
		Role::Technician => false,
	}
}

/// The widest bill query the principal is allowed, or denial.
pub fn query_scope(principal: &Principal) -> Result<BillScope, AuthorizationError> {
	match principal.role {
		Role::Admin => Ok(BillScope {
			building_id: principal.building_id.clone(),
			apartment_id: None,
		}),
		Role::Resident => match &principal.apartment_id {
			Some(apartment_id) => Ok(BillScope {
				building_id: principal.building_id.clone(),
				apartment_id: Some(apartment_id.clone()),
			}),
			// A resident without an apartment violates an invariant; deny
			// rather than widen to the whole building.
			None => Err(AuthorizationError::Denied),
		},
		Role::Technician => Err(AuthorizationError::Denied),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{make_bill, make_principal};
	use crate::types::{ApartmentId, BuildingId};

	#[test]
	fn admin_reads_any_bill_in_own_building() {
		let admin = make_principal(Role::Admin, "tower-a", None);
		let bill = make_bill("tower-a", "B0703");
		assert!(can_read(&admin, &bill));
	}

	#[test]
	fn admin_cannot_read_other_building() {
		let admin = make_principal(Role::Admin, "tower-a", None);
		let bill = make_bill("tower-b", "B0703");
		assert!(!can_read(&admin, &bill));
	}

	#[test]
	fn resident_reads_only_own_apartment() {
		let resident = make_principal(Role::Resident, "tower-a", Some("A1204"));
		assert!(can_read(&resident, &make_bill("tower-a", "A1204")));
		assert!(!can_read(&resident, &make_bill("tower-a", "B0703")));
		assert!(!can_read(&resident, &make_bill("tower-b", "A1204")));
	}

	#[test]
	fn technician_has_no_bill_access() {
		let tech = make_principal(Role::Technician, "tower-a", None);
		assert!(!can_read(&tech, &make_bill("tower-a", "A1204")));
		assert_eq!(query_scope(&tech), Err(AuthorizationError::Denied));
	}

	#[test]
	fn admin_scope_spans_building() {
		let admin = make_principal(Role::Admin, "tower-a", None);
		let scope = query_scope(&admin).unwrap();
		assert_eq!(scope.building_id, BuildingId::new("tower-a"));
		assert_eq!(scope.apartment_id, None);
	}

	#[test]
	fn resident_scope_pins_apartment() {
		let resident = make_principal(Role::Resident, "tower-a", Some("A1204"));
		let scope = query_scope(&resident).unwrap();
		assert_eq!(scope.building_id, BuildingId::new("tower-a"));
		assert_eq!(scope.apartment_id, Some(ApartmentId::new("A1204")));
	}

	#[test]
	fn apartmentless_resident_is_denied_not_widened() {
		let broken = make_principal(Role::Resident, "tower-a", None);
		assert_eq!(query_scope(&broken), Err(AuthorizationError::Denied));
	}
}
