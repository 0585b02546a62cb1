// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fixture constructors shared by unit and integration tests.

use chrono::Utc;

use crate::bill::Bill;
use crate::notification::Notification;
use crate::principal::Principal;
use crate::request::Request;
use crate::types::{
	ApartmentId, BillId, BillStatus, BuildingId, NotificationCategory, NotificationId,
	RequestCategory, RequestId, RequestStatus, Role, TargetRole, UserId,
};

/// A principal with a fresh ID in the given building. Residents get the
/// supplied apartment.
pub fn make_principal(role: Role, building: &str, apartment: Option<&str>) -> Principal {
	let id = UserId::generate();
	Principal {
		id,
		external_id: format!("idp-{id}"),
		display_name: format!("{role} {id}"),
		role,
		building_id: BuildingId::new(building),
		apartment_id: apartment.map(ApartmentId::new),
		contact_email: None,
		contact_phone: None,
		push_tokens: Vec::new(),
		created_at: Utc::now(),
		updated_at: Utc::now(),
	}
}

/// An unpaid bill for the given building and apartment.
pub fn make_bill(building: &str, apartment: &str) -> Bill {
	Bill {
		id: BillId::generate(),
		building_id: BuildingId::new(building),
		apartment_id: ApartmentId::new(apartment),
		period: "2025-09".to_string(),
		service_fee: 500_000,
		parking: 120_000,
		electricity: 350_000,
		water: 80_000,
		status: BillStatus::Unpaid,
		due_date: Some(Utc::now()),
		paid_date: None,
		created_at: Utc::now(),
		updated_at: Utc::now(),
	}
}

/// A pending, unassigned request for the given building and apartment.
pub fn make_request(building: &str, apartment: &str) -> Request {
	Request {
		id: RequestId::generate(),
		building_id: BuildingId::new(building),
		apartment_id: ApartmentId::new(apartment),
		category: RequestCategory::Water,
		title: "Leaking faucet".to_string(),
		description: "Dripping since this morning".to_string(),
		status: RequestStatus::Pending,
		created_by: UserId::generate(),
		assigned_to: None,
		created_at: Utc::now(),
		completed_at: None,
		rating: None,
		updated_at: Utc::now(),
	}
}

/// A notification for the given building and audience.
pub fn make_notification(building: &str, target_role: TargetRole) -> Notification {
	Notification {
		id: NotificationId::generate(),
		building_id: BuildingId::new(building),
		category: NotificationCategory::Warning,
		title: "Elevator maintenance".to_string(),
		content: "The elevator will be serviced 8-10am.".to_string(),
		target_role,
		created_by: UserId::generate(),
		created_at: Utc::now(),
	}
}
