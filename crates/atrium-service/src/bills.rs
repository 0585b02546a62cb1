// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scoped bill access.
//!
//! Bills are written by an administrative billing path and read-only here.
//! Every read starts from the policy scope; caller filters narrow inside it
//! and a filter value that would widen the scope is ignored, with the policy
//! value substituted.

use std::sync::Arc;

use atrium_core::{policy, ApartmentId, Bill, BillId, BillStatus, Principal};
use atrium_db::{BillQuery, BillStore};

use crate::error::{Result, ServiceError};

/// Caller-supplied narrowing for a bill listing. All fields optional.
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
	/// Narrow to one apartment. Only honored when the caller's scope spans
	/// the building.
	pub apartment_id: Option<ApartmentId>,
	/// Narrow to one billing month (`YYYY-MM`).
	pub period: Option<String>,
	/// Narrow to one payment status.
	pub status: Option<BillStatus>,
	/// Row cap; unlimited when absent.
	pub limit: Option<i64>,
}

/// Role-scoped bill reads.
#[derive(Clone)]
pub struct BillService {
	bills: Arc<dyn BillStore>,
}

impl BillService {
	pub fn new(bills: Arc<dyn BillStore>) -> Self {
		Self { bills }
	}

	/// List bills the principal may see, newest period first.
	#[tracing::instrument(skip(self, principal, filter), fields(principal_id = %principal.id, role = %principal.role))]
	pub async fn list(&self, principal: &Principal, filter: BillFilter) -> Result<Vec<Bill>> {
		let scope = policy::bills::query_scope(principal)?;

		// A scope-pinned apartment always wins over the caller's filter.
		let apartment_id = scope.apartment_id.or(filter.apartment_id);
		let query = BillQuery {
			building_id: scope.building_id,
			apartment_id,
			period: filter.period,
			status: filter.status,
			limit: filter.limit,
		};

		Ok(self.bills.list(&query).await?)
	}

	/// Get one bill, if it exists and the principal may read it.
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, bill_id = %id))]
	pub async fn get(&self, principal: &Principal, id: &BillId) -> Result<Bill> {
		let bill = self
			.bills
			.get(id)
			.await?
			.ok_or_else(|| ServiceError::NotFound(format!("bill {id}")))?;

		if !policy::bills::can_read(principal, &bill) {
			return Err(ServiceError::Denied);
		}
		Ok(bill)
	}
}
