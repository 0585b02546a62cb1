// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bill entity: one billing month for one apartment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{ApartmentId, BillId, BillStatus, BuildingId};

/// A monthly bill for one apartment.
///
/// Amounts are stored in minor currency units. The total is derived from the
/// four itemized charges, never stored. `due_date` and `paid_date` are
/// mutually exclusive by status: an unpaid bill carries a due date, a paid
/// bill carries a paid date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
	pub id: BillId,
	pub building_id: BuildingId,
	pub apartment_id: ApartmentId,

	/// Billing month, `YYYY-MM`.
	pub period: String,

	pub service_fee: i64,
	pub parking: i64,
	pub electricity: i64,
	pub water: i64,

	pub status: BillStatus,
	pub due_date: Option<DateTime<Utc>>,
	pub paid_date: Option<DateTime<Utc>>,

	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Bill {
	/// The sum of the four itemized charges.
	pub fn total(&self) -> i64 {
		self.service_fee + self.parking + self.electricity + self.water
	}

	/// Checks the stored-shape invariants: a well-formed period and the
	/// status-driven date exclusivity. Called at the insertion boundary so
	/// a malformed bill never reaches the store.
	pub fn validate(&self) -> Result<(), ValidationError> {
		validate_period(&self.period)?;
		let dates_match_status = match self.status {
			BillStatus::Unpaid => self.due_date.is_some() && self.paid_date.is_none(),
			BillStatus::Paid => self.paid_date.is_some() && self.due_date.is_none(),
		};
		if !dates_match_status {
			return Err(ValidationError::MismatchedBillDates);
		}
		Ok(())
	}
}

/// Validates a billing period string (`YYYY-MM`, month 01-12).
pub fn validate_period(period: &str) -> Result<(), ValidationError> {
	let bytes = period.as_bytes();
	if bytes.len() != 7 || bytes[4] != b'-' {
		return Err(ValidationError::InvalidPeriod);
	}
	if !period[..4].chars().all(|c| c.is_ascii_digit()) {
		return Err(ValidationError::InvalidPeriod);
	}
	match period[5..].parse::<u8>() {
		Ok(month) if (1..=12).contains(&month) => Ok(()),
		_ => Err(ValidationError::InvalidPeriod),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn make_bill() -> Bill {
		Bill {
			id: BillId::generate(),
			building_id: BuildingId::new("tower-a"),
			apartment_id: ApartmentId::new("A1204"),
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

	#[test]
	fn total_sums_the_four_charges() {
		let bill = make_bill();
		assert_eq!(bill.total(), 1_050_000);
	}

	#[test]
	fn valid_periods_accepted() {
		assert!(validate_period("2025-01").is_ok());
		assert!(validate_period("2025-12").is_ok());
		assert!(validate_period("1999-06").is_ok());
	}

	#[test]
	fn invalid_periods_rejected() {
		for bad in ["2025-13", "2025-00", "2025-9", "202509", "25-09", "abcd-ef", ""] {
			assert_eq!(
				validate_period(bad),
				Err(ValidationError::InvalidPeriod),
				"expected rejection of {bad:?}"
			);
		}
	}

	#[test]
	fn dates_must_match_status() {
		let mut bill = make_bill();
		assert_eq!(bill.validate(), Ok(()));

		// Paid while still carrying a due date.
		bill.status = BillStatus::Paid;
		assert_eq!(bill.validate(), Err(ValidationError::MismatchedBillDates));

		bill.due_date = None;
		bill.paid_date = Some(Utc::now());
		assert_eq!(bill.validate(), Ok(()));

		// Unpaid without a due date.
		bill.status = BillStatus::Unpaid;
		bill.paid_date = None;
		assert_eq!(bill.validate(), Err(ValidationError::MismatchedBillDates));
	}

	#[test]
	fn validate_covers_the_period() {
		let mut bill = make_bill();
		bill.period = "2025-13".to_string();
		assert_eq!(bill.validate(), Err(ValidationError::InvalidPeriod));
	}
}
