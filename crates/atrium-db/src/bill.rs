// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bill repository.
//!
//! Reads are always driven by a resolved [`BillQuery`]: the service layer
//! folds the authorization scope into the query before it reaches this
//! module, so the partition columns are always bound.

use async_trait::async_trait;
use atrium_core::{ApartmentId, Bill, BillId, BillStatus, BuildingId};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::convert::{parse_enum, parse_opt_timestamp, parse_timestamp};
use crate::error::DbError;

/// A fully resolved bill query: authorization scope plus caller narrowing.
#[derive(Debug, Clone)]
pub struct BillQuery {
	/// Partition key; always bound.
	pub building_id: BuildingId,
	/// Bound when the scope or a narrowing filter pins one apartment.
	pub apartment_id: Option<ApartmentId>,
	/// Narrow to one billing month.
	pub period: Option<String>,
	/// Narrow to one payment status.
	pub status: Option<BillStatus>,
	/// Optional row cap; unlimited when absent.
	pub limit: Option<i64>,
}

#[async_trait]
pub trait BillStore: Send + Sync {
	async fn insert(&self, bill: &Bill) -> Result<(), DbError>;
	async fn get(&self, id: &BillId) -> Result<Option<Bill>, DbError>;
	async fn list(&self, query: &BillQuery) -> Result<Vec<Bill>, DbError>;
}

/// Repository for bill database operations.
#[derive(Clone)]
pub struct BillRepository {
	pool: SqlitePool,
}

impl BillRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	fn row_to_bill(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Bill, DbError> {
		let id: String = row.get("id");
		let status: String = row.get("status");
		let due_date: Option<String> = row.get("due_date");
		let paid_date: Option<String> = row.get("paid_date");
		let created_at: String = row.get("created_at");
		let updated_at: String = row.get("updated_at");

		Ok(Bill {
			id: BillId::new(
				Uuid::parse_str(&id)
					.map_err(|e| DbError::Internal(format!("Invalid stored bill id {id:?}: {e}")))?,
			),
			building_id: BuildingId::new(row.get::<String, _>("building_id")),
			apartment_id: ApartmentId::new(row.get::<String, _>("apartment_id")),
			period: row.get("period"),
			service_fee: row.get("service_fee"),
			parking: row.get("parking"),
			electricity: row.get("electricity"),
			water: row.get("water"),
			status: parse_enum(&status)?,
			due_date: parse_opt_timestamp(due_date)?,
			paid_date: parse_opt_timestamp(paid_date)?,
			created_at: parse_timestamp(&created_at)?,
			updated_at: parse_timestamp(&updated_at)?,
		})
	}
}

#[async_trait]
impl BillStore for BillRepository {
	/// Insert a bill (administrative billing path and tests). Rejects a
	/// malformed period or dates contradicting the status before writing.
	#[tracing::instrument(skip(self, bill), fields(bill_id = %bill.id, building_id = %bill.building_id))]
	async fn insert(&self, bill: &Bill) -> Result<(), DbError> {
		bill.validate().map_err(|e| DbError::Invalid(e.to_string()))?;
		sqlx::query(
			r#"
			INSERT INTO bills (id, building_id, apartment_id, period, service_fee, parking,
			                   electricity, water, status, due_date, paid_date, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(bill.id.to_string())
		.bind(bill.building_id.as_str())
		.bind(bill.apartment_id.as_str())
		.bind(&bill.period)
		.bind(bill.service_fee)
		.bind(bill.parking)
		.bind(bill.electricity)
		.bind(bill.water)
		.bind(bill.status.to_string())
		.bind(bill.due_date.map(|d| d.to_rfc3339()))
		.bind(bill.paid_date.map(|d| d.to_rfc3339()))
		.bind(bill.created_at.to_rfc3339())
		.bind(bill.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// Get a bill by ID. `None` if it does not exist.
	#[tracing::instrument(skip(self), fields(bill_id = %id))]
	async fn get(&self, id: &BillId) -> Result<Option<Bill>, DbError> {
		let row = sqlx::query("SELECT * FROM bills WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| self.row_to_bill(&r)).transpose()
	}

	/// List bills matching the resolved query, newest period first.
	#[tracing::instrument(skip(self, query), fields(building_id = %query.building_id))]
	async fn list(&self, query: &BillQuery) -> Result<Vec<Bill>, DbError> {
		let mut conditions = vec!["building_id = ?".to_string()];
		if query.apartment_id.is_some() {
			conditions.push("apartment_id = ?".to_string());
		}
		if query.period.is_some() {
			conditions.push("period = ?".to_string());
		}
		if query.status.is_some() {
			conditions.push("status = ?".to_string());
		}

		let mut sql = format!(
			"SELECT * FROM bills WHERE {} ORDER BY period DESC, id ASC",
			conditions.join(" AND ")
		);
		if query.limit.is_some() {
			sql.push_str(" LIMIT ?");
		}

		let mut q = sqlx::query(&sql).bind(query.building_id.as_str());
		if let Some(apartment_id) = &query.apartment_id {
			q = q.bind(apartment_id.as_str());
		}
		if let Some(period) = &query.period {
			q = q.bind(period);
		}
		if let Some(status) = query.status {
			q = q.bind(status.to_string());
		}
		if let Some(limit) = query.limit {
			q = q.bind(limit);
		}

		let rows = q.fetch_all(&self.pool).await?;
		rows.iter().map(|r| self.row_to_bill(r)).collect()
	}
}
