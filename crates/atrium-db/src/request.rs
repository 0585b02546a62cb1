// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Maintenance request repository.
//!
//! Besides the usual CRUD, this module carries the conditional write that
//! backs the write-once rating: `set_rating` updates only while the request
//! is completed and unrated, so two concurrent raters resolve to exactly one
//! winner at the store.

use async_trait::async_trait;
use atrium_core::{ApartmentId, BuildingId, Request, RequestId, RequestStatus, UserId};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::convert::{parse_enum, parse_opt_timestamp, parse_timestamp};
use crate::error::DbError;

/// A fully resolved request query: authorization scope plus caller
/// narrowing.
#[derive(Debug, Clone)]
pub struct RequestQuery {
	/// Partition key; always bound.
	pub building_id: BuildingId,
	/// Bound when the scope or a narrowing filter pins one apartment.
	pub apartment_id: Option<ApartmentId>,
	/// Bound when the scope or a narrowing filter pins one assignee.
	pub assigned_to: Option<UserId>,
	/// Narrow to one status.
	pub status: Option<RequestStatus>,
	/// Optional row cap; unlimited when absent.
	pub limit: Option<i64>,
}

#[async_trait]
pub trait RequestStore: Send + Sync {
	async fn insert(&self, request: &Request) -> Result<(), DbError>;
	async fn get(&self, id: &RequestId) -> Result<Option<Request>, DbError>;
	async fn list(&self, query: &RequestQuery) -> Result<Vec<Request>, DbError>;
	async fn assign(&self, id: &RequestId, technician: &UserId) -> Result<(), DbError>;
	async fn update_status(
		&self,
		id: &RequestId,
		status: RequestStatus,
		completed_at: Option<DateTime<Utc>>,
	) -> Result<(), DbError>;
	async fn set_rating(&self, id: &RequestId, rating: u8) -> Result<bool, DbError>;
}

/// Repository for maintenance request database operations.
#[derive(Clone)]
pub struct RequestRepository {
	pool: SqlitePool,
}

impl RequestRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	fn row_to_request(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Request, DbError> {
		let id: String = row.get("id");
		let category: String = row.get("category");
		let status: String = row.get("status");
		let created_by: String = row.get("created_by");
		let assigned_to: Option<String> = row.get("assigned_to");
		let created_at: String = row.get("created_at");
		let completed_at: Option<String> = row.get("completed_at");
		let rating: Option<i64> = row.get("rating");
		let updated_at: String = row.get("updated_at");

		let parse_user = |raw: &str| -> Result<UserId, DbError> {
			Uuid::parse_str(raw)
				.map(UserId::new)
				.map_err(|e| DbError::Internal(format!("Invalid stored user id {raw:?}: {e}")))
		};

		Ok(Request {
			id: RequestId::new(Uuid::parse_str(&id).map_err(|e| {
				DbError::Internal(format!("Invalid stored request id {id:?}: {e}"))
			})?),
			building_id: BuildingId::new(row.get::<String, _>("building_id")),
			apartment_id: ApartmentId::new(row.get::<String, _>("apartment_id")),
			category: parse_enum(&category)?,
			title: row.get("title"),
			description: row.get("description"),
			status: parse_enum(&status)?,
			created_by: parse_user(&created_by)?,
			assigned_to: assigned_to.as_deref().map(parse_user).transpose()?,
			created_at: parse_timestamp(&created_at)?,
			completed_at: parse_opt_timestamp(completed_at)?,
			rating: rating.map(|r| r as u8),
			updated_at: parse_timestamp(&updated_at)?,
		})
	}
}

#[async_trait]
impl RequestStore for RequestRepository {
	/// Insert a new request.
	#[tracing::instrument(skip(self, request), fields(request_id = %request.id, building_id = %request.building_id))]
	async fn insert(&self, request: &Request) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO requests (id, building_id, apartment_id, category, title, description,
			                      status, created_by, assigned_to, created_at, completed_at,
			                      rating, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(request.id.to_string())
		.bind(request.building_id.as_str())
		.bind(request.apartment_id.as_str())
		.bind(request.category.to_string())
		.bind(&request.title)
		.bind(&request.description)
		.bind(request.status.to_string())
		.bind(request.created_by.to_string())
		.bind(request.assigned_to.map(|u| u.to_string()))
		.bind(request.created_at.to_rfc3339())
		.bind(request.completed_at.map(|d| d.to_rfc3339()))
		.bind(request.rating.map(|r| r as i64))
		.bind(request.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(request_id = %request.id, "request created");
		Ok(())
	}

	/// Get a request by ID. `None` if it does not exist.
	#[tracing::instrument(skip(self), fields(request_id = %id))]
	async fn get(&self, id: &RequestId) -> Result<Option<Request>, DbError> {
		let row = sqlx::query("SELECT * FROM requests WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| self.row_to_request(&r)).transpose()
	}

	/// List requests matching the resolved query, newest first; ties broken
	/// by ID ascending for determinism.
	#[tracing::instrument(skip(self, query), fields(building_id = %query.building_id))]
	async fn list(&self, query: &RequestQuery) -> Result<Vec<Request>, DbError> {
		let mut conditions = vec!["building_id = ?".to_string()];
		if query.apartment_id.is_some() {
			conditions.push("apartment_id = ?".to_string());
		}
		if query.assigned_to.is_some() {
			conditions.push("assigned_to = ?".to_string());
		}
		if query.status.is_some() {
			conditions.push("status = ?".to_string());
		}

		let mut sql = format!(
			"SELECT * FROM requests WHERE {} ORDER BY created_at DESC, id ASC",
			conditions.join(" AND ")
		);
		if query.limit.is_some() {
			sql.push_str(" LIMIT ?");
		}

		let mut q = sqlx::query(&sql).bind(query.building_id.as_str());
		if let Some(apartment_id) = &query.apartment_id {
			q = q.bind(apartment_id.as_str());
		}
		if let Some(assigned_to) = query.assigned_to {
			q = q.bind(assigned_to.to_string());
		}
		if let Some(status) = query.status {
			q = q.bind(status.to_string());
		}
		if let Some(limit) = query.limit {
			q = q.bind(limit);
		}

		let rows = q.fetch_all(&self.pool).await?;
		rows.iter().map(|r| self.row_to_request(r)).collect()
	}

	/// Set the assignee.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the request does not exist.
	#[tracing::instrument(skip(self), fields(request_id = %id, technician = %technician))]
	async fn assign(&self, id: &RequestId, technician: &UserId) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE requests SET assigned_to = ?, updated_at = ? WHERE id = ?")
			.bind(technician.to_string())
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("request {id}")));
		}

		tracing::debug!(request_id = %id, "request assigned");
		Ok(())
	}

	/// Persist a status change, together with `completed_at` when the new
	/// status is completed.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the request does not exist.
	#[tracing::instrument(skip(self), fields(request_id = %id, status = %status))]
	async fn update_status(
		&self,
		id: &RequestId,
		status: RequestStatus,
		completed_at: Option<DateTime<Utc>>,
	) -> Result<(), DbError> {
		let result = sqlx::query(
			"UPDATE requests SET status = ?, completed_at = ?, updated_at = ? WHERE id = ?",
		)
		.bind(status.to_string())
		.bind(completed_at.map(|d| d.to_rfc3339()))
		.bind(Utc::now().to_rfc3339())
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("request {id}")));
		}

		tracing::debug!(request_id = %id, status = %status, "request status updated");
		Ok(())
	}

	/// Conditionally set the rating: succeeds only while the request is
	/// completed and unrated. Returns false when the condition did not hold,
	/// which callers surface as the write-once rejection.
	#[tracing::instrument(skip(self), fields(request_id = %id))]
	async fn set_rating(&self, id: &RequestId, rating: u8) -> Result<bool, DbError> {
		let result = sqlx::query(
			"UPDATE requests SET rating = ?, updated_at = ? \
			 WHERE id = ? AND status = 'completed' AND rating IS NULL",
		)
		.bind(rating as i64)
		.bind(Utc::now().to_rfc3339())
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}
}
