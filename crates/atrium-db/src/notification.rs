// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification repository.
//!
//! The audience filter is an IN-clause over `target_role`: non-admin callers
//! always resolve to the broadcast audience plus their own role, admins see
//! every audience in their building.

use async_trait::async_trait;
use atrium_core::{BuildingId, Notification, NotificationId, TargetRole, UserId};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::convert::{parse_enum, parse_timestamp};
use crate::error::DbError;

/// A fully resolved notification query.
#[derive(Debug, Clone)]
pub struct NotificationQuery {
	/// Partition key; always bound.
	pub building_id: BuildingId,
	/// Visible audiences. `None` means every audience (admin reads).
	pub target_roles: Option<Vec<TargetRole>>,
	/// Optional row cap; unlimited when absent.
	pub limit: Option<i64>,
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
	async fn insert(&self, notification: &Notification) -> Result<(), DbError>;
	async fn get(&self, id: &NotificationId) -> Result<Option<Notification>, DbError>;
	async fn list(&self, query: &NotificationQuery) -> Result<Vec<Notification>, DbError>;
	async fn delete(&self, id: &NotificationId) -> Result<bool, DbError>;
}

/// Repository for notification database operations.
#[derive(Clone)]
pub struct NotificationRepository {
	pool: SqlitePool,
}

impl NotificationRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	fn row_to_notification(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Notification, DbError> {
		let id: String = row.get("id");
		let category: String = row.get("category");
		let target_role: String = row.get("target_role");
		let created_by: String = row.get("created_by");
		let created_at: String = row.get("created_at");

		Ok(Notification {
			id: NotificationId::new(Uuid::parse_str(&id).map_err(|e| {
				DbError::Internal(format!("Invalid stored notification id {id:?}: {e}"))
			})?),
			building_id: BuildingId::new(row.get::<String, _>("building_id")),
			category: parse_enum(&category)?,
			title: row.get("title"),
			content: row.get("content"),
			target_role: parse_enum(&target_role)?,
			created_by: UserId::new(Uuid::parse_str(&created_by).map_err(|e| {
				DbError::Internal(format!("Invalid stored user id {created_by:?}: {e}"))
			})?),
			created_at: parse_timestamp(&created_at)?,
		})
	}
}

#[async_trait]
impl NotificationStore for NotificationRepository {
	/// Insert a notification.
	#[tracing::instrument(skip(self, notification), fields(notification_id = %notification.id, building_id = %notification.building_id))]
	async fn insert(&self, notification: &Notification) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO notifications (id, building_id, category, title, content,
			                           target_role, created_by, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(notification.id.to_string())
		.bind(notification.building_id.as_str())
		.bind(notification.category.to_string())
		.bind(&notification.title)
		.bind(&notification.content)
		.bind(notification.target_role.to_string())
		.bind(notification.created_by.to_string())
		.bind(notification.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(notification_id = %notification.id, "notification created");
		Ok(())
	}

	/// Get a notification by ID. `None` if it does not exist.
	#[tracing::instrument(skip(self), fields(notification_id = %id))]
	async fn get(&self, id: &NotificationId) -> Result<Option<Notification>, DbError> {
		let row = sqlx::query("SELECT * FROM notifications WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| self.row_to_notification(&r)).transpose()
	}

	/// List notifications matching the resolved query, newest first; ties
	/// broken by ID ascending for determinism.
	#[tracing::instrument(skip(self, query), fields(building_id = %query.building_id))]
	async fn list(&self, query: &NotificationQuery) -> Result<Vec<Notification>, DbError> {
		let mut sql = String::from("SELECT * FROM notifications WHERE building_id = ?");
		if let Some(roles) = &query.target_roles {
			if roles.is_empty() {
				return Ok(Vec::new());
			}
			let placeholders = vec!["?"; roles.len()].join(", ");
			sql.push_str(&format!(" AND target_role IN ({placeholders})"));
		}
		sql.push_str(" ORDER BY created_at DESC, id ASC");
		if query.limit.is_some() {
			sql.push_str(" LIMIT ?");
		}

		let mut q = sqlx::query(&sql).bind(query.building_id.as_str());
		if let Some(roles) = &query.target_roles {
			for role in roles {
				q = q.bind(role.to_string());
			}
		}
		if let Some(limit) = query.limit {
			q = q.bind(limit);
		}

		let rows = q.fetch_all(&self.pool).await?;
		rows.iter().map(|r| self.row_to_notification(r)).collect()
	}

	/// Delete a notification. Returns false when it did not exist.
	#[tracing::instrument(skip(self), fields(notification_id = %id))]
	async fn delete(&self, id: &NotificationId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}
