// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema creation for the Atrium collections.
//!
//! Applied at startup and by the test helpers. Every table carries the
//! `building_id` partition column; the partial unique index on
//! `(building_id, apartment_id)` enforces apartment uniqueness per building
//! at the store level in addition to the provisioning-time check.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

/// Create all tables and indexes if they do not exist.
#[tracing::instrument(skip(pool))]
pub async fn create_schema(pool: &SqlitePool) -> Result<(), DbError> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS users (
			id TEXT PRIMARY KEY,
			external_id TEXT NOT NULL UNIQUE,
			display_name TEXT NOT NULL,
			role TEXT NOT NULL CHECK (role IN ('resident', 'admin', 'technician')),
			building_id TEXT NOT NULL,
			apartment_id TEXT,
			contact_email TEXT,
			contact_phone TEXT,
			push_tokens TEXT NOT NULL DEFAULT '[]',
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		"CREATE UNIQUE INDEX IF NOT EXISTS idx_users_building_apartment \
		 ON users(building_id, apartment_id) WHERE apartment_id IS NOT NULL",
	)
	.execute(pool)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_building ON users(building_id)")
		.execute(pool)
		.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS bills (
			id TEXT PRIMARY KEY,
			building_id TEXT NOT NULL,
			apartment_id TEXT NOT NULL,
			period TEXT NOT NULL,
			service_fee INTEGER NOT NULL,
			parking INTEGER NOT NULL,
			electricity INTEGER NOT NULL,
			water INTEGER NOT NULL,
			status TEXT NOT NULL CHECK (status IN ('paid', 'unpaid')),
			due_date TEXT,
			paid_date TEXT,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_bills_building_apartment \
		 ON bills(building_id, apartment_id)",
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS requests (
			id TEXT PRIMARY KEY,
			building_id TEXT NOT NULL,
			apartment_id TEXT NOT NULL,
			category TEXT NOT NULL CHECK (category IN ('electric', 'water', 'other')),
			title TEXT NOT NULL,
			description TEXT NOT NULL,
			status TEXT NOT NULL CHECK (status IN ('pending', 'processing', 'completed')),
			created_by TEXT NOT NULL,
			assigned_to TEXT,
			created_at TEXT NOT NULL,
			completed_at TEXT,
			rating INTEGER CHECK (rating BETWEEN 1 AND 5),
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_requests_building_apartment \
		 ON requests(building_id, apartment_id)",
	)
	.execute(pool)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_requests_assigned_to ON requests(assigned_to)")
		.execute(pool)
		.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS notifications (
			id TEXT PRIMARY KEY,
			building_id TEXT NOT NULL,
			category TEXT NOT NULL CHECK (category IN ('warning', 'event', 'reminder')),
			title TEXT NOT NULL,
			content TEXT NOT NULL,
			target_role TEXT NOT NULL CHECK (target_role IN ('all', 'resident', 'admin', 'technician')),
			created_by TEXT NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_notifications_building ON notifications(building_id)",
	)
	.execute(pool)
	.await?;

	tracing::debug!("schema created");
	Ok(())
}
