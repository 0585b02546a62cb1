// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::schema::create_schema;

/// An in-memory pool with the full schema applied.
///
/// Capped at one connection: an in-memory SQLite database is private to its
/// connection, so a second pooled connection would see an empty schema.
pub async fn create_test_pool() -> SqlitePool {
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect(":memory:")
		.await
		.unwrap();
	create_schema(&pool).await.unwrap();
	pool
}
