// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous};

use crate::error::DbError;

/// Connection pool for the building database.
///
/// Identity resolution reloads the caller's profile on every call, so the
/// read path is hot; WAL keeps those reads flowing while bills, requests
/// and ratings are written. The busy timeout covers writers contending on
/// the same row, as two residents racing the write-once rating update do.
///
/// `database_url` is an SQLite connection string such as
/// `sqlite:./atrium.db` (see `ServiceConfig::database_url` in the service
/// crate). The file is created on first run.
///
/// # Errors
/// Returns [`DbError::Internal`] for a malformed URL, [`DbError::Sqlx`]
/// when the connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.busy_timeout(Duration::from_secs(5))
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn malformed_url_is_rejected_up_front() {
		let err = create_pool("sqlite:atrium.db?mode=bogus").await.unwrap_err();
		assert!(matches!(err, DbError::Internal(_)));
	}

	#[tokio::test]
	async fn in_memory_pool_serves_queries() {
		let pool = create_pool("sqlite::memory:").await.unwrap();
		let one: i64 = sqlx::query_scalar("SELECT 1")
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(one, 1);
	}
}
