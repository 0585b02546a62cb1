// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store-layer error taxonomy.
//!
//! Everything here is infrastructure or stored-data trouble, kept apart
//! from the domain errors in `atrium-core` so the service layer can tell
//! a retryable failure from a caller mistake. Unique-constraint hits are
//! translated into [`DbError::Conflict`] with a message naming the domain
//! meaning before they leave this crate.

/// Failures raised by the repositories.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
	/// SQLite/sqlx failure: connection, statement, or transaction trouble.
	/// Retryable from the caller's point of view.
	#[error("database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	/// The addressed row does not exist. Raised by mutations that require
	/// their target (assigning or transitioning a request, updating a
	/// profile); plain reads return `Option` instead.
	#[error("not found: {0}")]
	NotFound(String),

	/// A unique constraint rejected the write. Two constraints produce
	/// this: the apartment-occupancy index (one resident per apartment per
	/// building) and the external-identity column (one profile per
	/// identity-provider subject). The message says which.
	#[error("conflict: {0}")]
	Conflict(String),

	/// The document fails a stored-shape invariant (malformed billing
	/// period, bill dates contradicting its status) and was not written.
	#[error("invalid document: {0}")]
	Invalid(String),

	/// A stored value could not be interpreted: a corrupt id, timestamp,
	/// or status code, or a bad connection URL at pool construction.
	#[error("internal: {0}")]
	Internal(String),

	/// The push-token JSON column could not be encoded or decoded.
	#[error("push token serialization: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;
