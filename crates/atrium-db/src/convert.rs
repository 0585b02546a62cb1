// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row conversion helpers shared by the repositories.
//!
//! Timestamps are stored as RFC 3339 text and enums as their snake_case
//! display form; a malformed stored value is an internal error, never a
//! caller error.

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::error::DbError;

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid stored timestamp {raw:?}: {e}")))
}

pub(crate) fn parse_opt_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>, DbError> {
	raw.as_deref().map(parse_timestamp).transpose()
}

pub(crate) fn parse_enum<T>(raw: &str) -> Result<T, DbError>
where
	T: FromStr<Err = String>,
{
	T::from_str(raw).map_err(DbError::Internal)
}
