// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Service-level error type.
//!
//! Domain outcomes (authentication, authorization, validation) and
//! infrastructure failures (store, identity provider) are separate variants
//! so callers can retry infrastructure errors without misreading them as
//! domain rejections, and vice versa.

use atrium_core::{AuthenticationError, AuthorizationError, ValidationError};
use atrium_db::DbError;

use crate::identity::IdentityProviderError;

/// Any failure surfaced by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	/// The caller's session could not be resolved to a principal.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),

	/// The resolved principal is not permitted to perform the operation.
	#[error("access denied")]
	Denied,

	/// A domain invariant was violated.
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// The addressed entity does not exist (within the caller's scope).
	#[error("not found: {0}")]
	NotFound(String),

	/// Store failure; retryable.
	#[error("store error: {0}")]
	Db(#[from] DbError),

	/// Identity provider failure; retryable.
	#[error("identity provider error: {0}")]
	IdentityProvider(#[from] IdentityProviderError),
}

impl From<AuthorizationError> for ServiceError {
	fn from(_: AuthorizationError) -> Self {
		ServiceError::Denied
	}
}

pub type Result<T> = std::result::Result<T, ServiceError>;
