// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session-to-principal resolution.
//!
//! Cryptographic session verification and account management live behind
//! [`IdentityProvider`]; this module owns the mapping from a verified
//! external identity to the durable profile record. A verified identity
//! without a profile is inconsistent state and never defaults to any role.
//!
//! Resolution is re-run per call. Nothing is cached, so role and apartment
//! changes take effect on the next call.

use std::sync::Arc;

use async_trait::async_trait;
use atrium_core::{AuthenticationError, Principal};
use atrium_db::UserStore;
use chrono::{DateTime, Utc};

use crate::error::{Result, ServiceError};

/// A session credential the provider has accepted.
#[derive(Debug, Clone)]
pub struct VerifiedSession {
	/// Subject identifier at the identity provider.
	pub external_id: String,
	/// When the session expires.
	pub expires_at: DateTime<Utc>,
}

/// Failures at the external identity provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityProviderError {
	/// The session token failed verification.
	#[error("session token failed verification")]
	InvalidSession,

	/// The provider rejected an account operation (duplicate email, weak
	/// password, unknown subject).
	#[error("account operation rejected: {0}")]
	Rejected(String),

	/// The provider could not be reached.
	#[error("identity provider unavailable: {0}")]
	Unavailable(String),
}

/// External identity provider boundary.
///
/// `create_account` is a service-account capability: provisioning a profile
/// never touches the calling admin's own session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
	/// Verify a session token.
	async fn verify_session(&self, token: &str) -> std::result::Result<VerifiedSession, IdentityProviderError>;

	/// Create an account and return its subject identifier.
	async fn create_account(
		&self,
		email: &str,
		password: &str,
	) -> std::result::Result<String, IdentityProviderError>;

	/// Delete an account. Best-effort from the caller's point of view.
	async fn delete_account(&self, external_id: &str) -> std::result::Result<(), IdentityProviderError>;

	/// Change an account's password, re-authenticating with the current one.
	async fn change_password(
		&self,
		external_id: &str,
		current_password: &str,
		new_password: &str,
	) -> std::result::Result<(), IdentityProviderError>;

	/// Send a password-reset email. Succeeds whether or not the address has
	/// an account, so callers cannot probe for registered emails.
	async fn send_password_reset(&self, email: &str) -> std::result::Result<(), IdentityProviderError>;
}

/// Resolves session tokens to principals.
#[derive(Clone)]
pub struct IdentityResolver {
	provider: Arc<dyn IdentityProvider>,
	users: Arc<dyn UserStore>,
}

impl IdentityResolver {
	pub fn new(provider: Arc<dyn IdentityProvider>, users: Arc<dyn UserStore>) -> Self {
		Self { provider, users }
	}

	/// Resolve a session token to a principal.
	///
	/// # Errors
	/// - [`AuthenticationError::Invalid`] when the token fails verification
	/// - [`AuthenticationError::NoProfile`] when the identity has no profile
	///   record
	/// - [`ServiceError::IdentityProvider`] when the provider is unreachable
	#[tracing::instrument(skip(self, token))]
	pub async fn resolve(&self, token: &str) -> Result<Principal> {
		let session = match self.provider.verify_session(token).await {
			Ok(session) => session,
			Err(IdentityProviderError::InvalidSession) => {
				return Err(AuthenticationError::Invalid.into());
			}
			Err(e) => return Err(e.into()),
		};

		if session.expires_at <= Utc::now() {
			return Err(AuthenticationError::Invalid.into());
		}

		match self.users.get_by_external_id(&session.external_id).await? {
			Some(principal) => Ok(principal),
			None => {
				tracing::warn!(external_id = %session.external_id, "verified identity has no profile");
				Err(AuthenticationError::NoProfile.into())
			}
		}
	}
}
