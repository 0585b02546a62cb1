// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory stand-ins for the external boundaries, shared by unit and
//! integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use atrium_core::Notification;
use chrono::{DateTime, Duration, Utc};

use crate::identity::{IdentityProvider, IdentityProviderError, VerifiedSession};
use crate::push::{DeliveryReport, PushDelivery, PushDeliveryError};

/// One session the stub provider will accept.
#[derive(Debug, Clone)]
pub struct StubSession {
	pub external_id: String,
	pub expires_at: DateTime<Utc>,
}

impl StubSession {
	/// A session valid for an hour.
	pub fn valid(external_id: &str) -> Self {
		Self {
			external_id: external_id.to_string(),
			expires_at: Utc::now() + Duration::hours(1),
		}
	}
}

/// Identity provider backed by an in-memory token table.
///
/// Created accounts get deterministic `idp-acct-N` subjects; deletions are
/// recorded so tests can assert on best-effort cleanup.
#[derive(Default)]
pub struct StubIdentityProvider {
	sessions: Mutex<HashMap<String, StubSession>>,
	accounts: Mutex<Vec<String>>,
	deleted: Mutex<Vec<String>>,
	password_changes: Mutex<Vec<String>>,
	password_resets: Mutex<Vec<String>>,
	fail_account_creation: Mutex<bool>,
}

impl StubIdentityProvider {
	pub fn add_session(&self, token: &str, session: StubSession) {
		self.sessions
			.lock()
			.unwrap()
			.insert(token.to_string(), session);
	}

	/// Make every subsequent `create_account` call fail.
	pub fn fail_account_creation(&self) {
		*self.fail_account_creation.lock().unwrap() = true;
	}

	/// Subjects passed to `delete_account`, in call order.
	pub fn deleted_accounts(&self) -> Vec<String> {
		self.deleted.lock().unwrap().clone()
	}

	/// Subjects created so far.
	pub fn created_accounts(&self) -> Vec<String> {
		self.accounts.lock().unwrap().clone()
	}

	/// Subjects whose password was changed, in call order.
	pub fn password_changes(&self) -> Vec<String> {
		self.password_changes.lock().unwrap().clone()
	}

	/// Emails a reset was sent to, in call order.
	pub fn password_resets(&self) -> Vec<String> {
		self.password_resets.lock().unwrap().clone()
	}
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
	async fn verify_session(
		&self,
		token: &str,
	) -> Result<VerifiedSession, IdentityProviderError> {
		let sessions = self.sessions.lock().unwrap();
		match sessions.get(token) {
			Some(session) => Ok(VerifiedSession {
				external_id: session.external_id.clone(),
				expires_at: session.expires_at,
			}),
			None => Err(IdentityProviderError::InvalidSession),
		}
	}

	async fn create_account(
		&self,
		email: &str,
		_password: &str,
	) -> Result<String, IdentityProviderError> {
		if *self.fail_account_creation.lock().unwrap() {
			return Err(IdentityProviderError::Unavailable("stub outage".to_string()));
		}

		let mut accounts = self.accounts.lock().unwrap();
		if accounts.iter().any(|a| a == email) {
			return Err(IdentityProviderError::Rejected(format!(
				"account exists for {email}"
			)));
		}
		accounts.push(email.to_string());
		Ok(format!("idp-acct-{}", accounts.len()))
	}

	async fn delete_account(&self, external_id: &str) -> Result<(), IdentityProviderError> {
		self.deleted.lock().unwrap().push(external_id.to_string());
		Ok(())
	}

	async fn change_password(
		&self,
		external_id: &str,
		current_password: &str,
		_new_password: &str,
	) -> Result<(), IdentityProviderError> {
		if current_password.is_empty() {
			return Err(IdentityProviderError::Rejected(
				"re-authentication failed".to_string(),
			));
		}
		self.password_changes
			.lock()
			.unwrap()
			.push(external_id.to_string());
		Ok(())
	}

	async fn send_password_reset(&self, email: &str) -> Result<(), IdentityProviderError> {
		self.password_resets.lock().unwrap().push(email.to_string());
		Ok(())
	}
}

/// Push transport that records every fan-out instead of delivering.
#[derive(Default)]
pub struct RecordingPushDelivery {
	deliveries: Mutex<Vec<(String, Vec<String>)>>,
	stale: Mutex<Vec<String>>,
	fail_next: Mutex<bool>,
}

impl RecordingPushDelivery {
	/// Mark tokens the transport should report stale.
	pub fn mark_stale(&self, token: &str) {
		self.stale.lock().unwrap().push(token.to_string());
	}

	/// Make the next delivery fail outright.
	pub fn fail_next(&self) {
		*self.fail_next.lock().unwrap() = true;
	}

	/// Recorded fan-outs as `(notification title, tokens)` pairs.
	pub fn deliveries(&self) -> Vec<(String, Vec<String>)> {
		self.deliveries.lock().unwrap().clone()
	}
}

#[async_trait]
impl PushDelivery for RecordingPushDelivery {
	async fn deliver(
		&self,
		notification: &Notification,
		tokens: &[String],
	) -> Result<DeliveryReport, PushDeliveryError> {
		let mut fail_next = self.fail_next.lock().unwrap();
		if *fail_next {
			*fail_next = false;
			return Err(PushDeliveryError("stub transport failure".to_string()));
		}
		drop(fail_next);

		self.deliveries
			.lock()
			.unwrap()
			.push((notification.title.clone(), tokens.to_vec()));

		let stale = self.stale.lock().unwrap();
		let stale_tokens: Vec<String> = tokens
			.iter()
			.filter(|t| stale.contains(t))
			.cloned()
			.collect();
		Ok(DeliveryReport {
			delivered: tokens.len() - stale_tokens.len(),
			stale_tokens,
		})
	}
}
