// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification accessors, creation with push fan-out, and deletion.
//!
//! Fan-out is strictly best-effort: the notification row is the durable
//! outcome, and a transport failure after the write is logged and swallowed.
//! Tokens the transport reports stale are pruned from the owning profiles,
//! also best-effort.

use std::sync::Arc;

use atrium_core::{
	policy, Notification, NotificationCategory, NotificationId, Principal, TargetRole,
	ValidationError,
};
use atrium_db::{NotificationQuery, NotificationStore, UserStore};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::push::PushDelivery;

/// Caller-supplied narrowing for a notification listing.
#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
	/// Row cap; unlimited when absent.
	pub limit: Option<i64>,
}

/// Client-supplied fields of a new notification. The building comes from
/// the creating admin's own partition.
#[derive(Debug, Clone)]
pub struct NewNotification {
	pub category: NotificationCategory,
	pub title: String,
	pub content: String,
	pub target_role: TargetRole,
}

/// Role-scoped notification reads and the admin mutations.
#[derive(Clone)]
pub struct NotificationService {
	notifications: Arc<dyn NotificationStore>,
	users: Arc<dyn UserStore>,
	push: Option<Arc<dyn PushDelivery>>,
}

impl NotificationService {
	/// `push` is `None` when fan-out is disabled by configuration.
	pub fn new(
		notifications: Arc<dyn NotificationStore>,
		users: Arc<dyn UserStore>,
		push: Option<Arc<dyn PushDelivery>>,
	) -> Self {
		Self {
			notifications,
			users,
			push,
		}
	}

	/// List notifications the principal may see, newest first. Residents and
	/// technicians see the broadcast audience plus their own; admins see all.
	#[tracing::instrument(skip(self, principal, filter), fields(principal_id = %principal.id, role = %principal.role))]
	pub async fn list(
		&self,
		principal: &Principal,
		filter: NotificationFilter,
	) -> Result<Vec<Notification>> {
		let scope = policy::notifications::query_scope(principal)?;
		let query = NotificationQuery {
			building_id: scope.building_id,
			target_roles: scope.target_roles,
			limit: filter.limit,
		};
		Ok(self.notifications.list(&query).await?)
	}

	/// Get one notification, if it exists and the principal may read it.
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, notification_id = %id))]
	pub async fn get(&self, principal: &Principal, id: &NotificationId) -> Result<Notification> {
		let notification = self.load(id).await?;
		if !policy::notifications::can_read(principal, &notification) {
			return Err(ServiceError::Denied);
		}
		Ok(notification)
	}

	/// Create a notification in the admin's own building, then fan out to
	/// the matching audience's devices.
	#[tracing::instrument(skip(self, principal, new), fields(principal_id = %principal.id))]
	pub async fn create(&self, principal: &Principal, new: NewNotification) -> Result<Notification> {
		if !policy::notifications::can_create(principal, &principal.building_id) {
			return Err(ServiceError::Denied);
		}
		if new.title.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("title").into());
		}
		if new.content.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("content").into());
		}

		let notification = Notification {
			id: NotificationId::new(Uuid::new_v4()),
			building_id: principal.building_id.clone(),
			category: new.category,
			title: new.title,
			content: new.content,
			target_role: new.target_role,
			created_by: principal.id,
			created_at: Utc::now(),
		};
		self.notifications.insert(&notification).await?;
		tracing::info!(notification_id = %notification.id, target = %notification.target_role, "notification created");

		self.fan_out(&notification).await;
		Ok(notification)
	}

	/// Delete a notification. Admin of the same building only.
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, notification_id = %id))]
	pub async fn delete(&self, principal: &Principal, id: &NotificationId) -> Result<()> {
		let notification = self.load(id).await?;
		if !policy::notifications::can_delete(principal, &notification) {
			return Err(ServiceError::Denied);
		}

		if !self.notifications.delete(id).await? {
			return Err(ServiceError::NotFound(format!("notification {id}")));
		}
		tracing::info!(notification_id = %id, "notification deleted");
		Ok(())
	}

	/// Deliver to every registered device of the matching audience. Failures
	/// are logged; stale tokens are pruned from the owning profiles.
	async fn fan_out(&self, notification: &Notification) {
		let Some(push) = &self.push else {
			return;
		};

		let audience = match self
			.users
			.list_by_building(&notification.building_id, None)
			.await
		{
			Ok(principals) => principals,
			Err(e) => {
				tracing::warn!(notification_id = %notification.id, error = %e, "audience lookup failed; skipping fan-out");
				return;
			}
		};

		let mut token_owners: Vec<(atrium_core::UserId, String)> = Vec::new();
		for member in &audience {
			if !notification.targets_role(member.role) {
				continue;
			}
			for token in &member.push_tokens {
				token_owners.push((member.id, token.clone()));
			}
		}
		if token_owners.is_empty() {
			return;
		}

		let tokens: Vec<String> = token_owners.iter().map(|(_, t)| t.clone()).collect();
		let report = match push.deliver(notification, &tokens).await {
			Ok(report) => report,
			Err(e) => {
				tracing::warn!(notification_id = %notification.id, error = %e, "push delivery failed");
				return;
			}
		};
		tracing::debug!(
			notification_id = %notification.id,
			delivered = report.delivered,
			stale = report.stale_tokens.len(),
			"push fan-out finished"
		);

		for stale in &report.stale_tokens {
			let Some((owner, _)) = token_owners.iter().find(|(_, t)| t == stale) else {
				continue;
			};
			if let Err(e) = self.users.remove_push_token(owner, stale).await {
				tracing::warn!(user_id = %owner, error = %e, "stale token prune failed");
			}
		}
	}

	async fn load(&self, id: &NotificationId) -> Result<Notification> {
		self.notifications
			.get(id)
			.await?
			.ok_or_else(|| ServiceError::NotFound(format!("notification {id}")))
	}
}
