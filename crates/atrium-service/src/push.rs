// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Push delivery boundary.
//!
//! The transport (FCM or anything else) lives behind [`PushDelivery`]; the
//! service only selects the audience tokens and prunes the ones the
//! transport reports stale. Delivery is best-effort and never fails the
//! notification write that triggered it.

use async_trait::async_trait;
use atrium_core::Notification;

/// Outcome of one fan-out attempt.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
	/// Tokens the transport accepted.
	pub delivered: usize,
	/// Tokens the transport reported as no longer registered. The caller
	/// prunes these from the owning profiles.
	pub stale_tokens: Vec<String>,
}

/// Push transport boundary.
#[async_trait]
pub trait PushDelivery: Send + Sync {
	/// Deliver the notification to the given device tokens.
	async fn deliver(
		&self,
		notification: &Notification,
		tokens: &[String],
	) -> std::result::Result<DeliveryReport, PushDeliveryError>;
}

/// Transport failure. Logged by the caller, never propagated.
#[derive(Debug, Clone, thiserror::Error)]
#[error("push delivery failed: {0}")]
pub struct PushDeliveryError(pub String);
