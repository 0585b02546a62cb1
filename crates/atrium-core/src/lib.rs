// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Domain model and authorization policy for Atrium, a role-based
//! building-management system.
//!
//! This crate is pure: entities, invariants and the role-scoped
//! authorization policy, with no I/O. The store layer lives in `atrium-db`
//! and the request-facing accessors and mutations in `atrium-service`.
//!
//! # Partitioning
//!
//! Every entity is owned by its building partition; within a building,
//! bills and requests are further partitioned to one apartment. The policy
//! in [`policy`] guarantees no operation crosses a building boundary.

pub mod bill;
pub mod error;
pub mod notification;
pub mod policy;
pub mod principal;
pub mod request;
pub mod testing;
pub mod types;

pub use bill::{validate_period, Bill};
pub use error::{AuthenticationError, AuthorizationError, ValidationError};
pub use notification::Notification;
pub use policy::{BillScope, NotificationScope, RequestScope, UserScope};
pub use principal::{Principal, ProfilePatch};
pub use request::{validate_rating, Request};
pub use types::{
	ApartmentId, BillId, BillStatus, BuildingId, NotificationCategory, NotificationId,
	RequestCategory, RequestId, RequestStatus, Role, TargetRole, UserId,
};
