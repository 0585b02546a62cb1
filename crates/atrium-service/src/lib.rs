// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The request-facing layer of Atrium.
//!
//! Sessions resolve to a [`atrium_core::Principal`] per call, every accessor
//! starts from the authorization policy's query scope, and every mutation
//! follows load → authorize → validate → write. The layer is stateless;
//! nothing is cached between calls.
//!
//! # Architecture
//!
//! - `identity` - Session-to-principal resolution behind the provider trait
//! - `bills` / `requests` / `notifications` / `users` - Scoped accessors and
//!   mutations per entity family
//! - `push` - Best-effort push delivery boundary
//! - `config` - `ATRIUM_*` environment configuration

pub mod bills;
pub mod config;
pub mod error;
pub mod identity;
pub mod notifications;
pub mod push;
pub mod requests;
pub mod testing;
pub mod users;

pub use bills::{BillFilter, BillService};
pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use identity::{IdentityProvider, IdentityProviderError, IdentityResolver, VerifiedSession};
pub use notifications::{NewNotification, NotificationFilter, NotificationService};
pub use push::{DeliveryReport, PushDelivery, PushDeliveryError};
pub use requests::{NewRequest, RequestFilter, RequestService};
pub use users::{AdminUserUpdate, NewUser, RegisterAdmin, UserService};
