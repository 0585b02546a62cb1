// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for Atrium.
//!
//! Each entity gets a repository behind an async store trait, so the service
//! layer depends on the trait and tests can swap in an in-memory pool. Queries
//! arrive fully resolved: the authorization scope has already been folded into
//! the query struct, and the partition column (`building_id`) is always bound.
//!
//! # Architecture
//!
//! - `pool` / `schema` - Connection setup and DDL
//! - `user` - Principal profiles, apartment occupancy, push tokens
//! - `bill` - Billing rows, read-only past insertion
//! - `request` - Maintenance requests, including the conditional rating write
//! - `notification` - Announcements with audience filtering

pub mod bill;
mod convert;
pub mod error;
pub mod notification;
pub mod pool;
pub mod request;
pub mod schema;
pub mod testing;
pub mod user;

pub use bill::{BillQuery, BillRepository, BillStore};
pub use error::DbError;
pub use notification::{NotificationQuery, NotificationRepository, NotificationStore};
pub use pool::create_pool;
pub use request::{RequestQuery, RequestRepository, RequestStore};
pub use schema::create_schema;
pub use user::{UserRepository, UserStore};
