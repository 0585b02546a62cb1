// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role-scoped authorization policy.
//!
//! This module is the one place role-to-permission mapping is defined. Every
//! accessor and mutation calls into it rather than re-deriving role logic.
//! It is organized as one policy module per entity family:
//!
//! - [`bills`]: read scoping for bills
//! - [`requests`]: read scoping plus create/assign/transition/rate rules
//! - [`notifications`]: audience-filtered reads, admin create/delete
//! - [`users`]: profile reads and the admin/self mutation split
//!
//! Each module exposes the same three shapes:
//!
//! - `can_read(principal, entity) -> bool`
//! - `query_scope(principal) -> Result<Scope, AuthorizationError>`
//! - `can_*(principal, entity) -> bool` for each write operation
//!
//! # Design Principles
//!
//! 1. **Pure functions**: no database access; every relevant fact is an
//!    explicit argument
//! 2. **Deny by default**: a combination not explicitly allowed is denied,
//!    and denial is an error, never an empty result set
//! 3. **Building partition**: no rule ever grants access across buildings

pub mod bills;
pub mod notifications;
pub mod requests;
pub mod types;
pub mod users;

pub use types::{BillScope, NotificationScope, RequestScope, UserScope};
