// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Maintenance request accessors and mutations.
//!
//! Every mutation follows the same shape: load the current row, consult the
//! policy, check the domain invariant, write. The write-once rating is the
//! exception in that its invariant is enforced by the store's conditional
//! update rather than by the loaded snapshot, so two concurrent raters
//! resolve to exactly one winner.

use std::sync::Arc;

use atrium_core::{
	policy, validate_rating, ApartmentId, Principal, Request, RequestCategory, RequestId,
	RequestStatus, Role, UserId, ValidationError,
};
use atrium_db::{RequestQuery, RequestStore, UserStore};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, ServiceError};

/// Caller-supplied narrowing for a request listing.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
	/// Narrow to one apartment. Only honored when the caller's scope spans
	/// the building.
	pub apartment_id: Option<ApartmentId>,
	/// Narrow to one assignee. Only honored when the caller's scope is not
	/// already pinned to an assignee.
	pub assigned_to: Option<UserId>,
	/// Narrow to one status.
	pub status: Option<RequestStatus>,
	/// Row cap; unlimited when absent.
	pub limit: Option<i64>,
}

/// Client-supplied fields of a new request. Building, apartment, creator
/// and status are never taken from the client.
#[derive(Debug, Clone)]
pub struct NewRequest {
	pub category: RequestCategory,
	pub title: String,
	pub description: String,
}

/// Role-scoped request reads and the request lifecycle mutations.
#[derive(Clone)]
pub struct RequestService {
	requests: Arc<dyn RequestStore>,
	users: Arc<dyn UserStore>,
}

impl RequestService {
	pub fn new(requests: Arc<dyn RequestStore>, users: Arc<dyn UserStore>) -> Self {
		Self { requests, users }
	}

	/// List requests the principal may see, newest first.
	#[tracing::instrument(skip(self, principal, filter), fields(principal_id = %principal.id, role = %principal.role))]
	pub async fn list(&self, principal: &Principal, filter: RequestFilter) -> Result<Vec<Request>> {
		let scope = policy::requests::query_scope(principal)?;

		// Scope-pinned values always win over the caller's filter.
		let query = RequestQuery {
			building_id: scope.building_id,
			apartment_id: scope.apartment_id.or(filter.apartment_id),
			assigned_to: scope.assigned_to.or(filter.assigned_to),
			status: filter.status,
			limit: filter.limit,
		};

		Ok(self.requests.list(&query).await?)
	}

	/// Get one request, if it exists and the principal may read it.
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, request_id = %id))]
	pub async fn get(&self, principal: &Principal, id: &RequestId) -> Result<Request> {
		let request = self.load(id).await?;
		if !policy::requests::can_read(principal, &request) {
			return Err(ServiceError::Denied);
		}
		Ok(request)
	}

	/// Create a request on behalf of a resident.
	///
	/// Building and apartment come from the principal, the status is always
	/// pending and the creator is always the principal itself, regardless of
	/// anything a client supplied upstream.
	#[tracing::instrument(skip(self, principal, new), fields(principal_id = %principal.id))]
	pub async fn create(&self, principal: &Principal, new: NewRequest) -> Result<Request> {
		if !policy::requests::can_create(principal) {
			return Err(ServiceError::Denied);
		}
		if new.title.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("title").into());
		}
		if new.description.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("description").into());
		}
		// can_create guarantees the apartment.
		let apartment_id = principal
			.apartment_id
			.clone()
			.ok_or(ServiceError::Denied)?;

		let now = Utc::now();
		let request = Request {
			id: RequestId::new(Uuid::new_v4()),
			building_id: principal.building_id.clone(),
			apartment_id,
			category: new.category,
			title: new.title,
			description: new.description,
			status: RequestStatus::Pending,
			created_by: principal.id,
			assigned_to: None,
			created_at: now,
			completed_at: None,
			rating: None,
			updated_at: now,
		};
		self.requests.insert(&request).await?;

		tracing::info!(request_id = %request.id, "maintenance request created");
		Ok(request)
	}

	/// Assign a request to a technician. Admin only; the assignee must be a
	/// technician of the same building and the request must not be completed.
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, request_id = %id, technician = %technician))]
	pub async fn assign(
		&self,
		principal: &Principal,
		id: &RequestId,
		technician: &UserId,
	) -> Result<Request> {
		let request = self.load(id).await?;
		if !policy::requests::can_assign(principal, &request) {
			return Err(ServiceError::Denied);
		}

		let assignee = self
			.users
			.get(technician)
			.await?
			.ok_or(ValidationError::InvalidAssignee)?;
		if assignee.role != Role::Technician || !assignee.same_building(&request.building_id) {
			return Err(ValidationError::InvalidAssignee.into());
		}

		self.requests.assign(id, technician).await?;
		tracing::info!(request_id = %id, technician = %technician, "request assigned");
		self.load(id).await
	}

	/// Move a request's status forward.
	///
	/// Admin or the assigned technician; only `pending → processing` and
	/// `processing → completed` are accepted, and completion stamps
	/// `completed_at`.
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, request_id = %id, next = %next))]
	pub async fn transition(
		&self,
		principal: &Principal,
		id: &RequestId,
		next: RequestStatus,
	) -> Result<Request> {
		let request = self.load(id).await?;
		if !policy::requests::can_transition(principal, &request) {
			return Err(ServiceError::Denied);
		}
		if !request.status.can_transition_to(next) {
			return Err(ValidationError::InvalidTransition {
				from: request.status,
				to: next,
			}
			.into());
		}

		let completed_at = (next == RequestStatus::Completed).then(Utc::now);
		self.requests.update_status(id, next, completed_at).await?;
		tracing::info!(request_id = %id, status = %next, "request transitioned");
		self.load(id).await
	}

	/// Rate a completed request, once.
	///
	/// Creator only. The write itself is conditional at the store; a lost
	/// race or an existing rating both surface as
	/// [`ValidationError::AlreadyRated`].
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, request_id = %id))]
	pub async fn rate(&self, principal: &Principal, id: &RequestId, rating: u8) -> Result<Request> {
		validate_rating(rating)?;

		let request = self.load(id).await?;
		if !policy::requests::can_rate(principal, &request) {
			return Err(ServiceError::Denied);
		}

		if !self.requests.set_rating(id, rating).await? {
			return Err(ValidationError::AlreadyRated.into());
		}
		tracing::info!(request_id = %id, rating, "request rated");
		self.load(id).await
	}

	async fn load(&self, id: &RequestId) -> Result<Request> {
		self.requests
			.get(id)
			.await?
			.ok_or_else(|| ServiceError::NotFound(format!("request {id}")))
	}
}
