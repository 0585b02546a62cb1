// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile accessors, provisioning and account lifecycle.
//!
//! Provisioning goes through the identity provider's service-account
//! capability: the calling admin's own session is never touched. The profile
//! row is the source of truth; when the profile write fails after the
//! provider account was created, the account is removed best-effort so the
//! provider does not accumulate orphans.

use std::sync::Arc;

use atrium_core::{
	policy, ApartmentId, BuildingId, Principal, ProfilePatch, Role, UserId, ValidationError,
};
use atrium_db::{DbError, UserStore};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::identity::IdentityProvider;

/// Admin-supplied fields for a provisioned profile.
#[derive(Debug, Clone)]
pub struct NewUser {
	pub role: Role,
	pub display_name: String,
	pub email: String,
	pub password: String,
	/// Required for residents, ignored for technicians.
	pub apartment_id: Option<ApartmentId>,
	pub contact_phone: Option<String>,
}

/// Self-registration of a building admin. The bootstrap path: no session
/// and no authorization check, the provider account and profile are created
/// together.
#[derive(Debug, Clone)]
pub struct RegisterAdmin {
	pub display_name: String,
	pub email: String,
	pub password: String,
	pub building_id: BuildingId,
}

/// Admin-applied profile changes, including an apartment move.
#[derive(Debug, Clone, Default)]
pub struct AdminUserUpdate {
	pub display_name: Option<String>,
	pub contact_phone: Option<String>,
	/// Move the resident to this apartment. Uniqueness is re-checked.
	pub apartment_id: Option<ApartmentId>,
}

/// Role-scoped profile reads and the account lifecycle mutations.
#[derive(Clone)]
pub struct UserService {
	users: Arc<dyn UserStore>,
	provider: Arc<dyn IdentityProvider>,
}

impl UserService {
	pub fn new(users: Arc<dyn UserStore>, provider: Arc<dyn IdentityProvider>) -> Self {
		Self { users, provider }
	}

	/// List the building's profiles, optionally narrowed by role. Admin only.
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, role = %principal.role))]
	pub async fn list(&self, principal: &Principal, role: Option<Role>) -> Result<Vec<Principal>> {
		let scope = policy::users::query_scope(principal)?;
		Ok(self.users.list_by_building(&scope.building_id, role).await?)
	}

	/// Get one profile: one's own, or any in the building for admins.
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, user_id = %id))]
	pub async fn get(&self, principal: &Principal, id: &UserId) -> Result<Principal> {
		let target = self.load(id).await?;
		if !policy::users::can_read(principal, &target) {
			return Err(ServiceError::Denied);
		}
		Ok(target)
	}

	/// Apply a self-service patch (display name, phone) to the target
	/// profile. Self only; role, building and apartment never move here.
	#[tracing::instrument(skip(self, principal, patch), fields(principal_id = %principal.id, user_id = %id))]
	pub async fn update_profile(
		&self,
		principal: &Principal,
		id: &UserId,
		patch: ProfilePatch,
	) -> Result<Principal> {
		let mut target = self.load(id).await?;
		if !policy::users::can_edit_profile(principal, &target) {
			return Err(ServiceError::Denied);
		}
		if patch.is_empty() {
			return Ok(target);
		}

		if let Some(display_name) = patch.display_name {
			if display_name.trim().is_empty() {
				return Err(ValidationError::MissingRequiredField("display_name").into());
			}
			target.display_name = display_name;
		}
		if let Some(contact_phone) = patch.contact_phone {
			target.contact_phone = Some(contact_phone);
		}
		target.updated_at = Utc::now();

		self.users.update(&target).await?;
		Ok(target)
	}

	/// Apply an admin edit to a resident profile of the admin's building,
	/// including an apartment move.
	#[tracing::instrument(skip(self, principal, update), fields(principal_id = %principal.id, user_id = %id))]
	pub async fn admin_update(
		&self,
		principal: &Principal,
		id: &UserId,
		update: AdminUserUpdate,
	) -> Result<Principal> {
		let mut target = self.load(id).await?;
		if !policy::users::can_admin_edit(principal, &target) {
			return Err(ServiceError::Denied);
		}

		if let Some(apartment_id) = update.apartment_id {
			if target.apartment_id.as_ref() != Some(&apartment_id) {
				if self
					.users
					.apartment_occupied(&target.building_id, &apartment_id)
					.await?
				{
					return Err(ValidationError::DuplicateApartment.into());
				}
				target.apartment_id = Some(apartment_id);
			}
		}
		if let Some(display_name) = update.display_name {
			if display_name.trim().is_empty() {
				return Err(ValidationError::MissingRequiredField("display_name").into());
			}
			target.display_name = display_name;
		}
		if let Some(contact_phone) = update.contact_phone {
			target.contact_phone = Some(contact_phone);
		}
		target.updated_at = Utc::now();

		match self.users.update(&target).await {
			Ok(()) => Ok(target),
			// The unique index closes the check-then-write race.
			Err(DbError::Conflict(_)) => Err(ValidationError::DuplicateApartment.into()),
			Err(e) => Err(e.into()),
		}
	}

	/// Provision a resident or technician in the admin's own building.
	///
	/// The provider account is created with the service-account capability;
	/// the admin keeps its own session throughout. Apartment uniqueness is
	/// checked up front and enforced again by the store's unique index.
	#[tracing::instrument(skip(self, principal, new), fields(principal_id = %principal.id, new_role = %new.role))]
	pub async fn provision(&self, principal: &Principal, new: NewUser) -> Result<Principal> {
		if !policy::users::can_provision(principal, new.role) {
			return Err(ServiceError::Denied);
		}
		if new.display_name.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("display_name").into());
		}
		if new.email.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("email").into());
		}

		let apartment_id = match new.role {
			Role::Resident => {
				let apartment_id = new
					.apartment_id
					.ok_or(ValidationError::MissingRequiredField("apartment_id"))?;
				if self
					.users
					.apartment_occupied(&principal.building_id, &apartment_id)
					.await?
				{
					return Err(ValidationError::DuplicateApartment.into());
				}
				Some(apartment_id)
			}
			_ => None,
		};

		let external_id = self.provider.create_account(&new.email, &new.password).await?;

		let now = Utc::now();
		let created = Principal {
			id: UserId::new(Uuid::new_v4()),
			external_id: external_id.clone(),
			display_name: new.display_name,
			role: new.role,
			building_id: principal.building_id.clone(),
			apartment_id,
			contact_email: Some(new.email),
			contact_phone: new.contact_phone,
			push_tokens: Vec::new(),
			created_at: now,
			updated_at: now,
		};

		match self.users.create(&created).await {
			Ok(()) => {
				tracing::info!(user_id = %created.id, role = %created.role, "profile provisioned");
				Ok(created)
			}
			Err(e) => {
				// Remove the just-created provider account so it does not
				// linger without a profile.
				if let Err(cleanup) = self.provider.delete_account(&external_id).await {
					tracing::warn!(external_id = %external_id, error = %cleanup, "orphaned account cleanup failed");
				}
				// The unique index closes the check-then-write race.
				match e {
					DbError::Conflict(ref msg) if msg.contains("apartment") => {
						Err(ValidationError::DuplicateApartment.into())
					}
					other => Err(other.into()),
				}
			}
		}
	}

	/// Self-register a building admin.
	#[tracing::instrument(skip(self, new))]
	pub async fn register_admin(&self, new: RegisterAdmin) -> Result<Principal> {
		if new.display_name.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("display_name").into());
		}
		if new.email.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("email").into());
		}

		let external_id = self.provider.create_account(&new.email, &new.password).await?;

		let now = Utc::now();
		let admin = Principal {
			id: UserId::new(Uuid::new_v4()),
			external_id: external_id.clone(),
			display_name: new.display_name,
			role: Role::Admin,
			building_id: new.building_id,
			apartment_id: None,
			contact_email: Some(new.email),
			contact_phone: None,
			push_tokens: Vec::new(),
			created_at: now,
			updated_at: now,
		};

		if let Err(e) = self.users.create(&admin).await {
			if let Err(cleanup) = self.provider.delete_account(&external_id).await {
				tracing::warn!(external_id = %external_id, error = %cleanup, "orphaned account cleanup failed");
			}
			return Err(e.into());
		}
		tracing::info!(user_id = %admin.id, building_id = %admin.building_id, "admin registered");
		Ok(admin)
	}

	/// Delete a resident profile of the admin's building. The store row is
	/// the durable outcome; provider account removal is best-effort.
	#[tracing::instrument(skip(self, principal), fields(principal_id = %principal.id, user_id = %id))]
	pub async fn delete(&self, principal: &Principal, id: &UserId) -> Result<()> {
		let target = self.load(id).await?;
		if !policy::users::can_delete(principal, &target) {
			return Err(ServiceError::Denied);
		}

		if !self.users.delete(id).await? {
			return Err(ServiceError::NotFound(format!("user {id}")));
		}
		if let Err(e) = self.provider.delete_account(&target.external_id).await {
			tracing::warn!(external_id = %target.external_id, error = %e, "provider account removal failed");
		}
		tracing::info!(user_id = %id, "profile deleted");
		Ok(())
	}

	/// Change one's own password. The provider re-authenticates with the
	/// current password before accepting the new one.
	#[tracing::instrument(skip_all, fields(principal_id = %principal.id))]
	pub async fn change_password(
		&self,
		principal: &Principal,
		current_password: &str,
		new_password: &str,
	) -> Result<()> {
		if new_password.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("new_password").into());
		}
		self.provider
			.change_password(&principal.external_id, current_password, new_password)
			.await?;
		Ok(())
	}

	/// Start a password reset for an email address. Unauthenticated, and
	/// deliberately silent about whether the address has an account.
	#[tracing::instrument(skip_all)]
	pub async fn request_password_reset(&self, email: &str) -> Result<()> {
		if email.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("email").into());
		}
		self.provider.send_password_reset(email).await?;
		Ok(())
	}

	/// Register a device token for push delivery on one's own profile.
	/// Idempotent.
	#[tracing::instrument(skip(self, principal, token), fields(principal_id = %principal.id))]
	pub async fn register_push_token(&self, principal: &Principal, token: &str) -> Result<()> {
		if token.trim().is_empty() {
			return Err(ValidationError::MissingRequiredField("token").into());
		}
		Ok(self.users.add_push_token(&principal.id, token).await?)
	}

	/// Remove a device token from one's own profile, e.g. on sign-out.
	#[tracing::instrument(skip(self, principal, token), fields(principal_id = %principal.id))]
	pub async fn remove_push_token(&self, principal: &Principal, token: &str) -> Result<()> {
		self.users.remove_push_token(&principal.id, token).await?;
		Ok(())
	}

	async fn load(&self, id: &UserId) -> Result<Principal> {
		self.users
			.get(id)
			.await?
			.ok_or_else(|| ServiceError::NotFound(format!("user {id}")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::StubIdentityProvider;
	use atrium_core::testing::make_principal;
	use atrium_db::{testing::create_test_pool, UserRepository};

	struct Fixture {
		service: UserService,
		users: Arc<UserRepository>,
		provider: Arc<StubIdentityProvider>,
	}

	async fn fixture() -> Fixture {
		let pool = create_test_pool().await;
		let users = Arc::new(UserRepository::new(pool));
		let provider = Arc::new(StubIdentityProvider::default());
		let service = UserService::new(users.clone(), provider.clone());
		Fixture {
			service,
			users,
			provider,
		}
	}

	async fn registered(fx: &Fixture, role: Role, building: &str, apartment: Option<&str>) -> Principal {
		let principal = make_principal(role, building, apartment);
		fx.users.create(&principal).await.unwrap();
		principal
	}

	fn new_resident(apartment: &str) -> NewUser {
		NewUser {
			role: Role::Resident,
			display_name: "Tran Thi Binh".to_string(),
			email: format!("res-{apartment}@example.com"),
			password: "s3cret-enough".to_string(),
			apartment_id: Some(ApartmentId::new(apartment)),
			contact_phone: None,
		}
	}

	mod provisioning {
		use super::*;

		#[tokio::test]
		async fn admin_provisions_resident_in_own_building() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;

			let created = fx.service.provision(&admin, new_resident("C0502")).await.unwrap();
			assert_eq!(created.role, Role::Resident);
			assert_eq!(created.building_id, admin.building_id);
			assert_eq!(created.apartment_id, Some(ApartmentId::new("C0502")));
			assert_eq!(fx.provider.created_accounts().len(), 1);

			// The profile is resolvable by its provider subject.
			let stored = fx
				.users
				.get_by_external_id(&created.external_id)
				.await
				.unwrap();
			assert!(stored.is_some());
		}

		#[tokio::test]
		async fn occupied_apartment_is_rejected() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;
			registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;

			let err = fx
				.service
				.provision(&admin, new_resident("A1204"))
				.await
				.unwrap_err();
			assert!(matches!(
				err,
				ServiceError::Validation(ValidationError::DuplicateApartment)
			));
			// No provider account may be left behind.
			assert!(fx.provider.created_accounts().is_empty());
		}

		#[tokio::test]
		async fn same_apartment_in_another_building_is_fine() {
			let fx = fixture().await;
			registered(&fx, Role::Resident, "tower-b", Some("A1204")).await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;

			assert!(fx.service.provision(&admin, new_resident("A1204")).await.is_ok());
		}

		#[tokio::test]
		async fn technician_needs_no_apartment() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;

			let new = NewUser {
				role: Role::Technician,
				display_name: "Le Van Cuong".to_string(),
				email: "tech@example.com".to_string(),
				password: "s3cret-enough".to_string(),
				apartment_id: None,
				contact_phone: None,
			};
			let created = fx.service.provision(&admin, new).await.unwrap();
			assert_eq!(created.role, Role::Technician);
			assert!(created.apartment_id.is_none());
		}

		#[tokio::test]
		async fn resident_without_apartment_is_rejected() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;

			let mut new = new_resident("C0502");
			new.apartment_id = None;
			let err = fx.service.provision(&admin, new).await.unwrap_err();
			assert!(matches!(
				err,
				ServiceError::Validation(ValidationError::MissingRequiredField("apartment_id"))
			));
		}

		#[tokio::test]
		async fn non_admin_cannot_provision_and_admins_cannot_mint_admins() {
			let fx = fixture().await;
			let resident = registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;

			let err = fx
				.service
				.provision(&resident, new_resident("C0502"))
				.await
				.unwrap_err();
			assert!(matches!(err, ServiceError::Denied));

			let mut new = new_resident("C0502");
			new.role = Role::Admin;
			let err = fx.service.provision(&admin, new).await.unwrap_err();
			assert!(matches!(err, ServiceError::Denied));
		}

		#[tokio::test]
		async fn provider_outage_surfaces_as_infrastructure_error() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;
			fx.provider.fail_account_creation();

			let err = fx
				.service
				.provision(&admin, new_resident("C0502"))
				.await
				.unwrap_err();
			assert!(matches!(err, ServiceError::IdentityProvider(_)));
		}

		#[tokio::test]
		async fn profile_write_failure_cleans_up_the_provider_account() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;

			// Occupy the subject the stub will mint next, so the profile
			// insert fails after the provider account exists.
			let mut squatter = make_principal(Role::Resident, "tower-a", Some("D0101"));
			squatter.external_id = "idp-acct-1".to_string();
			fx.users.create(&squatter).await.unwrap();

			let err = fx
				.service
				.provision(&admin, new_resident("C0502"))
				.await
				.unwrap_err();
			assert!(matches!(err, ServiceError::Db(DbError::Conflict(_))));
			assert_eq!(fx.provider.deleted_accounts(), vec!["idp-acct-1".to_string()]);
		}
	}

	mod registration {
		use super::*;

		#[tokio::test]
		async fn admin_self_registration_creates_account_and_profile() {
			let fx = fixture().await;
			let admin = fx
				.service
				.register_admin(RegisterAdmin {
					display_name: "Pham Quang Dung".to_string(),
					email: "manager@example.com".to_string(),
					password: "s3cret-enough".to_string(),
					building_id: BuildingId::new("tower-a"),
				})
				.await
				.unwrap();
			assert_eq!(admin.role, Role::Admin);
			assert!(fx
				.users
				.get_by_external_id(&admin.external_id)
				.await
				.unwrap()
				.is_some());
		}
	}

	mod profile_edits {
		use super::*;

		#[tokio::test]
		async fn self_edit_changes_name_and_phone_only() {
			let fx = fixture().await;
			let resident = registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;

			let patch = ProfilePatch {
				display_name: Some("New Name".to_string()),
				contact_phone: Some("+84 90 123 4567".to_string()),
			};
			let updated = fx
				.service
				.update_profile(&resident, &resident.id, patch)
				.await
				.unwrap();
			assert_eq!(updated.display_name, "New Name");
			assert_eq!(updated.contact_phone.as_deref(), Some("+84 90 123 4567"));
			assert_eq!(updated.role, resident.role);
			assert_eq!(updated.apartment_id, resident.apartment_id);
		}

		#[tokio::test]
		async fn editing_someone_else_is_denied() {
			let fx = fixture().await;
			let resident = registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;
			let neighbour = registered(&fx, Role::Resident, "tower-a", Some("B0703")).await;

			let patch = ProfilePatch {
				display_name: Some("Hijacked".to_string()),
				contact_phone: None,
			};
			let err = fx
				.service
				.update_profile(&resident, &neighbour.id, patch)
				.await
				.unwrap_err();
			assert!(matches!(err, ServiceError::Denied));
		}

		#[tokio::test]
		async fn admin_moves_resident_to_free_apartment_only() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;
			let resident = registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;
			registered(&fx, Role::Resident, "tower-a", Some("B0703")).await;

			let err = fx
				.service
				.admin_update(
					&admin,
					&resident.id,
					AdminUserUpdate {
						apartment_id: Some(ApartmentId::new("B0703")),
						..Default::default()
					},
				)
				.await
				.unwrap_err();
			assert!(matches!(
				err,
				ServiceError::Validation(ValidationError::DuplicateApartment)
			));

			let moved = fx
				.service
				.admin_update(
					&admin,
					&resident.id,
					AdminUserUpdate {
						apartment_id: Some(ApartmentId::new("C0901")),
						..Default::default()
					},
				)
				.await
				.unwrap();
			assert_eq!(moved.apartment_id, Some(ApartmentId::new("C0901")));
		}

		#[tokio::test]
		async fn admin_edit_stops_at_building_and_role_boundaries() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;
			let outsider = registered(&fx, Role::Resident, "tower-b", Some("A1204")).await;
			let tech = registered(&fx, Role::Technician, "tower-a", None).await;

			for target in [&outsider.id, &tech.id] {
				let err = fx
					.service
					.admin_update(&admin, target, AdminUserUpdate::default())
					.await
					.unwrap_err();
				assert!(matches!(err, ServiceError::Denied));
			}
		}
	}

	mod lifecycle {
		use super::*;

		#[tokio::test]
		async fn delete_removes_profile_and_provider_account() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;
			let resident = registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;

			fx.service.delete(&admin, &resident.id).await.unwrap();
			assert!(fx.users.get(&resident.id).await.unwrap().is_none());
			assert_eq!(fx.provider.deleted_accounts(), vec![resident.external_id]);
		}

		#[tokio::test]
		async fn password_change_goes_through_the_provider() {
			let fx = fixture().await;
			let resident = registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;

			fx.service
				.change_password(&resident, "old-s3cret", "new-s3cret")
				.await
				.unwrap();
			assert_eq!(
				fx.provider.password_changes(),
				vec![resident.external_id.clone()]
			);

			let err = fx
				.service
				.change_password(&resident, "old-s3cret", "  ")
				.await
				.unwrap_err();
			assert!(matches!(
				err,
				ServiceError::Validation(ValidationError::MissingRequiredField("new_password"))
			));
		}

		#[tokio::test]
		async fn failed_reauthentication_surfaces_as_provider_rejection() {
			let fx = fixture().await;
			let resident = registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;

			let err = fx
				.service
				.change_password(&resident, "", "new-s3cret")
				.await
				.unwrap_err();
			assert!(matches!(err, ServiceError::IdentityProvider(_)));
			assert!(fx.provider.password_changes().is_empty());
		}

		#[tokio::test]
		async fn password_reset_is_sent_for_any_address() {
			let fx = fixture().await;

			fx.service
				.request_password_reset("whoever@example.com")
				.await
				.unwrap();
			assert_eq!(
				fx.provider.password_resets(),
				vec!["whoever@example.com".to_string()]
			);
		}

		#[tokio::test]
		async fn push_token_registration_is_idempotent() {
			let fx = fixture().await;
			let resident = registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;

			fx.service.register_push_token(&resident, "tok-1").await.unwrap();
			fx.service.register_push_token(&resident, "tok-1").await.unwrap();
			let stored = fx.users.get(&resident.id).await.unwrap().unwrap();
			assert_eq!(stored.push_tokens, vec!["tok-1".to_string()]);

			fx.service.remove_push_token(&resident, "tok-1").await.unwrap();
			let stored = fx.users.get(&resident.id).await.unwrap().unwrap();
			assert!(stored.push_tokens.is_empty());
		}
	}

	mod listing {
		use super::*;

		#[tokio::test]
		async fn listing_is_admin_only_and_building_scoped() {
			let fx = fixture().await;
			let admin = registered(&fx, Role::Admin, "tower-a", None).await;
			let resident = registered(&fx, Role::Resident, "tower-a", Some("A1204")).await;
			registered(&fx, Role::Resident, "tower-b", Some("A1204")).await;
			registered(&fx, Role::Technician, "tower-a", None).await;

			let everyone = fx.service.list(&admin, None).await.unwrap();
			assert_eq!(everyone.len(), 3);

			let residents = fx.service.list(&admin, Some(Role::Resident)).await.unwrap();
			assert_eq!(residents.len(), 1);
			assert_eq!(residents[0].id, resident.id);

			let err = fx.service.list(&resident, None).await.unwrap_err();
			assert!(matches!(err, ServiceError::Denied));
		}
	}
}
