// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Principal (user profile) repository.
//!
//! This module provides database access for profile management including:
//! - Profile CRUD keyed by profile ID and by external identity subject
//! - Building-scoped listing
//! - Apartment occupancy checks backing the uniqueness invariant
//! - Idempotent push-token registration and pruning

use async_trait::async_trait;
use atrium_core::{ApartmentId, BuildingId, Principal, Role, UserId};
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::convert::{parse_enum, parse_timestamp};
use crate::error::DbError;

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create(&self, principal: &Principal) -> Result<(), DbError>;
	async fn get(&self, id: &UserId) -> Result<Option<Principal>, DbError>;
	async fn get_by_external_id(&self, external_id: &str) -> Result<Option<Principal>, DbError>;
	async fn list_by_building(
		&self,
		building_id: &BuildingId,
		role: Option<Role>,
	) -> Result<Vec<Principal>, DbError>;
	async fn apartment_occupied(
		&self,
		building_id: &BuildingId,
		apartment_id: &ApartmentId,
	) -> Result<bool, DbError>;
	async fn update(&self, principal: &Principal) -> Result<(), DbError>;
	async fn delete(&self, id: &UserId) -> Result<bool, DbError>;
	async fn add_push_token(&self, id: &UserId, token: &str) -> Result<(), DbError>;
	async fn remove_push_token(&self, id: &UserId, token: &str) -> Result<bool, DbError>;
}

/// Repository for principal profile database operations.
///
/// All IDs are UUIDs stored as strings in SQLite; `building_id` and
/// `apartment_id` are stored verbatim.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	fn row_to_principal(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Principal, DbError> {
		let id: String = row.get("id");
		let role: String = row.get("role");
		let apartment_id: Option<String> = row.get("apartment_id");
		let push_tokens: String = row.get("push_tokens");
		let created_at: String = row.get("created_at");
		let updated_at: String = row.get("updated_at");

		Ok(Principal {
			id: UserId::new(
				Uuid::parse_str(&id)
					.map_err(|e| DbError::Internal(format!("Invalid stored user id {id:?}: {e}")))?,
			),
			external_id: row.get("external_id"),
			display_name: row.get("display_name"),
			role: parse_enum(&role)?,
			building_id: BuildingId::new(row.get::<String, _>("building_id")),
			apartment_id: apartment_id.map(ApartmentId::new),
			contact_email: row.get("contact_email"),
			contact_phone: row.get("contact_phone"),
			push_tokens: serde_json::from_str(&push_tokens)?,
			created_at: parse_timestamp(&created_at)?,
			updated_at: parse_timestamp(&updated_at)?,
		})
	}

	/// Maps a unique-constraint violation onto `DbError::Conflict` so the
	/// service layer can surface the right domain error.
	fn map_unique_violation(e: sqlx::Error) -> DbError {
		if let sqlx::Error::Database(ref db) = e {
			let msg = db.message();
			if msg.contains("idx_users_building_apartment") {
				return DbError::Conflict("apartment already assigned within building".to_string());
			}
			if msg.contains("users.external_id") {
				return DbError::Conflict("external identity already has a profile".to_string());
			}
		}
		DbError::Sqlx(e)
	}
}

#[async_trait]
impl UserStore for UserRepository {
	/// Create a new profile.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the apartment is already assigned
	/// within the building or the external identity already has a profile.
	#[tracing::instrument(skip(self, principal), fields(user_id = %principal.id, building_id = %principal.building_id))]
	async fn create(&self, principal: &Principal) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, external_id, display_name, role, building_id, apartment_id,
			                   contact_email, contact_phone, push_tokens, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(principal.id.to_string())
		.bind(&principal.external_id)
		.bind(&principal.display_name)
		.bind(principal.role.to_string())
		.bind(principal.building_id.as_str())
		.bind(principal.apartment_id.as_ref().map(|a| a.as_str().to_string()))
		.bind(&principal.contact_email)
		.bind(&principal.contact_phone)
		.bind(serde_json::to_string(&principal.push_tokens)?)
		.bind(principal.created_at.to_rfc3339())
		.bind(principal.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(Self::map_unique_violation)?;

		tracing::debug!(user_id = %principal.id, role = %principal.role, "profile created");
		Ok(())
	}

	/// Get a profile by ID. `None` if no profile exists.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	async fn get(&self, id: &UserId) -> Result<Option<Principal>, DbError> {
		let row = sqlx::query("SELECT * FROM users WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| self.row_to_principal(&r)).transpose()
	}

	/// Get a profile by its external identity subject. `None` if the
	/// identity has no profile record.
	#[tracing::instrument(skip(self, external_id))]
	async fn get_by_external_id(&self, external_id: &str) -> Result<Option<Principal>, DbError> {
		let row = sqlx::query("SELECT * FROM users WHERE external_id = ?")
			.bind(external_id)
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| self.row_to_principal(&r)).transpose()
	}

	/// List profiles of one building, optionally restricted to a role,
	/// ordered by display name for stable listings.
	#[tracing::instrument(skip(self), fields(building_id = %building_id))]
	async fn list_by_building(
		&self,
		building_id: &BuildingId,
		role: Option<Role>,
	) -> Result<Vec<Principal>, DbError> {
		let rows = match role {
			Some(role) => {
				sqlx::query(
					"SELECT * FROM users WHERE building_id = ? AND role = ? \
					 ORDER BY display_name ASC, id ASC",
				)
				.bind(building_id.as_str())
				.bind(role.to_string())
				.fetch_all(&self.pool)
				.await?
			}
			None => {
				sqlx::query(
					"SELECT * FROM users WHERE building_id = ? ORDER BY display_name ASC, id ASC",
				)
				.bind(building_id.as_str())
				.fetch_all(&self.pool)
				.await?
			}
		};

		rows.iter().map(|r| self.row_to_principal(r)).collect()
	}

	/// Returns true if the apartment is already assigned within the building.
	#[tracing::instrument(skip(self), fields(building_id = %building_id, apartment_id = %apartment_id))]
	async fn apartment_occupied(
		&self,
		building_id: &BuildingId,
		apartment_id: &ApartmentId,
	) -> Result<bool, DbError> {
		let row = sqlx::query(
			"SELECT COUNT(*) as cnt FROM users WHERE building_id = ? AND apartment_id = ?",
		)
		.bind(building_id.as_str())
		.bind(apartment_id.as_str())
		.fetch_one(&self.pool)
		.await?;

		let count: i64 = row.get("cnt");
		Ok(count > 0)
	}

	/// Persist an updated profile.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the profile does not exist and
	/// `DbError::Conflict` if an apartment move collides with an occupant.
	#[tracing::instrument(skip(self, principal), fields(user_id = %principal.id))]
	async fn update(&self, principal: &Principal) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE users
			SET display_name = ?, role = ?, building_id = ?, apartment_id = ?,
			    contact_email = ?, contact_phone = ?, push_tokens = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&principal.display_name)
		.bind(principal.role.to_string())
		.bind(principal.building_id.as_str())
		.bind(principal.apartment_id.as_ref().map(|a| a.as_str().to_string()))
		.bind(&principal.contact_email)
		.bind(&principal.contact_phone)
		.bind(serde_json::to_string(&principal.push_tokens)?)
		.bind(Utc::now().to_rfc3339())
		.bind(principal.id.to_string())
		.execute(&self.pool)
		.await
		.map_err(Self::map_unique_violation)?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("user {}", principal.id)));
		}
		Ok(())
	}

	/// Delete a profile. Returns false if it did not exist.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	async fn delete(&self, id: &UserId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Register a push token for a profile. Idempotent: registering a token
	/// the profile already holds is a no-op.
	#[tracing::instrument(skip(self, token), fields(user_id = %id))]
	async fn add_push_token(&self, id: &UserId, token: &str) -> Result<(), DbError> {
		let principal = self
			.get(id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("user {id}")))?;

		if principal.push_tokens.iter().any(|t| t == token) {
			return Ok(());
		}

		let mut tokens = principal.push_tokens;
		tokens.push(token.to_string());

		sqlx::query("UPDATE users SET push_tokens = ?, updated_at = ? WHERE id = ?")
			.bind(serde_json::to_string(&tokens)?)
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		tracing::debug!(user_id = %id, "push token registered");
		Ok(())
	}

	/// Remove a push token from a profile. Returns false if the token was
	/// not registered.
	#[tracing::instrument(skip(self, token), fields(user_id = %id))]
	async fn remove_push_token(&self, id: &UserId, token: &str) -> Result<bool, DbError> {
		let principal = self
			.get(id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("user {id}")))?;

		let before = principal.push_tokens.len();
		let tokens: Vec<String> = principal
			.push_tokens
			.into_iter()
			.filter(|t| t != token)
			.collect();
		if tokens.len() == before {
			return Ok(false);
		}

		sqlx::query("UPDATE users SET push_tokens = ?, updated_at = ? WHERE id = ?")
			.bind(serde_json::to_string(&tokens)?)
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		tracing::debug!(user_id = %id, "push token pruned");
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;
	use atrium_core::testing::make_principal;

	#[tokio::test]
	async fn create_and_get_roundtrip() {
		let repo = UserRepository::new(create_test_pool().await);
		let resident = make_principal(Role::Resident, "tower-a", Some("A1204"));
		repo.create(&resident).await.unwrap();

		let loaded = repo.get(&resident.id).await.unwrap().unwrap();
		assert_eq!(loaded.id, resident.id);
		assert_eq!(loaded.role, Role::Resident);
		assert_eq!(loaded.apartment_id, resident.apartment_id);
		assert_eq!(loaded.building_id, resident.building_id);
	}

	#[tokio::test]
	async fn get_by_external_id_resolves_profile() {
		let repo = UserRepository::new(create_test_pool().await);
		let tech = make_principal(Role::Technician, "tower-a", None);
		repo.create(&tech).await.unwrap();

		let loaded = repo
			.get_by_external_id(&tech.external_id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(loaded.id, tech.id);

		assert!(repo.get_by_external_id("unknown").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn duplicate_apartment_in_building_conflicts() {
		let repo = UserRepository::new(create_test_pool().await);
		repo.create(&make_principal(Role::Resident, "tower-a", Some("A1204")))
			.await
			.unwrap();

		let err = repo
			.create(&make_principal(Role::Resident, "tower-a", Some("A1204")))
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");
	}

	#[tokio::test]
	async fn same_apartment_in_other_building_is_fine() {
		let repo = UserRepository::new(create_test_pool().await);
		repo.create(&make_principal(Role::Resident, "tower-a", Some("A1204")))
			.await
			.unwrap();
		repo.create(&make_principal(Role::Resident, "tower-b", Some("A1204")))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn technicians_without_apartments_do_not_collide() {
		let repo = UserRepository::new(create_test_pool().await);
		repo.create(&make_principal(Role::Technician, "tower-a", None))
			.await
			.unwrap();
		repo.create(&make_principal(Role::Technician, "tower-a", None))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn list_by_building_filters_role() {
		let repo = UserRepository::new(create_test_pool().await);
		repo.create(&make_principal(Role::Resident, "tower-a", Some("A1204")))
			.await
			.unwrap();
		repo.create(&make_principal(Role::Technician, "tower-a", None))
			.await
			.unwrap();
		repo.create(&make_principal(Role::Resident, "tower-b", Some("A1204")))
			.await
			.unwrap();

		let building = BuildingId::new("tower-a");
		let all = repo.list_by_building(&building, None).await.unwrap();
		assert_eq!(all.len(), 2);

		let techs = repo
			.list_by_building(&building, Some(Role::Technician))
			.await
			.unwrap();
		assert_eq!(techs.len(), 1);
		assert_eq!(techs[0].role, Role::Technician);
	}

	#[tokio::test]
	async fn apartment_occupancy_check() {
		let repo = UserRepository::new(create_test_pool().await);
		repo.create(&make_principal(Role::Resident, "tower-a", Some("A1204")))
			.await
			.unwrap();

		let building = BuildingId::new("tower-a");
		assert!(repo
			.apartment_occupied(&building, &ApartmentId::new("A1204"))
			.await
			.unwrap());
		assert!(!repo
			.apartment_occupied(&building, &ApartmentId::new("B0703"))
			.await
			.unwrap());
		assert!(!repo
			.apartment_occupied(&BuildingId::new("tower-b"), &ApartmentId::new("A1204"))
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn update_persists_profile_changes() {
		let repo = UserRepository::new(create_test_pool().await);
		let mut resident = make_principal(Role::Resident, "tower-a", Some("A1204"));
		repo.create(&resident).await.unwrap();

		resident.display_name = "Renamed".to_string();
		resident.contact_phone = Some("0901234567".to_string());
		repo.update(&resident).await.unwrap();

		let loaded = repo.get(&resident.id).await.unwrap().unwrap();
		assert_eq!(loaded.display_name, "Renamed");
		assert_eq!(loaded.contact_phone.as_deref(), Some("0901234567"));
	}

	#[tokio::test]
	async fn update_missing_profile_is_not_found() {
		let repo = UserRepository::new(create_test_pool().await);
		let ghost = make_principal(Role::Resident, "tower-a", Some("A1204"));
		let err = repo.update(&ghost).await.unwrap_err();
		assert!(matches!(err, DbError::NotFound(_)));
	}

	#[tokio::test]
	async fn apartment_move_collision_conflicts() {
		let repo = UserRepository::new(create_test_pool().await);
		repo.create(&make_principal(Role::Resident, "tower-a", Some("A1204")))
			.await
			.unwrap();
		let mut mover = make_principal(Role::Resident, "tower-a", Some("B0703"));
		repo.create(&mover).await.unwrap();

		mover.apartment_id = Some(ApartmentId::new("A1204"));
		let err = repo.update(&mover).await.unwrap_err();
		assert!(matches!(err, DbError::Conflict(_)));
	}

	#[tokio::test]
	async fn delete_removes_profile() {
		let repo = UserRepository::new(create_test_pool().await);
		let resident = make_principal(Role::Resident, "tower-a", Some("A1204"));
		repo.create(&resident).await.unwrap();

		assert!(repo.delete(&resident.id).await.unwrap());
		assert!(repo.get(&resident.id).await.unwrap().is_none());
		assert!(!repo.delete(&resident.id).await.unwrap());
	}

	#[tokio::test]
	async fn push_tokens_register_idempotently_and_prune() {
		let repo = UserRepository::new(create_test_pool().await);
		let resident = make_principal(Role::Resident, "tower-a", Some("A1204"));
		repo.create(&resident).await.unwrap();

		repo.add_push_token(&resident.id, "tok-1").await.unwrap();
		repo.add_push_token(&resident.id, "tok-1").await.unwrap();
		repo.add_push_token(&resident.id, "tok-2").await.unwrap();

		let loaded = repo.get(&resident.id).await.unwrap().unwrap();
		assert_eq!(loaded.push_tokens, vec!["tok-1", "tok-2"]);

		assert!(repo.remove_push_token(&resident.id, "tok-1").await.unwrap());
		assert!(!repo.remove_push_token(&resident.id, "tok-1").await.unwrap());

		let loaded = repo.get(&resident.id).await.unwrap().unwrap();
		assert_eq!(loaded.push_tokens, vec!["tok-2"]);
	}
}
