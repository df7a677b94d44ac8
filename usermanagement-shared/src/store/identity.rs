/// Identity store: user accounts
///
/// Enforces email uniqueness among active users, owns password encoding and
/// cascades membership cleanup when a user is deleted.
///
/// # Operations
///
/// - `create_user`: validate, check email, salt + encode, insert
/// - `update_user`: partial update of name and/or email
/// - `change_password`: re-encode with the user's existing salt
/// - `delete_user`: soft-delete memberships, then the user
/// - `list_users` / `list_users_page`: active users plus the active total
/// - `get_user`: one active user

use crate::credential::{encode_password, generate_salt};
use crate::error::{StoreError, StoreResult};
use crate::models::user::{NewUser, UserChanges, UserSummary};
use crate::pagination::{validate_window, PageRequest, PageSlice, Paginated};
use crate::repository::{MembershipRepository, UserRepository};
use crate::store::{ensure_id, optional, required};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Plaintext password, encoded before it is stored
    pub password: String,
}

/// Input for a partial user update
///
/// A missing or blank field is left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Store for user accounts
#[derive(Clone)]
pub struct IdentityStore {
    users: Arc<dyn UserRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl IdentityStore {
    /// Creates a store over the given repositories
    ///
    /// The membership repository is only used to cascade deletes.
    pub fn new(users: Arc<dyn UserRepository>, memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { users, memberships }
    }

    /// Creates a user
    ///
    /// A fresh salt is generated and kept for the life of the account.
    ///
    /// # Errors
    ///
    /// - `Validation` if name, email or password is empty
    /// - `Conflict` if an active user already has the email
    pub async fn create_user(&self, request: CreateUser) -> StoreResult<UserSummary> {
        let name = required(&request.name, "name")?;
        let email = required(&request.email, "email")?;
        if request.password.is_empty() {
            return Err(StoreError::validation("password is required"));
        }

        if self.users.email_taken(&email, None).await? {
            return Err(StoreError::conflict(format!(
                "user with email {} is present",
                email
            )));
        }

        let salt = generate_salt();
        let password_hash = encode_password(&request.password, &salt);
        let user = self
            .users
            .insert(NewUser {
                name,
                email,
                password_hash,
                salt,
            })
            .await?;

        debug!(user_id = user.id, "user created");
        Ok(user.summary())
    }

    /// Returns an active user
    ///
    /// # Errors
    ///
    /// - `Validation` if the id is not positive
    /// - `NotFound` if no active user has the id
    pub async fn get_user(&self, id: i64) -> StoreResult<UserSummary> {
        ensure_id(id, "user_id")?;
        self.users
            .find_active(id)
            .await?
            .map(|user| user.summary())
            .ok_or_else(|| StoreError::not_found(format!("user {} not found", id)))
    }

    /// Updates name and/or email
    ///
    /// Updating an id with no active row changes nothing and is not an error.
    ///
    /// # Errors
    ///
    /// - `Validation` if the id is not positive or neither field is supplied
    /// - `Conflict` if another active user has the new email
    pub async fn update_user(&self, request: UpdateUser) -> StoreResult<()> {
        ensure_id(request.id, "user_id")?;
        let changes = UserChanges {
            name: optional(request.name.as_deref()),
            email: optional(request.email.as_deref()),
        };
        if changes.is_empty() {
            return Err(StoreError::validation("missing update user fields"));
        }

        if let Some(email) = &changes.email {
            if self.users.email_taken(email, Some(request.id)).await? {
                return Err(StoreError::conflict(format!(
                    "user with email {} is present",
                    email
                )));
            }
        }

        let affected = self.users.update_profile(request.id, &changes).await?;
        debug!(user_id = request.id, affected, "user updated");
        Ok(())
    }

    /// Replaces a user's password
    ///
    /// The stored salt is reused; only the hash changes.
    ///
    /// # Errors
    ///
    /// - `Validation` if the id is not positive or the password is empty
    /// - `NotFound` if no active user has the id
    pub async fn change_password(&self, id: i64, new_password: &str) -> StoreResult<()> {
        ensure_id(id, "user_id")?;
        if new_password.is_empty() {
            return Err(StoreError::validation("password is required"));
        }

        let user = self
            .users
            .find_active(id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("user {} not found", id)))?;

        let password_hash = encode_password(new_password, &user.salt);
        self.users.update_password_hash(user.id, &password_hash).await?;

        debug!(user_id = id, "password changed");
        Ok(())
    }

    /// Soft-deletes a user and its memberships
    ///
    /// Memberships go first. The two writes are not atomic: if the second one
    /// fails the memberships are already gone and the caller should re-query.
    /// Deleting an already deleted or unknown user is a no-op.
    ///
    /// # Errors
    ///
    /// - `Validation` if the id is not positive
    pub async fn delete_user(&self, id: i64) -> StoreResult<()> {
        ensure_id(id, "user_id")?;

        let memberships_removed = self.memberships.soft_delete_for_user(id).await?;
        let affected = self.users.soft_delete(id).await?;

        debug!(user_id = id, affected, memberships_removed, "user deleted");
        Ok(())
    }

    /// Lists active users in id order
    ///
    /// `total` counts all active users, not just this window.
    ///
    /// # Errors
    ///
    /// - `Validation` if `limit` is 0 or above 1000, or `offset` is negative
    pub async fn list_users(&self, offset: i64, limit: i64) -> StoreResult<PageSlice<UserSummary>> {
        validate_window(offset, limit)?;

        let items = self.users.list_active(offset, limit).await?;
        let total = self.users.count_active().await?;
        Ok(PageSlice { items, total })
    }

    /// Lists active users by 1-indexed page
    pub async fn list_users_page(&self, page: PageRequest) -> StoreResult<Paginated<UserSummary>> {
        let slice = self.list_users(page.offset(), page.limit()).await?;
        Ok(page.envelope(slice))
    }
}
