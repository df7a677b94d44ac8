/// Repository capabilities consumed by the stores
///
/// Each trait is the set of storage primitives one store needs: insert with a
/// generated id, conditional update, soft delete, count and windowed select.
/// Validation and invariant checks live in the stores; repositories only move
/// rows, except that every implementation must reject duplicates among
/// active rows on its own (email, group name, user membership), since the
/// stores' pre-checks can race.
///
/// Two implementations are provided:
///
/// - [`postgres`]: sqlx over a `PgPool`, used in production
/// - [`memory`]: a mutex-guarded in-process table set, used by tests
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use usermanagement_shared::repository::memory::MemoryDatabase;
/// use usermanagement_shared::repository::{MembershipRepository, UserRepository};
///
/// let db = MemoryDatabase::new();
/// let users: Arc<dyn UserRepository> = Arc::new(db.users());
/// let memberships: Arc<dyn MembershipRepository> = Arc::new(db.memberships());
/// ```

use crate::error::StoreResult;
use crate::models::{
    group::{Group, GroupSummary},
    membership::Membership,
    user::{NewUser, User, UserChanges, UserSummary},
};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

/// Storage primitives over user rows
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts an active user; `Conflict` if an active user has the email
    async fn insert(&self, user: NewUser) -> StoreResult<User>;

    /// Active user by id
    async fn find_active(&self, id: i64) -> StoreResult<Option<User>>;

    /// Whether an active user other than `except_id` holds `email`
    async fn email_taken(&self, email: &str, except_id: Option<i64>) -> StoreResult<bool>;

    /// Writes the `Some` fields of `changes`; returns rows affected
    async fn update_profile(&self, id: i64, changes: &UserChanges) -> StoreResult<u64>;

    /// Replaces the password hash, leaving the salt alone; returns rows affected
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<u64>;

    /// Sets `deleted_at`; returns rows affected
    async fn soft_delete(&self, id: i64) -> StoreResult<u64>;

    /// Active users ordered by id
    async fn list_active(&self, offset: i64, limit: i64) -> StoreResult<Vec<UserSummary>>;

    /// Number of active users
    async fn count_active(&self) -> StoreResult<i64>;
}

/// Storage primitives over group rows
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Inserts an active group; `Conflict` if an active group has the name
    async fn insert(&self, name: &str) -> StoreResult<Group>;

    async fn find_active(&self, id: i64) -> StoreResult<Option<Group>>;

    async fn name_taken(&self, name: &str, except_id: Option<i64>) -> StoreResult<bool>;

    async fn rename(&self, id: i64, name: &str) -> StoreResult<u64>;

    async fn soft_delete(&self, id: i64) -> StoreResult<u64>;

    async fn list_active(&self, offset: i64, limit: i64) -> StoreResult<Vec<GroupSummary>>;

    async fn count_active(&self) -> StoreResult<i64>;
}

/// Storage primitives over membership rows
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Inserts an active membership; `Conflict` if the user already has one
    async fn insert(&self, user_id: i64, group_id: i64) -> StoreResult<Membership>;

    async fn find_active_for_user(&self, user_id: i64) -> StoreResult<Option<Membership>>;

    async fn count_active_for_user(&self, user_id: i64) -> StoreResult<i64>;

    async fn soft_delete_for_user(&self, user_id: i64) -> StoreResult<u64>;

    async fn soft_delete_for_group(&self, group_id: i64) -> StoreResult<u64>;

    async fn soft_delete_pair(&self, group_id: i64, user_id: i64) -> StoreResult<u64>;

    /// Active users holding an active membership in the group, ordered by user id
    async fn list_members(
        &self,
        group_id: i64,
        offset: i64,
        limit: i64,
    ) -> StoreResult<Vec<UserSummary>>;

    async fn count_members(&self, group_id: i64) -> StoreResult<i64>;
}
