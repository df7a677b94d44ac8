/// PostgreSQL repositories
///
/// Thin adapters from the repository traits onto the model queries. sqlx
/// errors are converted with `From<sqlx::Error> for StoreError`, which turns a
/// violation of the partial unique indexes into `Conflict`.
///
/// # Example
///
/// ```no_run
/// use usermanagement_shared::db::pool::{create_pool, DatabaseConfig};
/// use usermanagement_shared::repository::postgres::PgUserRepository;
/// use usermanagement_shared::repository::UserRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let users = PgUserRepository::new(pool);
/// println!("{} active users", users.count_active().await?);
/// # Ok(())
/// # }
/// ```

use crate::error::StoreResult;
use crate::models::{
    group::{Group, GroupSummary},
    membership::Membership,
    user::{NewUser, User, UserChanges, UserSummary},
};
use crate::repository::{GroupRepository, MembershipRepository, UserRepository};
use async_trait::async_trait;
use sqlx::PgPool;

/// User repository backed by the `users` table
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        Ok(User::insert(&self.pool, user).await?)
    }

    async fn find_active(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_active_by_id(&self.pool, id).await?)
    }

    async fn email_taken(&self, email: &str, except_id: Option<i64>) -> StoreResult<bool> {
        Ok(User::email_taken(&self.pool, email, except_id).await?)
    }

    async fn update_profile(&self, id: i64, changes: &UserChanges) -> StoreResult<u64> {
        Ok(User::update_profile(&self.pool, id, changes).await?)
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<u64> {
        Ok(User::update_password_hash(&self.pool, id, password_hash).await?)
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<u64> {
        Ok(User::soft_delete(&self.pool, id).await?)
    }

    async fn list_active(&self, offset: i64, limit: i64) -> StoreResult<Vec<UserSummary>> {
        Ok(User::list_active(&self.pool, offset, limit).await?)
    }

    async fn count_active(&self) -> StoreResult<i64> {
        Ok(User::count_active(&self.pool).await?)
    }
}

/// Group repository backed by the `groups` table
#[derive(Debug, Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn insert(&self, name: &str) -> StoreResult<Group> {
        Ok(Group::insert(&self.pool, name).await?)
    }

    async fn find_active(&self, id: i64) -> StoreResult<Option<Group>> {
        Ok(Group::find_active_by_id(&self.pool, id).await?)
    }

    async fn name_taken(&self, name: &str, except_id: Option<i64>) -> StoreResult<bool> {
        Ok(Group::name_taken(&self.pool, name, except_id).await?)
    }

    async fn rename(&self, id: i64, name: &str) -> StoreResult<u64> {
        Ok(Group::rename(&self.pool, id, name).await?)
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<u64> {
        Ok(Group::soft_delete(&self.pool, id).await?)
    }

    async fn list_active(&self, offset: i64, limit: i64) -> StoreResult<Vec<GroupSummary>> {
        Ok(Group::list_active(&self.pool, offset, limit).await?)
    }

    async fn count_active(&self) -> StoreResult<i64> {
        Ok(Group::count_active(&self.pool).await?)
    }
}

/// Membership repository backed by the `memberships` table
///
/// Member listings join against `users`, so both tables must live in the
/// same database.
#[derive(Debug, Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    async fn insert(&self, user_id: i64, group_id: i64) -> StoreResult<Membership> {
        Ok(Membership::insert(&self.pool, user_id, group_id).await?)
    }

    async fn find_active_for_user(&self, user_id: i64) -> StoreResult<Option<Membership>> {
        Ok(Membership::find_active_for_user(&self.pool, user_id).await?)
    }

    async fn count_active_for_user(&self, user_id: i64) -> StoreResult<i64> {
        Ok(Membership::count_active_for_user(&self.pool, user_id).await?)
    }

    async fn soft_delete_for_user(&self, user_id: i64) -> StoreResult<u64> {
        Ok(Membership::soft_delete_for_user(&self.pool, user_id).await?)
    }

    async fn soft_delete_for_group(&self, group_id: i64) -> StoreResult<u64> {
        Ok(Membership::soft_delete_for_group(&self.pool, group_id).await?)
    }

    async fn soft_delete_pair(&self, group_id: i64, user_id: i64) -> StoreResult<u64> {
        Ok(Membership::soft_delete_pair(&self.pool, group_id, user_id).await?)
    }

    async fn list_members(
        &self,
        group_id: i64,
        offset: i64,
        limit: i64,
    ) -> StoreResult<Vec<UserSummary>> {
        Ok(Membership::list_members(&self.pool, group_id, offset, limit).await?)
    }

    async fn count_members(&self, group_id: i64) -> StoreResult<i64> {
        Ok(Membership::count_members(&self.pool, group_id).await?)
    }
}
