/// Membership model and database operations
///
/// A membership joins one user to one group. Rows reference users and groups
/// by id only; there are no foreign keys, so either side can be soft-deleted
/// without touching this table, and cascading cleanup is done explicitly by
/// the identity and group stores.
///
/// A user has at most one active membership. The partial unique index on
/// `user_id` enforces that at the storage layer.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE memberships (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL,
///     group_id BIGINT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
///
/// CREATE UNIQUE INDEX memberships_user_active_key ON memberships (user_id) WHERE deleted_at IS NULL;
/// CREATE INDEX memberships_group_active_idx ON memberships (group_id) WHERE deleted_at IS NULL;
/// ```
///
/// # Example
///
/// ```no_run
/// use usermanagement_shared::models::membership::Membership;
/// use usermanagement_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// // Put user 1 in group 2
/// Membership::insert(&pool, 1, 2).await?;
///
/// // First page of group 2's members
/// let members = Membership::list_members(&pool, 2, 0, 10).await?;
/// # Ok(())
/// # }
/// ```

use crate::models::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Surrogate id
    pub id: i64,

    /// Member user id
    pub user_id: i64,

    /// Group id
    pub group_id: i64,

    /// When the user joined the group
    pub created_at: DateTime<Utc>,

    /// When the row was last modified
    pub updated_at: DateTime<Utc>,

    /// When the membership was removed (None while active)
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Membership {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Inserts an active membership
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user already has an active membership (`memberships_user_active_key`)
    /// - Database connection fails
    pub async fn insert(pool: &PgPool, user_id: i64, group_id: i64) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (user_id, group_id)
            VALUES ($1, $2)
            RETURNING id, user_id, group_id, created_at, updated_at, deleted_at
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Finds the active membership of a user, if any
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, group_id, created_at, updated_at, deleted_at
            FROM memberships
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Counts active memberships held by a user (0 or 1 when the index holds)
    pub async fn count_active_for_user(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM memberships WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Soft-deletes every active membership of a user
    ///
    /// # Returns
    ///
    /// Number of memberships removed
    pub async fn soft_delete_for_user(pool: &PgPool, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Soft-deletes every active membership of a group
    ///
    /// # Returns
    ///
    /// Number of memberships removed
    pub async fn soft_delete_for_group(pool: &PgPool, group_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE group_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(group_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Soft-deletes the active membership linking `user_id` to `group_id`
    pub async fn soft_delete_pair(
        pool: &PgPool,
        group_id: i64,
        user_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE group_id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Lists active users with an active membership in a group, ordered by user id
    pub async fn list_members(
        pool: &PgPool,
        group_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        let members = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email
            FROM users u
            JOIN memberships m ON m.user_id = u.id
            WHERE m.group_id = $1
              AND m.deleted_at IS NULL
              AND u.deleted_at IS NULL
            ORDER BY u.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Counts active users with an active membership in a group
    pub async fn count_members(pool: &PgPool, group_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM users u
            JOIN memberships m ON m.user_id = u.id
            WHERE m.group_id = $1
              AND m.deleted_at IS NULL
              AND u.deleted_at IS NULL
            "#,
        )
        .bind(group_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        let now = Utc::now();
        let mut membership = Membership {
            id: 1,
            user_id: 10,
            group_id: 20,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        assert!(membership.is_active());

        membership.deleted_at = Some(now);
        assert!(!membership.is_active());
    }
}
