/// Group model and database operations
///
/// Same soft-delete rules as users: names are unique among active groups
/// only, and a deleted group's name can be reused by a new group with a new id.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE groups (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
///
/// CREATE UNIQUE INDEX groups_name_active_key ON groups (name) WHERE deleted_at IS NULL;
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Group row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,

    /// Unique among active groups
    pub name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// When the group was soft-deleted (None while active)
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Public projection of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupSummary {
    pub id: i64,
    pub name: String,
}

impl Group {
    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Inserts a new active group
    ///
    /// Fails with a unique violation (`groups_name_active_key`) if an active
    /// group already has the name.
    pub async fn insert(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at, deleted_at
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(group)
    }

    pub async fn find_active_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, created_at, updated_at, deleted_at
            FROM groups
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(group)
    }

    /// Checks whether an active group other than `except_id` holds `name`
    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        except_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM groups
                WHERE name = $1
                  AND deleted_at IS NULL
                  AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(except_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Renames an active group, returning the number of rows affected
    pub async fn rename(pool: &PgPool, id: i64, name: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET name = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn soft_delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Lists active groups ordered by id
    pub async fn list_active(
        pool: &PgPool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<GroupSummary>, sqlx::Error> {
        let groups = sqlx::query_as::<_, GroupSummary>(
            r#"
            SELECT id, name
            FROM groups
            WHERE deleted_at IS NULL
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(groups)
    }

    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM groups WHERE deleted_at IS NULL")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
