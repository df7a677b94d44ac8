/// User model and database operations
///
/// Users are soft-deleted: `deleted_at` is set and the row stays. Every query
/// here that reads or mutates "the user" filters on `deleted_at IS NULL`, so a
/// deleted row is invisible to lookups, listings and the email uniqueness
/// check. Its id is never handed out again.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     salt VARCHAR(64) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
///
/// CREATE UNIQUE INDEX users_email_active_key ON users (email) WHERE deleted_at IS NULL;
/// ```
///
/// # Example
///
/// ```no_run
/// use usermanagement_shared::models::user::{NewUser, User};
/// use usermanagement_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::insert(&pool, NewUser {
///     name: "Jane Doe".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "0f3a...".to_string(),
///     salt: "k3J9aPq0ZxV1mN7b".to_string(),
/// }).await?;
///
/// let taken = User::email_taken(&pool, "jane@example.com", None).await?;
/// assert!(taken);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User row
///
/// The password hash and salt are never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Surrogate id, assigned by the database sequence
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address, unique among active users
    pub email: String,

    /// Hex-encoded PBKDF2 output
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Per-user salt, fixed at creation
    #[serde(skip_serializing, default)]
    pub salt: String,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last modified
    pub updated_at: DateTime<Utc>,

    /// When the user was soft-deleted (None while active)
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Public projection of a user
///
/// This is the only user shape that leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Input for inserting a user
///
/// The password must already be encoded.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

/// Partial profile update
///
/// `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    /// True when no column would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

impl User {
    /// Returns the public projection of this row
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Whether the row has not been soft-deleted
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Inserts a new active user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An active user already has the email (`users_email_active_key`)
    /// - Database connection fails
    pub async fn insert(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, salt)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, salt,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.salt)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds an active user by id
    ///
    /// # Returns
    ///
    /// The user if it exists and is not soft-deleted, None otherwise
    pub async fn find_active_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, salt,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether an active user holds `email`
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `email` - Email address to look for
    /// * `except_id` - User id to ignore (the user being updated)
    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        except_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE email = $1
                  AND deleted_at IS NULL
                  AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Applies a partial profile update to an active user
    ///
    /// Only `Some` fields are written. `updated_at` is always bumped.
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 if the user does not exist or is deleted)
    ///
    /// # Errors
    ///
    /// Returns an error if the new email collides with another active user
    /// (`users_email_active_key`) or the database connection fails
    pub async fn update_profile(
        pool: &PgPool,
        id: i64,
        changes: &UserChanges,
    ) -> Result<u64, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if changes.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if changes.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 AND deleted_at IS NULL");

        let mut q = sqlx::query(&query).bind(id);

        if let Some(name) = &changes.name {
            q = q.bind(name.as_str());
        }
        if let Some(email) = &changes.email {
            q = q.bind(email.as_str());
        }

        let result = q.execute(pool).await?;

        Ok(result.rows_affected())
    }

    /// Replaces the stored password hash of an active user
    ///
    /// The salt column is not touched.
    pub async fn update_password_hash(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Soft-deletes a user
    ///
    /// Memberships are not touched here; the identity store removes them first.
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 if already deleted or unknown)
    pub async fn soft_delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Lists active users ordered by id
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `offset` - Number of users to skip
    /// * `limit` - Maximum number of users to return
    pub async fn list_active(
        pool: &PgPool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, name, email
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts active users
    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 7,
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "deadbeef".to_string(),
            salt: "saltsaltsaltsalt".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_summary_projection() {
        let user = sample_user();
        assert_eq!(
            user.summary(),
            UserSummary {
                id: 7,
                name: "Test User".to_string(),
                email: "test@example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_serialization_hides_credentials() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("salt").is_none());
        assert_eq!(json["email"], "test@example.com");
    }

    #[test]
    fn test_is_active() {
        let mut user = sample_user();
        assert!(user.is_active());
        user.deleted_at = Some(Utc::now());
        assert!(!user.is_active());
    }

    #[test]
    fn test_user_changes_default_is_empty() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            name: Some("New".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    // Database round trips are in tests/postgres_store_tests.rs
}
