/// Identity, group and membership stores
///
/// The stores hold the validation and invariant logic; rows move through the
/// repository traits. Each store is built from explicit repository handles
/// and holds no other state, so clones are cheap and share the backend.
///
/// Every operation validates its input before touching storage, then runs a
/// read-then-write sequence with no transaction around it. The repositories
/// reject duplicate active rows themselves, which keeps the invariants intact
/// when two requests race past the same pre-check.
///
/// # Example
///
/// ```
/// use usermanagement_shared::store::{CreateUser, Stores};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (stores, _db) = Stores::in_memory();
///
/// let user = stores.identity.create_user(CreateUser {
///     name: "Jane".to_string(),
///     email: "jane@example.com".to_string(),
///     password: "hunter22".to_string(),
/// }).await?;
///
/// let group = stores.groups.create_group("admins").await?;
/// stores.memberships.add_member(user.id, group.id).await?;
/// # Ok(())
/// # }
/// ```

use crate::error::{StoreError, StoreResult};
use crate::repository::{
    memory::MemoryDatabase,
    postgres::{PgGroupRepository, PgMembershipRepository, PgUserRepository},
    GroupRepository, MembershipRepository, UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

pub mod group;
pub mod identity;
pub mod membership;

pub use group::GroupStore;
pub use identity::{CreateUser, IdentityStore, UpdateUser};
pub use membership::MembershipStore;

/// The three stores wired to one backend
#[derive(Clone)]
pub struct Stores {
    pub identity: IdentityStore,
    pub groups: GroupStore,
    pub memberships: MembershipStore,
}

impl Stores {
    /// Wires the stores to the given repositories
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        memberships: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            identity: IdentityStore::new(users, memberships.clone()),
            groups: GroupStore::new(groups, memberships.clone()),
            memberships: MembershipStore::new(memberships),
        }
    }

    /// Stores backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgGroupRepository::new(pool.clone())),
            Arc::new(PgMembershipRepository::new(pool)),
        )
    }

    /// Stores backed by a fresh in-memory database
    ///
    /// The database handle is returned too so callers can inspect rows.
    pub fn in_memory() -> (Self, MemoryDatabase) {
        let db = MemoryDatabase::new();
        let stores = Self::new(
            Arc::new(db.users()),
            Arc::new(db.groups()),
            Arc::new(db.memberships()),
        );
        (stores, db)
    }
}

/// Rejects non-positive surrogate ids
pub(crate) fn ensure_id(id: i64, field: &str) -> StoreResult<()> {
    if id <= 0 {
        return Err(StoreError::validation(format!(
            "{} must be a positive id, got {}",
            field, id
        )));
    }
    Ok(())
}

/// Trims a required text field, rejecting blank values
pub(crate) fn required(value: &str, field: &str) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Treats a missing or blank optional field as absent
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_ensure_id() {
        assert!(ensure_id(1, "user_id").is_ok());
        assert_eq!(ensure_id(0, "user_id").unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(ensure_id(-4, "user_id").unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("  jane ", "name").unwrap(), "jane");
        assert!(required("", "name").is_err());
        assert!(required("   ", "name").is_err());
    }

    #[test]
    fn test_optional_drops_blank_values() {
        assert_eq!(optional(Some(" x ")), Some("x".to_string()));
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(None), None);
    }
}
