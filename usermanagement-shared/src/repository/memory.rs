/// In-memory repositories
///
/// All three repositories share one [`MemoryDatabase`], a set of tables behind
/// a single mutex. Each trait call takes the lock once, so a check and its
/// write inside one call are atomic, the same way a unique index makes the
/// database's insert atomic. Two separate calls are not.
///
/// Ids come from per-table counters and are never reused. Deleted rows stay in
/// the tables with `deleted_at` set and can be inspected through
/// [`MemoryDatabase::user_row`] and friends.
///
/// # Example
///
/// ```
/// use usermanagement_shared::repository::memory::MemoryDatabase;
/// use usermanagement_shared::repository::GroupRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = MemoryDatabase::new();
/// let groups = db.groups();
///
/// let group = groups.insert("admins").await?;
/// assert!(groups.name_taken("admins", None).await?);
/// assert!(!groups.name_taken("admins", Some(group.id)).await?);
/// # Ok(())
/// # }
/// ```

use crate::error::{StoreError, StoreResult};
use crate::models::{
    group::{Group, GroupSummary},
    membership::Membership,
    user::{NewUser, User, UserChanges, UserSummary},
};
use crate::repository::{GroupRepository, MembershipRepository, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    memberships: BTreeMap<i64, Membership>,
    last_user_id: i64,
    last_group_id: i64,
    last_membership_id: i64,
    unavailable: bool,
}

impl Tables {
    fn email_taken(&self, email: &str, except_id: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.is_active() && u.email == email && Some(u.id) != except_id)
    }

    fn name_taken(&self, name: &str, except_id: Option<i64>) -> bool {
        self.groups
            .values()
            .any(|g| g.is_active() && g.name == name && Some(g.id) != except_id)
    }

    fn active_user_mut(&mut self, id: i64) -> Option<&mut User> {
        self.users.get_mut(&id).filter(|u| u.is_active())
    }

    fn active_members(&self, group_id: i64) -> Vec<UserSummary> {
        let mut members: Vec<UserSummary> = self
            .memberships
            .values()
            .filter(|m| m.is_active() && m.group_id == group_id)
            .filter_map(|m| self.users.get(&m.user_id))
            .filter(|u| u.is_active())
            .map(User::summary)
            .collect();
        members.sort_by_key(|u| u.id);
        members
    }

    /// Soft-deletes every active membership matching `pred`
    fn soft_delete_memberships(&mut self, pred: impl Fn(&Membership) -> bool) -> u64 {
        let now = Utc::now();
        let mut affected = 0;
        for membership in self.memberships.values_mut() {
            if membership.is_active() && pred(membership) {
                membership.deleted_at = Some(now);
                membership.updated_at = now;
                affected += 1;
            }
        }
        affected
    }
}

fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

fn window<T>(rows: impl Iterator<Item = T>, offset: i64, limit: i64) -> Vec<T> {
    let skip = usize::try_from(offset).unwrap_or(0);
    let take = usize::try_from(limit).unwrap_or(0);
    rows.skip(skip).take(take).collect()
}

fn to_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Shared in-process table set
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> MemoryUserRepository {
        MemoryUserRepository { db: self.clone() }
    }

    pub fn groups(&self) -> MemoryGroupRepository {
        MemoryGroupRepository { db: self.clone() }
    }

    pub fn memberships(&self) -> MemoryMembershipRepository {
        MemoryMembershipRepository { db: self.clone() }
    }

    /// Makes every repository call fail with a storage error until reset
    pub fn set_unavailable(&self, unavailable: bool) {
        self.raw().unavailable = unavailable;
    }

    /// User row by id, including soft-deleted rows
    pub fn user_row(&self, id: i64) -> Option<User> {
        self.raw().users.get(&id).cloned()
    }

    /// Group row by id, including soft-deleted rows
    pub fn group_row(&self, id: i64) -> Option<Group> {
        self.raw().groups.get(&id).cloned()
    }

    /// All membership rows, including soft-deleted ones, ordered by id
    pub fn membership_rows(&self) -> Vec<Membership> {
        self.raw().memberships.values().cloned().collect()
    }

    // Inspection helpers ignore poisoning and the unavailable flag
    fn raw(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        let tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::storage("in-memory tables poisoned"))?;
        if tables.unavailable {
            return Err(StoreError::storage("in-memory database unavailable"));
        }
        Ok(tables)
    }
}

/// In-memory [`UserRepository`]
#[derive(Debug, Clone)]
pub struct MemoryUserRepository {
    db: MemoryDatabase,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.db.lock()?;
        if tables.email_taken(&user.email, None) {
            return Err(StoreError::conflict(
                "unique constraint users_email_active_key violated",
            ));
        }

        let now = Utc::now();
        let row = User {
            id: next_id(&mut tables.last_user_id),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            salt: user.salt,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_active(&self, id: i64) -> StoreResult<Option<User>> {
        let tables = self.db.lock()?;
        Ok(tables.users.get(&id).filter(|u| u.is_active()).cloned())
    }

    async fn email_taken(&self, email: &str, except_id: Option<i64>) -> StoreResult<bool> {
        Ok(self.db.lock()?.email_taken(email, except_id))
    }

    async fn update_profile(&self, id: i64, changes: &UserChanges) -> StoreResult<u64> {
        let mut tables = self.db.lock()?;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(StoreError::conflict(
                    "unique constraint users_email_active_key violated",
                ));
            }
        }

        let Some(user) = tables.active_user_mut(id) else {
            return Ok(0);
        };
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        user.updated_at = Utc::now();
        Ok(1)
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<u64> {
        let mut tables = self.db.lock()?;
        let Some(user) = tables.active_user_mut(id) else {
            return Ok(0);
        };
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(1)
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<u64> {
        let mut tables = self.db.lock()?;
        let Some(user) = tables.active_user_mut(id) else {
            return Ok(0);
        };
        let now = Utc::now();
        user.deleted_at = Some(now);
        user.updated_at = now;
        Ok(1)
    }

    async fn list_active(&self, offset: i64, limit: i64) -> StoreResult<Vec<UserSummary>> {
        let tables = self.db.lock()?;
        let active = tables.users.values().filter(|u| u.is_active()).map(User::summary);
        Ok(window(active, offset, limit))
    }

    async fn count_active(&self) -> StoreResult<i64> {
        let tables = self.db.lock()?;
        Ok(to_count(tables.users.values().filter(|u| u.is_active()).count()))
    }
}

/// In-memory [`GroupRepository`]
#[derive(Debug, Clone)]
pub struct MemoryGroupRepository {
    db: MemoryDatabase,
}

#[async_trait]
impl GroupRepository for MemoryGroupRepository {
    async fn insert(&self, name: &str) -> StoreResult<Group> {
        let mut tables = self.db.lock()?;
        if tables.name_taken(name, None) {
            return Err(StoreError::conflict(
                "unique constraint groups_name_active_key violated",
            ));
        }

        let now = Utc::now();
        let row = Group {
            id: next_id(&mut tables.last_group_id),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.groups.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_active(&self, id: i64) -> StoreResult<Option<Group>> {
        let tables = self.db.lock()?;
        Ok(tables.groups.get(&id).filter(|g| g.is_active()).cloned())
    }

    async fn name_taken(&self, name: &str, except_id: Option<i64>) -> StoreResult<bool> {
        Ok(self.db.lock()?.name_taken(name, except_id))
    }

    async fn rename(&self, id: i64, name: &str) -> StoreResult<u64> {
        let mut tables = self.db.lock()?;
        if tables.name_taken(name, Some(id)) {
            return Err(StoreError::conflict(
                "unique constraint groups_name_active_key violated",
            ));
        }

        let Some(group) = tables.groups.get_mut(&id).filter(|g| g.is_active()) else {
            return Ok(0);
        };
        group.name = name.to_string();
        group.updated_at = Utc::now();
        Ok(1)
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<u64> {
        let mut tables = self.db.lock()?;
        let Some(group) = tables.groups.get_mut(&id).filter(|g| g.is_active()) else {
            return Ok(0);
        };
        let now = Utc::now();
        group.deleted_at = Some(now);
        group.updated_at = now;
        Ok(1)
    }

    async fn list_active(&self, offset: i64, limit: i64) -> StoreResult<Vec<GroupSummary>> {
        let tables = self.db.lock()?;
        let active = tables.groups.values().filter(|g| g.is_active()).map(Group::summary);
        Ok(window(active, offset, limit))
    }

    async fn count_active(&self) -> StoreResult<i64> {
        let tables = self.db.lock()?;
        Ok(to_count(tables.groups.values().filter(|g| g.is_active()).count()))
    }
}

/// In-memory [`MembershipRepository`]
#[derive(Debug, Clone)]
pub struct MemoryMembershipRepository {
    db: MemoryDatabase,
}

#[async_trait]
impl MembershipRepository for MemoryMembershipRepository {
    async fn insert(&self, user_id: i64, group_id: i64) -> StoreResult<Membership> {
        let mut tables = self.db.lock()?;
        let already_member = tables
            .memberships
            .values()
            .any(|m| m.is_active() && m.user_id == user_id);
        if already_member {
            return Err(StoreError::conflict(
                "unique constraint memberships_user_active_key violated",
            ));
        }

        let now = Utc::now();
        let row = Membership {
            id: next_id(&mut tables.last_membership_id),
            user_id,
            group_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.memberships.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_active_for_user(&self, user_id: i64) -> StoreResult<Option<Membership>> {
        let tables = self.db.lock()?;
        Ok(tables
            .memberships
            .values()
            .find(|m| m.is_active() && m.user_id == user_id)
            .cloned())
    }

    async fn count_active_for_user(&self, user_id: i64) -> StoreResult<i64> {
        let tables = self.db.lock()?;
        let count = tables
            .memberships
            .values()
            .filter(|m| m.is_active() && m.user_id == user_id)
            .count();
        Ok(to_count(count))
    }

    async fn soft_delete_for_user(&self, user_id: i64) -> StoreResult<u64> {
        let mut tables = self.db.lock()?;
        Ok(tables.soft_delete_memberships(|m| m.user_id == user_id))
    }

    async fn soft_delete_for_group(&self, group_id: i64) -> StoreResult<u64> {
        let mut tables = self.db.lock()?;
        Ok(tables.soft_delete_memberships(|m| m.group_id == group_id))
    }

    async fn soft_delete_pair(&self, group_id: i64, user_id: i64) -> StoreResult<u64> {
        let mut tables = self.db.lock()?;
        Ok(tables.soft_delete_memberships(|m| m.group_id == group_id && m.user_id == user_id))
    }

    async fn list_members(
        &self,
        group_id: i64,
        offset: i64,
        limit: i64,
    ) -> StoreResult<Vec<UserSummary>> {
        let tables = self.db.lock()?;
        Ok(window(tables.active_members(group_id).into_iter(), offset, limit))
    }

    async fn count_members(&self, group_id: i64) -> StoreResult<i64> {
        let tables = self.db.lock()?;
        Ok(to_count(tables.active_members(group_id).len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_and_never_reused() {
        let db = MemoryDatabase::new();
        let users = db.users();

        let first = users.insert(new_user("a@example.com")).await.unwrap();
        users.soft_delete(first.id).await.unwrap();
        let second = users.insert(new_user("a@example.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_active_email() {
        let db = MemoryDatabase::new();
        let users = db.users();

        users.insert(new_user("dup@example.com")).await.unwrap();
        let err = users.insert(new_user("dup@example.com")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_profile_rejects_email_of_other_active_user() {
        let db = MemoryDatabase::new();
        let users = db.users();

        let a = users.insert(new_user("a@example.com")).await.unwrap();
        users.insert(new_user("b@example.com")).await.unwrap();

        let changes = UserChanges {
            email: Some("b@example.com".to_string()),
            ..Default::default()
        };
        let err = users.update_profile(a.id, &changes).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_window_and_count() {
        let db = MemoryDatabase::new();
        let users = db.users();
        for i in 0..5 {
            users.insert(new_user(&format!("u{}@example.com", i))).await.unwrap();
        }
        users.soft_delete(2).await.unwrap();

        let page = users.list_active(1, 2).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(users.count_active().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_members_exclude_deleted_users() {
        let db = MemoryDatabase::new();
        let users = db.users();
        let memberships = db.memberships();

        let a = users.insert(new_user("a@example.com")).await.unwrap();
        let b = users.insert(new_user("b@example.com")).await.unwrap();
        memberships.insert(a.id, 1).await.unwrap();
        memberships.insert(b.id, 1).await.unwrap();
        users.soft_delete(a.id).await.unwrap();

        let members = memberships.list_members(1, 0, 10).await.unwrap();
        assert_eq!(members, vec![b.summary()]);
        assert_eq!(memberships.count_members(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_database_fails_with_storage_error() {
        let db = MemoryDatabase::new();
        db.set_unavailable(true);

        let err = db.groups().count_active().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);

        db.set_unavailable(false);
        assert_eq!(db.groups().count_active().await.unwrap(), 0);
    }
}
