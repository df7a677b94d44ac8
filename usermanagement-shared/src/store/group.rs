/// Group store: named collections of users
///
/// Mirrors the identity store with the group name as the unique-among-active
/// field. Deleting a group cascades over memberships keyed by group id.

use crate::error::{StoreError, StoreResult};
use crate::models::group::GroupSummary;
use crate::pagination::{validate_window, PageRequest, PageSlice, Paginated};
use crate::repository::{GroupRepository, MembershipRepository};
use crate::store::{ensure_id, required};
use std::sync::Arc;
use tracing::debug;

/// Store for groups
#[derive(Clone)]
pub struct GroupStore {
    groups: Arc<dyn GroupRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl GroupStore {
    pub fn new(groups: Arc<dyn GroupRepository>, memberships: Arc<dyn MembershipRepository>) -> Self {
        Self {
            groups,
            memberships,
        }
    }

    /// Creates a group
    ///
    /// # Errors
    ///
    /// - `Validation` if the name is empty
    /// - `Conflict` if an active group has the name
    pub async fn create_group(&self, name: &str) -> StoreResult<GroupSummary> {
        let name = required(name, "name")?;

        if self.groups.name_taken(&name, None).await? {
            return Err(StoreError::conflict(format!(
                "group with name {} is present",
                name
            )));
        }

        let group = self.groups.insert(&name).await?;
        debug!(group_id = group.id, "group created");
        Ok(group.summary())
    }

    /// Returns an active group
    pub async fn get_group(&self, id: i64) -> StoreResult<GroupSummary> {
        ensure_id(id, "group_id")?;
        self.groups
            .find_active(id)
            .await?
            .map(|group| group.summary())
            .ok_or_else(|| StoreError::not_found(format!("group {} not found", id)))
    }

    /// Renames a group
    ///
    /// Renaming an id with no active row is a no-op. Renaming a group to its
    /// current name is allowed.
    ///
    /// # Errors
    ///
    /// - `Validation` if the id is not positive or the name is empty
    /// - `Conflict` if another active group has the name
    pub async fn update_group(&self, id: i64, name: &str) -> StoreResult<()> {
        ensure_id(id, "group_id")?;
        let name = required(name, "name")?;

        if self.groups.name_taken(&name, Some(id)).await? {
            return Err(StoreError::conflict(format!(
                "group with name {} is present",
                name
            )));
        }

        let affected = self.groups.rename(id, &name).await?;
        debug!(group_id = id, affected, "group updated");
        Ok(())
    }

    /// Soft-deletes a group and all its memberships
    ///
    /// Memberships go first; see `IdentityStore::delete_user` for the
    /// non-atomic caveat. Repeated deletes are no-ops.
    pub async fn delete_group(&self, id: i64) -> StoreResult<()> {
        ensure_id(id, "group_id")?;

        let memberships_removed = self.memberships.soft_delete_for_group(id).await?;
        let affected = self.groups.soft_delete(id).await?;

        debug!(group_id = id, affected, memberships_removed, "group deleted");
        Ok(())
    }

    /// Lists active groups in id order with the active total
    ///
    /// # Errors
    ///
    /// - `Validation` if `limit` is 0 or above 1000, or `offset` is negative
    pub async fn list_groups(&self, offset: i64, limit: i64) -> StoreResult<PageSlice<GroupSummary>> {
        validate_window(offset, limit)?;

        let items = self.groups.list_active(offset, limit).await?;
        let total = self.groups.count_active().await?;
        Ok(PageSlice { items, total })
    }

    pub async fn list_groups_page(&self, page: PageRequest) -> StoreResult<Paginated<GroupSummary>> {
        let slice = self.list_groups(page.offset(), page.limit()).await?;
        Ok(page.envelope(slice))
    }
}
