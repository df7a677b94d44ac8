/// Membership store: which group a user belongs to
///
/// A user belongs to zero or one groups. The store works on ids alone and
/// does not look at the users or groups tables when writing: callers that need
/// referential checks do them before calling `add_member`. Listing members
/// does join against users so deleted accounts never show up.

use crate::error::{StoreError, StoreResult};
use crate::models::{membership::Membership, user::UserSummary};
use crate::pagination::{validate_window, PageRequest, PageSlice, Paginated};
use crate::repository::MembershipRepository;
use crate::store::ensure_id;
use std::sync::Arc;
use tracing::debug;

/// Store for user-to-group memberships
#[derive(Clone)]
pub struct MembershipStore {
    memberships: Arc<dyn MembershipRepository>,
}

impl MembershipStore {
    pub fn new(memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { memberships }
    }

    /// Adds a user to a group
    ///
    /// # Errors
    ///
    /// - `Validation` if either id is not positive
    /// - `Conflict` if the user already has an active membership in any group
    pub async fn add_member(&self, user_id: i64, group_id: i64) -> StoreResult<Membership> {
        ensure_id(user_id, "user_id")?;
        ensure_id(group_id, "group_id")?;

        if self.memberships.count_active_for_user(user_id).await? > 0 {
            return Err(StoreError::conflict(format!(
                "user_id {} is already associated with a group",
                user_id
            )));
        }

        let membership = self.memberships.insert(user_id, group_id).await?;
        debug!(user_id, group_id, membership_id = membership.id, "member added");
        Ok(membership)
    }

    /// Removes a user from a group
    ///
    /// Removing a membership that does not exist is not an error.
    ///
    /// # Errors
    ///
    /// - `Validation` if either id is not positive
    pub async fn remove_member(&self, group_id: i64, user_id: i64) -> StoreResult<()> {
        ensure_id(group_id, "group_id")?;
        ensure_id(user_id, "user_id")?;

        let affected = self.memberships.soft_delete_pair(group_id, user_id).await?;
        debug!(user_id, group_id, affected, "member removed");
        Ok(())
    }

    /// Returns the group a user currently belongs to, if any
    pub async fn group_of(&self, user_id: i64) -> StoreResult<Option<i64>> {
        ensure_id(user_id, "user_id")?;
        let membership = self.memberships.find_active_for_user(user_id).await?;
        Ok(membership.map(|m| m.group_id))
    }

    /// Lists the active users of a group in id order
    ///
    /// `total` counts every active member of the group.
    ///
    /// # Errors
    ///
    /// - `Validation` if the group id is not positive, `limit` is 0 or above
    ///   1000, or `offset` is negative
    pub async fn list_members_of_group(
        &self,
        group_id: i64,
        offset: i64,
        limit: i64,
    ) -> StoreResult<PageSlice<UserSummary>> {
        ensure_id(group_id, "group_id")?;
        validate_window(offset, limit)?;

        let items = self.memberships.list_members(group_id, offset, limit).await?;
        let total = self.memberships.count_members(group_id).await?;
        Ok(PageSlice { items, total })
    }

    pub async fn list_members_page(
        &self,
        group_id: i64,
        page: PageRequest,
    ) -> StoreResult<Paginated<UserSummary>> {
        let slice = self
            .list_members_of_group(group_id, page.offset(), page.limit())
            .await?;
        Ok(page.envelope(slice))
    }
}
