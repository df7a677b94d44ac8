/// Integration tests for the group store

mod common;

use common::{create_user, stores};
use usermanagement_shared::error::ErrorKind;
use usermanagement_shared::pagination::PageRequest;

#[tokio::test]
async fn test_create_and_get_group() {
    let (stores, _db) = stores();

    let group = stores.groups.create_group(" admins ").await.unwrap();
    assert_eq!(group.name, "admins");

    let fetched = stores.groups.get_group(group.id).await.unwrap();
    assert_eq!(fetched, group);

    let err = stores.groups.get_group(group.id + 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_group_validation_and_conflict() {
    let (stores, _db) = stores();

    let err = stores.groups.create_group("").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    stores.groups.create_group("ops").await.unwrap();
    let err = stores.groups.create_group("ops").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_group_name_reusable_after_delete() {
    let (stores, db) = stores();

    let first = stores.groups.create_group("ops").await.unwrap();
    stores.groups.delete_group(first.id).await.unwrap();
    assert!(db.group_row(first.id).unwrap().deleted_at.is_some());

    let second = stores.groups.create_group("ops").await.unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn test_update_group() {
    let (stores, _db) = stores();
    let ops = stores.groups.create_group("ops").await.unwrap();
    let dev = stores.groups.create_group("dev").await.unwrap();

    stores.groups.update_group(ops.id, "operations").await.unwrap();
    assert_eq!(stores.groups.get_group(ops.id).await.unwrap().name, "operations");

    let err = stores.groups.update_group(ops.id, "dev").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Own current name is fine
    stores.groups.update_group(dev.id, "dev").await.unwrap();

    let err = stores.groups.update_group(ops.id, " ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = stores.groups.update_group(0, "x").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Unknown ids change nothing
    stores.groups.update_group(999, "ghost").await.unwrap();
    assert_eq!(stores.groups.list_groups(0, 10).await.unwrap().total, 2);
}

#[tokio::test]
async fn test_delete_group_cascades_memberships() {
    let (stores, db) = stores();
    let group = stores.groups.create_group("staff").await.unwrap();
    let other = stores.groups.create_group("other").await.unwrap();

    let mut members = Vec::new();
    for n in 0..3 {
        let user = create_user(&stores, n).await;
        stores.memberships.add_member(user.id, group.id).await.unwrap();
        members.push(user);
    }
    let outsider = create_user(&stores, 99).await;
    stores.memberships.add_member(outsider.id, other.id).await.unwrap();

    stores.groups.delete_group(group.id).await.unwrap();

    for row in db.membership_rows() {
        if row.group_id == group.id {
            assert!(!row.is_active());
        } else {
            assert!(row.is_active());
        }
    }

    let listed = stores
        .memberships
        .list_members_of_group(group.id, 0, 10)
        .await
        .unwrap();
    assert!(listed.items.is_empty());
    assert_eq!(listed.total, 0);

    // Former members are free to join another group
    stores
        .memberships
        .add_member(members[0].id, other.id)
        .await
        .unwrap();

    // Second delete is a no-op
    stores.groups.delete_group(group.id).await.unwrap();
}

#[tokio::test]
async fn test_list_groups() {
    let (stores, _db) = stores();
    for n in 0..7 {
        stores.groups.create_group(&format!("group{}", n)).await.unwrap();
    }

    let slice = stores.groups.list_groups(5, 5).await.unwrap();
    assert_eq!(slice.items.len(), 2);
    assert_eq!(slice.total, 7);

    let err = stores.groups.list_groups(0, 1001).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let page = stores
        .groups
        .list_groups_page(PageRequest::new(1, 3).unwrap())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[0].name, "group0");
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn test_group_storage_failure_propagates() {
    let (stores, db) = stores();
    db.set_unavailable(true);

    let err = stores.groups.create_group("ops").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);

    let err = stores.groups.delete_group(1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
}
