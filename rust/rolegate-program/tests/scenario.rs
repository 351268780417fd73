mod harness;

use anyhow::Result;
use harness::{Harness, NOW, key, rejection, user};
use pretty_assertions::assert_eq;
use rolegate_common::Clock;
use rolegate_program::{NEVER_EXPIRES, RbacError, RootAuthority, query};
use rolegate_storage::{FileSystemRecordStore, RecordSource};

async fn run_catalog_scenario<Store: RecordSource>(harness: Harness<Store>) -> Result<()> {
    let authority = key(1);
    let user_a = user(10);
    let user_b = user(11);

    let root = harness.initialize(&authority).await?;

    let admin = harness.create_role(&authority, &root, "admin").await?;
    let editor = harness.create_role(&authority, &root, "editor").await?;
    let viewer = harness.create_role(&authority, &root, "viewer").await?;

    let read = harness.create_permission(&authority, &root, "read").await?;
    let write = harness.create_permission(&authority, &root, "write").await?;
    let delete = harness.create_permission(&authority, &root, "delete").await?;
    let publish = harness.create_permission(&authority, &root, "publish").await?;

    for permission in [&read, &write, &delete, &publish] {
        harness.bind(&authority, &root, &admin, permission).await?;
    }
    for permission in [&read, &write, &publish] {
        harness.bind(&authority, &root, &editor, permission).await?;
    }
    harness.bind(&authority, &root, &viewer, &read).await?;

    harness
        .assign(&authority, &root, &user_a, &admin, NEVER_EXPIRES)
        .await?;
    harness
        .assign(&authority, &root, &user_b, &viewer, NEVER_EXPIRES)
        .await?;

    harness.check(&root, &user_a, &admin, &write).await?;
    harness.check(&root, &user_b, &viewer, &read).await?;

    assert_eq!(
        rejection(harness.check(&root, &user_b, &viewer, &write).await),
        RbacError::RolePermissionNotFound
    );

    harness
        .assign(&authority, &root, &user_b, &editor, NOW - 3_600)
        .await?;
    assert_eq!(
        rejection(harness.check(&root, &user_b, &editor, &write).await),
        RbacError::RoleExpired
    );

    harness.revoke(&authority, &root, &user_b, &viewer).await?;
    assert_eq!(
        rejection(harness.check(&root, &user_b, &viewer, &read).await),
        RbacError::UserRoleNotFound
    );

    harness.unbind(&authority, &root, &admin, &delete).await?;
    assert_eq!(
        rejection(harness.check(&root, &user_a, &admin, &delete).await),
        RbacError::RolePermissionNotFound
    );
    harness.check(&root, &user_a, &admin, &publish).await?;

    let tenant = harness
        .engine
        .fetch::<RootAuthority>(&root)
        .await?
        .expect("root authority exists");
    assert_eq!(tenant.role_count, 3);
    assert_eq!(tenant.permission_count, 4);

    let store = harness.engine.store().await;
    let roles: Vec<String> = query::roles_of(&store, &root)
        .await?
        .into_iter()
        .map(|(_, role)| role.name)
        .collect();
    let mut expected_roles = roles.clone();
    expected_roles.sort_by_key(|name| harness.role(&root, name));
    assert_eq!(roles, expected_roles);
    assert_eq!(roles.len(), 3);

    assert_eq!(query::permissions_of(&store, &root).await?.len(), 4);
    assert_eq!(query::bindings_of(&store, &admin).await?.len(), 3);
    assert_eq!(query::assignments_of(&store, &root).await?.len(), 2);
    assert_eq!(
        query::assignments_of_user(&store, &root, &user_b)
            .await?
            .into_iter()
            .map(|(_, assignment)| assignment.role)
            .collect::<Vec<_>>(),
        vec![editor]
    );
    assert_eq!(
        query::roots_controlled_by(&store, &authority.verifying_key().into()).await?[0].0,
        root
    );

    Ok(())
}

#[tokio::test]
async fn it_runs_the_catalog_scenario_in_memory() -> Result<()> {
    run_catalog_scenario(Harness::in_memory()).await
}

#[tokio::test]
async fn it_runs_the_catalog_scenario_on_disk() -> Result<()> {
    let tempdir = tempfile::tempdir()?;
    run_catalog_scenario(Harness::over(FileSystemRecordStore::open(tempdir.path()).await?)).await
}

#[tokio::test]
async fn it_lets_an_assignment_lapse_without_touching_it() -> Result<()> {
    let harness = Harness::in_memory();
    let authority = key(1);
    let member = user(10);

    let root = harness.initialize(&authority).await?;
    let role = harness.create_role(&authority, &root, "contractor").await?;
    let permission = harness.create_permission(&authority, &root, "deploy").await?;
    harness.bind(&authority, &root, &role, &permission).await?;
    harness
        .assign(&authority, &root, &member, &role, NOW + 60)
        .await?;

    harness.check(&root, &member, &role, &permission).await?;

    harness.clock.advance(60);
    assert_eq!(harness.clock.unix_timestamp(), NOW + 60);
    harness.check(&root, &member, &role, &permission).await?;

    harness.clock.advance(1);
    assert_eq!(
        rejection(harness.check(&root, &member, &role, &permission).await),
        RbacError::RoleExpired
    );

    Ok(())
}

#[tokio::test]
async fn it_survives_reopening_the_store() -> Result<()> {
    let tempdir = tempfile::tempdir()?;
    let authority = key(1);
    let member = user(10);

    let (root, role, permission) = {
        let harness = Harness::over(FileSystemRecordStore::open(tempdir.path()).await?);
        let root = harness.initialize(&authority).await?;
        let role = harness.create_role(&authority, &root, "admin").await?;
        let permission = harness.create_permission(&authority, &root, "read").await?;
        harness.bind(&authority, &root, &role, &permission).await?;
        harness
            .assign(&authority, &root, &member, &role, NEVER_EXPIRES)
            .await?;
        (root, role, permission)
    };

    let reopened = Harness::over(FileSystemRecordStore::open(tempdir.path()).await?);
    reopened.check(&root, &member, &role, &permission).await?;

    Ok(())
}
