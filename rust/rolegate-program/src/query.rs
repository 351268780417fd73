//! Bulk reads for display: "every role under this root" and the like.
//!
//! There is no index to consult, so a query streams the whole store and keeps
//! the records whose discriminator and filtered fields match, the same way a
//! ledger RPC answers a memcmp filter.

use std::marker::PhantomData;

use futures_util::{TryStreamExt, pin_mut};
use rolegate_common::Address;
use rolegate_storage::RecordSource;

use crate::{
    PERMISSION_OWNER_ROOT_OFFSET, Permission, ProcessError, ROLE_OWNER_ROOT_OFFSET,
    ROLE_PERMISSION_ROLE_OFFSET, ROOT_AUTHORITY_CONTROLLING_KEY_OFFSET, Record, Role,
    RolePermission, RootAuthority, USER_ROLE_ROOT_OFFSET, USER_ROLE_USER_OFFSET, UserRole,
};

/// Selects records of kind `R` whose bytes match every memcmp clause.
#[derive(Debug, Clone)]
pub struct RecordFilter<R>
where
    R: Record,
{
    memcmp: Vec<(usize, Vec<u8>)>,
    record: PhantomData<R>,
}

impl<R> Default for RecordFilter<R>
where
    R: Record,
{
    fn default() -> Self {
        Self {
            memcmp: Vec::new(),
            record: PhantomData,
        }
    }
}

impl<R> RecordFilter<R>
where
    R: Record,
{
    /// Additionally require `bytes` at `offset`.
    pub fn memcmp(mut self, offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        self.memcmp.push((offset, bytes.into()));
        self
    }

    /// Whether `bytes` is a record this filter selects.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        let discriminator = R::KIND.discriminator();
        bytes.starts_with(&discriminator)
            && self.memcmp.iter().all(|(offset, expected)| {
                bytes
                    .get(*offset..offset.saturating_add(expected.len()))
                    .is_some_and(|actual| actual == expected.as_slice())
            })
    }
}

impl RecordFilter<RootAuthority> {
    /// Root authorities controlled by `key`.
    pub fn roots_controlled_by(key: &Address) -> Self {
        Self::default().memcmp(ROOT_AUTHORITY_CONTROLLING_KEY_OFFSET, key.as_ref())
    }
}

impl RecordFilter<Role> {
    /// Roles created under `root`.
    pub fn roles_of(root: &Address) -> Self {
        Self::default().memcmp(ROLE_OWNER_ROOT_OFFSET, root.as_ref())
    }
}

impl RecordFilter<Permission> {
    /// Permissions created under `root`.
    pub fn permissions_of(root: &Address) -> Self {
        Self::default().memcmp(PERMISSION_OWNER_ROOT_OFFSET, root.as_ref())
    }
}

impl RecordFilter<UserRole> {
    /// Assignments made under `root`.
    pub fn assignments_of(root: &Address) -> Self {
        Self::default().memcmp(USER_ROLE_ROOT_OFFSET, root.as_ref())
    }

    /// Assignments made to `user` under `root`.
    pub fn assignments_of_user(root: &Address, user: &Address) -> Self {
        Self::assignments_of(root).memcmp(USER_ROLE_USER_OFFSET, user.as_ref())
    }
}

impl RecordFilter<RolePermission> {
    /// Permissions bound to `role`.
    pub fn bindings_of(role: &Address) -> Self {
        Self::default().memcmp(ROLE_PERMISSION_ROLE_OFFSET, role.as_ref())
    }
}

/// Every record in `store` selected by `filter`, decoded and sorted by
/// address.
pub async fn select<Store, R>(
    store: &Store,
    filter: &RecordFilter<R>,
) -> Result<Vec<(Address, R)>, ProcessError>
where
    Store: RecordSource,
    R: Record,
{
    let stream = store.scan();
    pin_mut!(stream);

    let mut records = Vec::new();
    while let Some((address, bytes)) = stream.try_next().await? {
        if filter.matches(&bytes) {
            records.push((address, R::decode(&bytes)?));
        }
    }

    records.sort_by(|(left, _), (right, _)| left.cmp(right));
    Ok(records)
}

/// Roles created under `root`.
pub async fn roles_of<Store: RecordSource>(
    store: &Store,
    root: &Address,
) -> Result<Vec<(Address, Role)>, ProcessError> {
    select(store, &RecordFilter::roles_of(root)).await
}

/// Permissions created under `root`.
pub async fn permissions_of<Store: RecordSource>(
    store: &Store,
    root: &Address,
) -> Result<Vec<(Address, Permission)>, ProcessError> {
    select(store, &RecordFilter::permissions_of(root)).await
}

/// Assignments made under `root`.
pub async fn assignments_of<Store: RecordSource>(
    store: &Store,
    root: &Address,
) -> Result<Vec<(Address, UserRole)>, ProcessError> {
    select(store, &RecordFilter::assignments_of(root)).await
}

/// Assignments made to `user` under `root`.
pub async fn assignments_of_user<Store: RecordSource>(
    store: &Store,
    root: &Address,
    user: &Address,
) -> Result<Vec<(Address, UserRole)>, ProcessError> {
    select(store, &RecordFilter::assignments_of_user(root, user)).await
}

/// Permissions bound to `role`.
pub async fn bindings_of<Store: RecordSource>(
    store: &Store,
    role: &Address,
) -> Result<Vec<(Address, RolePermission)>, ProcessError> {
    select(store, &RecordFilter::bindings_of(role)).await
}

/// Root authorities controlled by `key`.
pub async fn roots_controlled_by<Store: RecordSource>(
    store: &Store,
    key: &Address,
) -> Result<Vec<(Address, RootAuthority)>, ProcessError> {
    select(store, &RecordFilter::roots_controlled_by(key)).await
}
