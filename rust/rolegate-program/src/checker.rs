//! The read path: proving that a user currently holds a permission.
//!
//! There is no "granted" flag anywhere. A user holds a permission through a
//! role exactly when the assignment record for (root, user, role) and the
//! binding record for (role, permission) both exist, link up, and the
//! assignment has not expired.

use rolegate_common::Address;
use rolegate_storage::RecordStore;

use crate::{
    Context, ProcessError, RbacError, RolePermission, UserRole, role_permission_address,
    user_role_address,
};

/// The question a permission check answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionQuery {
    /// Root authority the assignment belongs to
    pub root: Address,
    /// The user's key
    pub user: Address,
    /// Role record address
    pub role: Address,
    /// Permission record address
    pub permission: Address,
}

/// Verifies already-fetched records against `query` at `now`.
///
/// This holds no store and does no I/O, so a caller that obtained the two
/// records some other way can gate its own logic on it directly.
pub fn verify_grant(
    query: &PermissionQuery,
    assignment: &UserRole,
    binding: &RolePermission,
    now: i64,
) -> Result<(), RbacError> {
    if assignment.user != query.user {
        return Err(RbacError::UserMismatch);
    }
    if assignment.role != query.role
        || assignment.root != query.root
        || binding.role != query.role
    {
        return Err(RbacError::RoleMismatch);
    }
    if binding.permission != query.permission {
        return Err(RbacError::RolePermissionMismatch);
    }
    if !assignment.is_active_at(now) {
        return Err(RbacError::RoleExpired);
    }
    Ok(())
}

/// Derives, fetches and verifies the records behind `query`.
///
/// A missing assignment fails with [`RbacError::UserRoleNotFound`], a missing
/// binding with [`RbacError::RolePermissionNotFound`].
pub async fn check_permission<Store>(
    context: &Context<'_, Store>,
    query: &PermissionQuery,
    now: i64,
) -> Result<(), ProcessError>
where
    Store: RecordStore,
{
    let (assignment_address, _) = user_role_address(
        context.program_id(),
        &query.root,
        &query.user,
        &query.role,
    )?;
    let (binding_address, _) =
        role_permission_address(context.program_id(), &query.role, &query.permission)?;

    let assignment = context
        .load::<UserRole>(&assignment_address)
        .await?
        .ok_or(RbacError::UserRoleNotFound)?;
    let binding = context
        .load::<RolePermission>(&binding_address)
        .await?
        .ok_or(RbacError::RolePermissionNotFound)?;

    verify_grant(query, &assignment, &binding, now)?;

    Ok(())
}
