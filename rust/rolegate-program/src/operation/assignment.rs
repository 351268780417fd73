use rolegate_common::Address;
use rolegate_storage::RecordStore;

use super::{Context, Effect};
use crate::{ProcessError, RbacError, UserRole, user_role_address};

/// Gives `role` to `user`. `expires_at` is stored as given; it is only
/// interpreted when a permission is checked.
pub async fn assign_role_to_user<Store>(
    context: &mut Context<'_, Store>,
    signer: &Address,
    root: &Address,
    user: &Address,
    role: &Address,
    expires_at: i64,
) -> Result<Effect, ProcessError>
where
    Store: RecordStore,
{
    let authority = context.authorized_root(root, signer).await?;
    context.owned_role(role, root).await?;

    let (address, bump) = user_role_address(context.program_id(), root, user, role)?;
    if context.exists(&address).await? {
        return Err(RbacError::UserRoleAlreadyAssigned.into());
    }

    context.store(
        address,
        &UserRole {
            user: *user,
            role: *role,
            root: *root,
            granted_by: authority.controlling_key,
            expires_at,
            bump,
        },
    );

    Ok(Effect::Created(address))
}

/// Takes `role` away from `user` by closing the assignment record.
pub async fn revoke_role_from_user<Store>(
    context: &mut Context<'_, Store>,
    signer: &Address,
    root: &Address,
    user: &Address,
    role: &Address,
) -> Result<Effect, ProcessError>
where
    Store: RecordStore,
{
    context.authorized_root(root, signer).await?;

    let (address, _) = user_role_address(context.program_id(), root, user, role)?;
    let assignment = context
        .load::<UserRole>(&address)
        .await?
        .ok_or(RbacError::UserRoleNotFound)?;
    if assignment.user != *user {
        return Err(RbacError::UserMismatch.into());
    }
    if assignment.role != *role || assignment.root != *root {
        return Err(RbacError::RoleMismatch.into());
    }

    context.close(address);

    Ok(Effect::Closed(address))
}
