use rolegate_common::Address;
use rolegate_storage::RecordStore;

use super::{Context, Effect};
use crate::{ProcessError, RbacError, RolePermission, role_permission_address};

/// Grants `permission` to `role`. Both must belong to `root`.
pub async fn bind_permission_to_role<Store>(
    context: &mut Context<'_, Store>,
    signer: &Address,
    root: &Address,
    role: &Address,
    permission: &Address,
) -> Result<Effect, ProcessError>
where
    Store: RecordStore,
{
    context.authorized_root(root, signer).await?;
    context.owned_role(role, root).await?;
    context.owned_permission(permission, root).await?;

    let (address, bump) = role_permission_address(context.program_id(), role, permission)?;
    if context.exists(&address).await? {
        return Err(RbacError::RolePermissionAlreadyAssigned.into());
    }

    context.store(
        address,
        &RolePermission {
            role: *role,
            permission: *permission,
            bump,
        },
    );

    Ok(Effect::Created(address))
}

/// Withdraws `permission` from `role` by closing the binding record.
pub async fn unbind_permission_from_role<Store>(
    context: &mut Context<'_, Store>,
    signer: &Address,
    root: &Address,
    role: &Address,
    permission: &Address,
) -> Result<Effect, ProcessError>
where
    Store: RecordStore,
{
    context.authorized_root(root, signer).await?;
    context.owned_role(role, root).await?;
    context.owned_permission(permission, root).await?;

    let (address, _) = role_permission_address(context.program_id(), role, permission)?;
    let binding = context
        .load::<RolePermission>(&address)
        .await?
        .ok_or(RbacError::RolePermissionNotFound)?;
    if binding.role != *role || binding.permission != *permission {
        return Err(RbacError::RolePermissionMismatch.into());
    }

    context.close(address);

    Ok(Effect::Closed(address))
}
