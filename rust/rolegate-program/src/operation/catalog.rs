use rolegate_common::Address;
use rolegate_storage::RecordStore;

use super::{Context, Effect};
use crate::{
    Permission, ProcessError, RbacError, Role, permission_address, role_address,
};

/// Creates the role `name` under `root` and bumps the root's role counter.
pub async fn create_role<Store>(
    context: &mut Context<'_, Store>,
    signer: &Address,
    root: &Address,
    name: &str,
) -> Result<Effect, ProcessError>
where
    Store: RecordStore,
{
    let mut authority = context.authorized_root(root, signer).await?;
    check_name(context, name)?;

    let (address, bump) = role_address(context.program_id(), root, name)?;
    if context.exists(&address).await? {
        return Err(RbacError::RoleAlreadyExists.into());
    }

    authority.role_count = authority
        .role_count
        .checked_add(1)
        .ok_or(RbacError::ArithmeticError)?;

    context.store(
        address,
        &Role {
            owner_root: *root,
            name: name.to_owned(),
            bump,
        },
    );
    context.store(*root, &authority);

    Ok(Effect::Created(address))
}

/// Creates the permission `name` under `root` and bumps the root's permission
/// counter.
pub async fn create_permission<Store>(
    context: &mut Context<'_, Store>,
    signer: &Address,
    root: &Address,
    name: &str,
) -> Result<Effect, ProcessError>
where
    Store: RecordStore,
{
    let mut authority = context.authorized_root(root, signer).await?;
    check_name(context, name)?;

    let (address, bump) = permission_address(context.program_id(), root, name)?;
    if context.exists(&address).await? {
        return Err(RbacError::PermissionAlreadyExists.into());
    }

    authority.permission_count = authority
        .permission_count
        .checked_add(1)
        .ok_or(RbacError::ArithmeticError)?;

    context.store(
        address,
        &Permission {
            owner_root: *root,
            name: name.to_owned(),
            bump,
        },
    );
    context.store(*root, &authority);

    Ok(Effect::Created(address))
}

fn check_name<Store>(context: &Context<'_, Store>, name: &str) -> Result<(), RbacError>
where
    Store: RecordStore,
{
    if name.len() > context.settings().max_name_length {
        return Err(RbacError::NameTooLong);
    }
    Ok(())
}
