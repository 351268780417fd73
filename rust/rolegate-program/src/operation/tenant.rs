use rolegate_common::{Address, is_on_curve};
use rolegate_storage::RecordStore;

use super::{Context, Effect};
use crate::{ProcessError, RbacError, RootAuthority, root_address};

/// Creates the root authority controlled by `signer`, with both counters at
/// zero.
pub async fn initialize<Store>(
    context: &mut Context<'_, Store>,
    signer: &Address,
) -> Result<Effect, ProcessError>
where
    Store: RecordStore,
{
    let (address, bump) = root_address(context.program_id(), signer)?;
    if context.exists(&address).await? {
        return Err(RbacError::RootAlreadyExists.into());
    }

    context.store(
        address,
        &RootAuthority {
            controlling_key: *signer,
            role_count: 0,
            permission_count: 0,
            bump,
        },
    );

    Ok(Effect::Created(address))
}

/// Replaces the controlling key of `root`. The root keeps its address; from
/// the commit onwards only `new_controlling_key` passes the authority check.
///
/// The new key must be a valid Ed25519 public key, otherwise nobody could
/// ever sign for the tenant again.
pub async fn transfer_authority<Store>(
    context: &mut Context<'_, Store>,
    signer: &Address,
    root: &Address,
    new_controlling_key: &Address,
) -> Result<Effect, ProcessError>
where
    Store: RecordStore,
{
    let mut authority = context.authorized_root(root, signer).await?;
    if !is_on_curve(new_controlling_key.bytes()) {
        return Err(RbacError::InvalidAddress.into());
    }

    authority.controlling_key = *new_controlling_key;
    context.store(*root, &authority);

    Ok(Effect::Updated(*root))
}
