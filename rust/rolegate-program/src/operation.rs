//! The state transitions. Each runs against one [`Context`]: a
//! [`Transaction`] over the store plus the settings it was started with.
//! Nothing an operation stages is visible outside that context until the
//! engine commits it.

use rolegate_common::Address;
use rolegate_storage::{RecordStore, Transaction, WriteBatch};

use crate::{
    EngineSettings, Permission, ProcessError, RbacError, Record, Role, RootAuthority,
};

mod tenant;
pub use tenant::*;

mod catalog;
pub use catalog::*;

mod binding;
pub use binding::*;

mod assignment;
pub use assignment::*;

/// What a successful operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// A record was created at this address
    Created(Address),
    /// The record at this address was changed
    Updated(Address),
    /// The record at this address was closed
    Closed(Address),
    /// A permission check passed; nothing changed
    Granted,
}

impl Effect {
    /// The record that was touched, if any.
    pub fn address(&self) -> Option<&Address> {
        match self {
            Effect::Created(address) | Effect::Updated(address) | Effect::Closed(address) => {
                Some(address)
            }
            Effect::Granted => None,
        }
    }
}

/// One operation's view of the store.
pub struct Context<'a, Store>
where
    Store: RecordStore,
{
    transaction: Transaction<'a, Store>,
    settings: &'a EngineSettings,
}

impl<'a, Store> Context<'a, Store>
where
    Store: RecordStore,
{
    /// Starts a context over `store`.
    pub fn new(store: &'a Store, settings: &'a EngineSettings) -> Self {
        Self {
            transaction: Transaction::new(store),
            settings,
        }
    }

    /// The settings this context runs under.
    pub fn settings(&self) -> &EngineSettings {
        self.settings
    }

    /// The program id addresses are derived under.
    pub fn program_id(&self) -> &Address {
        &self.settings.program_id
    }

    /// Whether anything lives at `address`.
    pub async fn exists(&self, address: &Address) -> Result<bool, ProcessError> {
        Ok(self.transaction.exists(address).await?)
    }

    /// Loads and decodes the record at `address`.
    pub async fn load<R: Record>(&self, address: &Address) -> Result<Option<R>, ProcessError> {
        match self.transaction.get(address).await? {
            Some(bytes) => Ok(Some(R::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Stages `record` at `address`.
    pub fn store<R: Record>(&mut self, address: Address, record: &R) {
        self.transaction.put(address, record.encode());
    }

    /// Stages removal of the record at `address`.
    pub fn close(&mut self, address: Address) {
        self.transaction.close(address);
    }

    /// Loads the root authority at `root` and checks that `signer` controls
    /// it.
    pub async fn authorized_root(
        &self,
        root: &Address,
        signer: &Address,
    ) -> Result<RootAuthority, ProcessError> {
        let authority = match self.load::<RootAuthority>(root).await {
            Ok(Some(authority)) => authority,
            Ok(None) => return Err(RbacError::RootNotFound.into()),
            Err(ProcessError::Program(RbacError::AccountDiscriminatorMismatch)) => {
                return Err(RbacError::NotRootAuthority.into());
            }
            Err(error) => return Err(error),
        };

        if authority.controlling_key != *signer {
            return Err(RbacError::Unauthorized.into());
        }

        Ok(authority)
    }

    /// Loads the role at `role` and checks that it belongs to `root`.
    pub async fn owned_role(&self, role: &Address, root: &Address) -> Result<Role, ProcessError> {
        let record = self
            .load::<Role>(role)
            .await?
            .ok_or(RbacError::RoleNotFound)?;
        if record.owner_root != *root {
            return Err(RbacError::RoleMismatch.into());
        }
        Ok(record)
    }

    /// Loads the permission at `permission` and checks that it belongs to
    /// `root`.
    pub async fn owned_permission(
        &self,
        permission: &Address,
        root: &Address,
    ) -> Result<Permission, ProcessError> {
        let record = self
            .load::<Permission>(permission)
            .await?
            .ok_or(RbacError::PermissionNotFound)?;
        if record.owner_root != *root {
            return Err(RbacError::PermissionMismatch.into());
        }
        Ok(record)
    }

    /// Ends the context, yielding everything it staged.
    pub fn into_batch(self) -> WriteBatch {
        self.transaction.into_batch()
    }
}

#[cfg(test)]
mod tests {
    use rolegate_storage::MemoryRecordStore;

    use super::*;

    #[tokio::test]
    async fn it_reports_a_non_root_record_as_not_a_root_authority() -> anyhow::Result<()> {
        let store = MemoryRecordStore::default();
        let settings = EngineSettings::default();
        let mut context = Context::new(&store, &settings);

        let address = Address::from([5u8; 32]);
        let signer = Address::from([6u8; 32]);
        context.store(
            address,
            &Role {
                owner_root: address,
                name: "impostor".into(),
                bump: 255,
            },
        );

        assert!(matches!(
            context.authorized_root(&address, &signer).await,
            Err(ProcessError::Program(RbacError::NotRootAuthority))
        ));
        assert!(matches!(
            context.authorized_root(&Address::from([7u8; 32]), &signer).await,
            Err(ProcessError::Program(RbacError::RootNotFound))
        ));

        Ok(())
    }
}
