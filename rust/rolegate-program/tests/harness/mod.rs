#![allow(dead_code)]

use std::sync::Arc;

use ed25519_dalek::SigningKey;
use rolegate_common::{Address, FixedClock};
use rolegate_program::{
    Effect, Engine, EngineSettings, Instruction, Invocation, PermissionQuery, ProcessError,
    RbacError, permission_address, role_address, root_address,
};
use rolegate_storage::{MemoryRecordStore, RecordStore};

pub const NOW: i64 = 1_700_000_000;

pub fn key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub fn user(seed: u8) -> Address {
    Address::from(&key(seed))
}

pub struct Harness<Store>
where
    Store: RecordStore,
{
    pub engine: Engine<Store, Arc<FixedClock>>,
    pub clock: Arc<FixedClock>,
}

impl Harness<MemoryRecordStore> {
    pub fn in_memory() -> Self {
        Self::over(MemoryRecordStore::default())
    }
}

impl<Store> Harness<Store>
where
    Store: RecordStore,
{
    pub fn over(store: Store) -> Self {
        let clock = Arc::new(FixedClock::new(NOW));
        let engine = Engine::with_settings(store, clock.clone(), EngineSettings::default())
            .expect("default settings are valid");
        Self { engine, clock }
    }

    pub fn program_id(&self) -> Address {
        self.engine.settings().program_id
    }

    pub async fn run(
        &self,
        signer: &SigningKey,
        instruction: Instruction,
    ) -> Result<Effect, ProcessError> {
        let invocation = Invocation::signed(&self.program_id(), instruction, signer);
        self.engine.process(&invocation).await
    }

    pub fn root_of(&self, controlling_key: &SigningKey) -> Address {
        root_address(&self.program_id(), &Address::from(controlling_key))
            .expect("root address derives")
            .0
    }

    pub fn role(&self, root: &Address, name: &str) -> Address {
        role_address(&self.program_id(), root, name)
            .expect("role address derives")
            .0
    }

    pub fn permission(&self, root: &Address, name: &str) -> Address {
        permission_address(&self.program_id(), root, name)
            .expect("permission address derives")
            .0
    }

    pub async fn initialize(&self, controlling_key: &SigningKey) -> anyhow::Result<Address> {
        self.run(controlling_key, Instruction::Initialize).await?;
        Ok(self.root_of(controlling_key))
    }

    pub async fn create_role(
        &self,
        controlling_key: &SigningKey,
        root: &Address,
        name: &str,
    ) -> Result<Address, ProcessError> {
        self.run(
            controlling_key,
            Instruction::CreateRole {
                root: *root,
                name: name.into(),
            },
        )
        .await?;
        Ok(self.role(root, name))
    }

    pub async fn create_permission(
        &self,
        controlling_key: &SigningKey,
        root: &Address,
        name: &str,
    ) -> Result<Address, ProcessError> {
        self.run(
            controlling_key,
            Instruction::CreatePermission {
                root: *root,
                name: name.into(),
            },
        )
        .await?;
        Ok(self.permission(root, name))
    }

    pub async fn bind(
        &self,
        controlling_key: &SigningKey,
        root: &Address,
        role: &Address,
        permission: &Address,
    ) -> Result<Effect, ProcessError> {
        self.run(
            controlling_key,
            Instruction::BindPermissionToRole {
                root: *root,
                role: *role,
                permission: *permission,
            },
        )
        .await
    }

    pub async fn unbind(
        &self,
        controlling_key: &SigningKey,
        root: &Address,
        role: &Address,
        permission: &Address,
    ) -> Result<Effect, ProcessError> {
        self.run(
            controlling_key,
            Instruction::UnbindPermissionFromRole {
                root: *root,
                role: *role,
                permission: *permission,
            },
        )
        .await
    }

    pub async fn assign(
        &self,
        controlling_key: &SigningKey,
        root: &Address,
        user: &Address,
        role: &Address,
        expires_at: i64,
    ) -> Result<Effect, ProcessError> {
        self.run(
            controlling_key,
            Instruction::AssignRoleToUser {
                root: *root,
                user: *user,
                role: *role,
                expires_at,
            },
        )
        .await
    }

    pub async fn revoke(
        &self,
        controlling_key: &SigningKey,
        root: &Address,
        user: &Address,
        role: &Address,
    ) -> Result<Effect, ProcessError> {
        self.run(
            controlling_key,
            Instruction::RevokeRoleFromUser {
                root: *root,
                user: *user,
                role: *role,
            },
        )
        .await
    }

    pub async fn check(
        &self,
        root: &Address,
        user: &Address,
        role: &Address,
        permission: &Address,
    ) -> Result<(), ProcessError> {
        self.engine
            .check_permission(&PermissionQuery {
                root: *root,
                user: *user,
                role: *role,
                permission: *permission,
            })
            .await
    }
}

/// The program error inside `result`, failing the test on success or on any
/// other kind of error.
pub fn rejection<T: std::fmt::Debug>(result: Result<T, ProcessError>) -> RbacError {
    match result {
        Err(ProcessError::Program(error)) => error,
        other => panic!("expected a program error, got {other:?}"),
    }
}
