use rolegate_common::{Address, Clock, SystemClock};
use rolegate_storage::{RecordSource, RecordStore};
use tokio::sync::Mutex;

use crate::{
    Context, Effect, EngineSettings, Instruction, Invocation, PermissionQuery, ProcessError,
    Record, RecordFilter, SettingsError, assign_role_to_user, bind_permission_to_role,
    check_permission, create_permission, create_role, initialize, query, revoke_role_from_user,
    transfer_authority, unbind_permission_from_role,
};

/// Processes invocations against a [`RecordStore`].
///
/// Calls are serialized: each one takes the store exclusively, runs in its
/// own [`Context`] and commits everything it staged as one batch, or nothing
/// if it fails.
pub struct Engine<Store, C = SystemClock>
where
    Store: RecordStore,
    C: Clock,
{
    store: Mutex<Store>,
    clock: C,
    settings: EngineSettings,
}

impl<Store> Engine<Store, SystemClock>
where
    Store: RecordStore,
{
    /// An engine on the system clock with default settings.
    pub fn new(store: Store) -> Self {
        Self {
            store: Mutex::new(store),
            clock: SystemClock,
            settings: EngineSettings::default(),
        }
    }
}

impl<Store, C> Engine<Store, C>
where
    Store: RecordStore,
    C: Clock,
{
    /// An engine with explicit settings and clock.
    pub fn with_settings(
        store: Store,
        clock: C,
        settings: EngineSettings,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            store: Mutex::new(store),
            clock,
            settings,
        })
    }

    /// The settings this engine runs under.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The clock assignment expiry is measured against.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// A handle to the underlying store.
    pub async fn store(&self) -> Store {
        self.store.lock().await.clone()
    }

    /// Verifies and runs `invocation`, committing its writes on success.
    pub async fn process(&self, invocation: &Invocation) -> Result<Effect, ProcessError> {
        let result = self.execute(invocation).await;

        if let Err(error) = &result {
            tracing::warn!(
                operation = invocation.instruction().name(),
                signer = ?invocation.signer(),
                code = ?error.program_error().map(|error| error.code()),
                %error,
                "Rejected invocation"
            );
        }

        result
    }

    async fn execute(&self, invocation: &Invocation) -> Result<Effect, ProcessError> {
        let signer = invocation.verify(&self.settings.program_id)?;
        let instruction = invocation.instruction();
        if instruction.is_mutating() && signer.is_none() {
            return Err(ProcessError::MissingSigner);
        }

        let mut store = self.store.lock().await;
        let (effect, batch) = {
            let mut context = Context::new(&*store, &self.settings);
            let effect = self
                .dispatch(&mut context, signer.as_ref(), instruction)
                .await?;
            (effect, context.into_batch())
        };

        if !batch.is_empty() {
            store.commit(batch).await?;
            log_commit(instruction, &effect);
        }

        Ok(effect)
    }

    async fn dispatch(
        &self,
        context: &mut Context<'_, Store>,
        signer: Option<&Address>,
        instruction: &Instruction,
    ) -> Result<Effect, ProcessError> {
        let signer = || signer.ok_or(ProcessError::MissingSigner);

        match instruction {
            Instruction::Initialize => initialize(context, signer()?).await,
            Instruction::CreateRole { root, name } => {
                create_role(context, signer()?, root, name).await
            }
            Instruction::CreatePermission { root, name } => {
                create_permission(context, signer()?, root, name).await
            }
            Instruction::BindPermissionToRole {
                root,
                role,
                permission,
            } => bind_permission_to_role(context, signer()?, root, role, permission).await,
            Instruction::UnbindPermissionFromRole {
                root,
                role,
                permission,
            } => unbind_permission_from_role(context, signer()?, root, role, permission).await,
            Instruction::AssignRoleToUser {
                root,
                user,
                role,
                expires_at,
            } => assign_role_to_user(context, signer()?, root, user, role, *expires_at).await,
            Instruction::RevokeRoleFromUser { root, user, role } => {
                revoke_role_from_user(context, signer()?, root, user, role).await
            }
            Instruction::TransferAuthority {
                root,
                new_controlling_key,
            } => transfer_authority(context, signer()?, root, new_controlling_key).await,
            Instruction::CheckPermission {
                root,
                user,
                role,
                permission,
            } => {
                let query = PermissionQuery {
                    root: *root,
                    user: *user,
                    role: *role,
                    permission: *permission,
                };
                check_permission(context, &query, self.clock.unix_timestamp()).await?;
                Ok(Effect::Granted)
            }
        }
    }

    /// Succeeds iff `query.user` currently holds `query.permission` through
    /// `query.role`. Needs no signer.
    pub async fn check_permission(&self, query: &PermissionQuery) -> Result<(), ProcessError> {
        let store = self.store.lock().await;
        let context = Context::new(&*store, &self.settings);
        let now = self.clock.unix_timestamp();

        check_permission(&context, query, now).await?;

        tracing::debug!(
            user = %query.user,
            role = %query.role,
            permission = %query.permission,
            "Permission granted"
        );
        Ok(())
    }

    /// Like [`Engine::check_permission`], with every denial folded into
    /// `false`. Storage and decoding failures are still errors.
    pub async fn has_permission(&self, query: &PermissionQuery) -> Result<bool, ProcessError> {
        match self.check_permission(query).await {
            Ok(()) => Ok(true),
            Err(error) if error.is_denial() => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Reads the record at `address`.
    pub async fn fetch<R: Record>(&self, address: &Address) -> Result<Option<R>, ProcessError> {
        let store = self.store.lock().await;
        Context::new(&*store, &self.settings).load(address).await
    }
}

impl<Store, C> Engine<Store, C>
where
    Store: RecordSource,
    C: Clock,
{
    /// Every record selected by `filter`, sorted by address.
    pub async fn query<R: Record>(
        &self,
        filter: &RecordFilter<R>,
    ) -> Result<Vec<(Address, R)>, ProcessError> {
        let store = self.store.lock().await;
        query::select(&*store, filter).await
    }
}

fn log_commit(instruction: &Instruction, effect: &Effect) {
    let address = effect.address().copied().unwrap_or_default();

    match instruction {
        Instruction::Initialize => tracing::info!(root = %address, "Initialized root authority"),
        Instruction::CreateRole { root, name } => {
            tracing::info!(%root, role = %address, name = %name, "Created role")
        }
        Instruction::CreatePermission { root, name } => {
            tracing::info!(%root, permission = %address, name = %name, "Created permission")
        }
        Instruction::BindPermissionToRole {
            root,
            role,
            permission,
        } => tracing::info!(%root, %role, %permission, binding = %address, "Bound permission to role"),
        Instruction::UnbindPermissionFromRole {
            root,
            role,
            permission,
        } => tracing::info!(%root, %role, %permission, binding = %address, "Unbound permission from role"),
        Instruction::AssignRoleToUser {
            root,
            user,
            role,
            expires_at,
        } => tracing::info!(%root, %user, %role, expires_at, assignment = %address, "Assigned role to user"),
        Instruction::RevokeRoleFromUser { root, user, role } => {
            tracing::info!(%root, %user, %role, assignment = %address, "Revoked role from user")
        }
        Instruction::TransferAuthority {
            root,
            new_controlling_key,
        } => tracing::info!(%root, %new_controlling_key, "Transferred authority"),
        Instruction::CheckPermission { .. } => (),
    }
}
