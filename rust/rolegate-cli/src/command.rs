use anyhow::{Context, Result, anyhow};
use ed25519_dalek::SigningKey;
use rolegate_common::{Address, Clock, SystemClock};
use rolegate_program::{
    Effect, Engine, Instruction, Invocation, NEVER_EXPIRES, Permission, PermissionQuery,
    ProcessError, Record, RecordFilter, RecordKind, Role, RolePermission, RootAuthority,
    UserRole, permission_address, role_address, root_address,
};
use rolegate_storage::{FileSystemRecordStore, RecordStore};
use serde::Serialize;

use crate::{
    cli::{AddressCommand, Command, ListCommand, RolegateCli, SignerArgs},
    config::CliConfig,
    keys,
};

/// How a command ended, for the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// A permission check came back negative
    Denied,
}

type FsEngine = Engine<FileSystemRecordStore, SystemClock>;

/// Runs the parsed command line under `config`.
pub async fn run(cli: RolegateCli, config: CliConfig) -> Result<Outcome> {
    let program_id = config.engine.program_id;

    // Commands that never open the store
    match &cli.command {
        Command::Keygen { out, force } => {
            let key = keys::generate()?;
            keys::write(out, &key, *force).await?;
            println!("{}", Address::from(&key));
            return Ok(Outcome::Success);
        }
        Command::Address { of } => {
            let address = match of {
                AddressCommand::Root { controller } => root_address(&program_id, controller)?.0,
                AddressCommand::Role { root, name } => role_address(&program_id, root, name)?.0,
                AddressCommand::Permission { root, name } => {
                    permission_address(&program_id, root, name)?.0
                }
            };
            println!("{address}");
            return Ok(Outcome::Success);
        }
        _ => (),
    }

    let store = FileSystemRecordStore::open(&config.store)
        .await
        .with_context(|| format!("Unable to open store at {}", config.store.display()))?;
    let engine = Engine::with_settings(store, SystemClock, config.engine.clone())?;

    match cli.command {
        Command::Keygen { .. } | Command::Address { .. } => Ok(Outcome::Success),

        Command::Init { key } => {
            let key = keys::read(&key).await?;
            let effect = submit(&engine, &key, Instruction::Initialize).await?;
            report("root authority", &effect);
            Ok(Outcome::Success)
        }

        Command::CreateRole { signer, name } => {
            let (key, root) = signer_of(&engine, &signer).await?;
            let effect = submit(&engine, &key, Instruction::CreateRole { root, name }).await?;
            report("role", &effect);
            Ok(Outcome::Success)
        }

        Command::CreatePermission { signer, name } => {
            let (key, root) = signer_of(&engine, &signer).await?;
            let effect =
                submit(&engine, &key, Instruction::CreatePermission { root, name }).await?;
            report("permission", &effect);
            Ok(Outcome::Success)
        }

        Command::Bind {
            signer,
            role,
            permission,
        } => {
            let (key, root) = signer_of(&engine, &signer).await?;
            let instruction = Instruction::BindPermissionToRole {
                root,
                role: role_address(&program_id, &root, &role)?.0,
                permission: permission_address(&program_id, &root, &permission)?.0,
            };
            let effect = submit(&engine, &key, instruction).await?;
            report("binding", &effect);
            Ok(Outcome::Success)
        }

        Command::Unbind {
            signer,
            role,
            permission,
        } => {
            let (key, root) = signer_of(&engine, &signer).await?;
            let instruction = Instruction::UnbindPermissionFromRole {
                root,
                role: role_address(&program_id, &root, &role)?.0,
                permission: permission_address(&program_id, &root, &permission)?.0,
            };
            let effect = submit(&engine, &key, instruction).await?;
            report("binding", &effect);
            Ok(Outcome::Success)
        }

        Command::Assign {
            signer,
            user,
            role,
            expires_at,
            expires_in,
        } => {
            let (key, root) = signer_of(&engine, &signer).await?;
            let expires_at = match (expires_at, expires_in) {
                (Some(expires_at), _) => expires_at,
                (None, Some(seconds)) => engine
                    .clock()
                    .unix_timestamp()
                    .checked_add(i64::from(seconds))
                    .ok_or_else(|| anyhow!("Expiry is out of range"))?,
                (None, None) => NEVER_EXPIRES,
            };
            let instruction = Instruction::AssignRoleToUser {
                root,
                user,
                role: role_address(&program_id, &root, &role)?.0,
                expires_at,
            };
            let effect = submit(&engine, &key, instruction).await?;
            report("assignment", &effect);
            Ok(Outcome::Success)
        }

        Command::Revoke { signer, user, role } => {
            let (key, root) = signer_of(&engine, &signer).await?;
            let instruction = Instruction::RevokeRoleFromUser {
                root,
                user,
                role: role_address(&program_id, &root, &role)?.0,
            };
            let effect = submit(&engine, &key, instruction).await?;
            report("assignment", &effect);
            Ok(Outcome::Success)
        }

        Command::Transfer { signer, to } => {
            let (key, root) = signer_of(&engine, &signer).await?;
            let instruction = Instruction::TransferAuthority {
                root,
                new_controlling_key: to,
            };
            let effect = submit(&engine, &key, instruction).await?;
            report("root authority", &effect);
            Ok(Outcome::Success)
        }

        Command::Check {
            root,
            user,
            role,
            permission,
        } => {
            let query = PermissionQuery {
                root,
                user,
                role: role_address(&program_id, &root, &role)?.0,
                permission: permission_address(&program_id, &root, &permission)?.0,
            };
            match engine.check_permission(&query).await {
                Ok(()) => {
                    println!("granted");
                    Ok(Outcome::Success)
                }
                Err(error) if error.is_denial() => {
                    println!("denied: {error}");
                    Ok(Outcome::Denied)
                }
                Err(error) => Err(error.into()),
            }
        }

        Command::Show { address } => {
            show(&engine, &address).await?;
            Ok(Outcome::Success)
        }

        Command::List { root, records } => {
            list(&engine, &root, records).await?;
            Ok(Outcome::Success)
        }
    }
}

async fn signer_of(engine: &FsEngine, signer: &SignerArgs) -> Result<(SigningKey, Address)> {
    let key = keys::read(&signer.key).await?;
    let root = match signer.root {
        Some(root) => root,
        None => root_address(&engine.settings().program_id, &Address::from(&key))?.0,
    };
    Ok((key, root))
}

async fn submit(
    engine: &FsEngine,
    key: &SigningKey,
    instruction: Instruction,
) -> Result<Effect, ProcessError> {
    let invocation = Invocation::signed(&engine.settings().program_id, instruction, key);
    engine.process(&invocation).await
}

fn report(subject: &str, effect: &Effect) {
    match effect {
        Effect::Created(address) => println!("created {subject} {address}"),
        Effect::Updated(address) => println!("updated {subject} {address}"),
        Effect::Closed(address) => println!("closed {subject} {address}"),
        Effect::Granted => println!("granted"),
    }
}

async fn show(engine: &FsEngine, address: &Address) -> Result<()> {
    let store = engine.store().await;
    let bytes = store
        .get(address)
        .await?
        .ok_or_else(|| anyhow!("Nothing is stored at {address}"))?;

    let kind = RecordKind::of(&bytes).ok_or_else(|| anyhow!("{address} holds an unknown record"))?;
    let json = match kind {
        RecordKind::RootAuthority => to_json(RootAuthority::decode(&bytes)?)?,
        RecordKind::Role => to_json(Role::decode(&bytes)?)?,
        RecordKind::Permission => to_json(Permission::decode(&bytes)?)?,
        RecordKind::RolePermission => to_json(RolePermission::decode(&bytes)?)?,
        RecordKind::UserRole => to_json(UserRole::decode(&bytes)?)?,
    };

    println!("{} {}", kind.name(), json);
    Ok(())
}

fn to_json<T: Serialize>(record: T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&record)?)
}

async fn list(engine: &FsEngine, root: &Address, records: ListCommand) -> Result<()> {
    let program_id = engine.settings().program_id;

    match records {
        ListCommand::Roles => {
            for (address, role) in engine.query(&RecordFilter::roles_of(root)).await? {
                println!("{address} {}", role.name);
            }
        }
        ListCommand::Permissions => {
            for (address, permission) in engine.query(&RecordFilter::permissions_of(root)).await? {
                println!("{address} {}", permission.name);
            }
        }
        ListCommand::Assignments { user } => {
            let filter = match user {
                Some(user) => RecordFilter::assignments_of_user(root, &user),
                None => RecordFilter::assignments_of(root),
            };
            for (address, assignment) in engine.query(&filter).await? {
                println!(
                    "{address} user={} role={} expires_at={}",
                    assignment.user,
                    assignment.role,
                    describe_expiry(assignment.expires_at)
                );
            }
        }
        ListCommand::Bindings { role } => {
            let role = role_address(&program_id, root, &role)?.0;
            for (address, binding) in engine.query(&RecordFilter::bindings_of(&role)).await? {
                println!("{address} permission={}", binding.permission);
            }
        }
    }

    Ok(())
}

fn describe_expiry(expires_at: i64) -> String {
    if expires_at == NEVER_EXPIRES {
        "never".to_owned()
    } else {
        expires_at.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::*;
    use crate::config::{ConfigLoader, ConfigOverrides};

    async fn rolegate(store: &Path, args: &[&str]) -> Result<Outcome> {
        let mut argv = vec!["rolegate"];
        argv.extend_from_slice(args);
        let cli = RolegateCli::try_parse_from(argv)?;
        let config = ConfigLoader::new(ConfigOverrides {
            store: Some(store.to_owned()),
            ..ConfigOverrides::default()
        })
        .skip_env_vars()
        .load()?;
        run(cli, config).await
    }

    #[tokio::test]
    async fn it_administers_a_store_end_to_end() -> Result<()> {
        let tempdir = tempfile::tempdir()?;
        let store = tempdir.path().join("store");
        let key_path = tempdir.path().join("owner.key");
        let key = key_path.to_string_lossy().to_string();

        rolegate(&store, &["keygen", "--out", &key]).await?;
        let owner = keys::read(&key_path).await?;
        let settings = rolegate_program::EngineSettings::default();
        let root = root_address(&settings.program_id, &Address::from(&owner))?
            .0
            .to_string();
        let member = Address::from(&SigningKey::from_bytes(&[9u8; 32])).to_string();

        rolegate(&store, &["init", "--key", &key]).await?;
        rolegate(&store, &["create-role", "--key", &key, "--name", "editor"]).await?;
        rolegate(&store, &["create-permission", "--key", &key, "--name", "write"]).await?;
        rolegate(
            &store,
            &["bind", "--key", &key, "--role", "editor", "--permission", "write"],
        )
        .await?;
        rolegate(
            &store,
            &["assign", "--key", &key, "--user", &member, "--role", "editor"],
        )
        .await?;

        let check = [
            "check",
            "--root",
            &root,
            "--user",
            &member,
            "--role",
            "editor",
            "--permission",
            "write",
        ];
        assert_eq!(rolegate(&store, &check).await?, Outcome::Success);

        rolegate(
            &store,
            &["revoke", "--key", &key, "--user", &member, "--role", "editor"],
        )
        .await?;
        assert_eq!(rolegate(&store, &check).await?, Outcome::Denied);

        // Administrative failures are errors, not denials
        assert!(
            rolegate(&store, &["create-role", "--key", &key, "--name", "editor"])
                .await
                .is_err()
        );

        Ok(())
    }

    #[test]
    fn it_describes_open_ended_assignments() {
        assert_eq!(describe_expiry(NEVER_EXPIRES), "never");
        assert_eq!(describe_expiry(42), "42");
    }
}
