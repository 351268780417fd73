use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rolegate_common::Address;

#[derive(Debug, Parser)]
#[command(name = "rolegate")]
#[command(bin_name = "rolegate")]
#[command(about = "Administer a rolegate access-control store", long_about = None)]
pub struct RolegateCli {
    /// Directory holding the record store
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// JSON configuration file (defaults to rolegate.json in the store)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Program id every address is derived under
    #[arg(long, global = true)]
    pub program_id: Option<Address>,

    /// Log filter, e.g. "info" or "rolegate_program=debug"
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// The key that signs an instruction, and the tenant it acts on.
#[derive(Debug, Args)]
pub struct SignerArgs {
    /// File holding the signer's base58 seed
    #[arg(long)]
    pub key: PathBuf,

    /// Root authority to act on (defaults to the one the key created)
    #[arg(long)]
    pub root: Option<Address>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a fresh signing key and print its address
    Keygen {
        #[arg(long)]
        out: PathBuf,

        /// Replace an existing key file
        #[arg(long)]
        force: bool,
    },

    /// Create the root authority controlled by a key
    Init {
        #[arg(long)]
        key: PathBuf,
    },

    CreateRole {
        #[command(flatten)]
        signer: SignerArgs,

        #[arg(long)]
        name: String,
    },

    CreatePermission {
        #[command(flatten)]
        signer: SignerArgs,

        #[arg(long)]
        name: String,
    },

    /// Grant a permission to a role
    Bind {
        #[command(flatten)]
        signer: SignerArgs,

        #[arg(long)]
        role: String,

        #[arg(long)]
        permission: String,
    },

    /// Withdraw a permission from a role
    Unbind {
        #[command(flatten)]
        signer: SignerArgs,

        #[arg(long)]
        role: String,

        #[arg(long)]
        permission: String,
    },

    /// Give a role to a user
    Assign {
        #[command(flatten)]
        signer: SignerArgs,

        #[arg(long)]
        user: Address,

        #[arg(long)]
        role: String,

        /// Last Unix second the assignment is valid
        #[arg(long, allow_hyphen_values = true, conflicts_with = "expires_in")]
        expires_at: Option<i64>,

        /// Seconds from now the assignment stays valid
        #[arg(long)]
        expires_in: Option<u32>,
    },

    /// Take a role away from a user
    Revoke {
        #[command(flatten)]
        signer: SignerArgs,

        #[arg(long)]
        user: Address,

        #[arg(long)]
        role: String,
    },

    /// Hand a root authority over to another key
    Transfer {
        #[command(flatten)]
        signer: SignerArgs,

        #[arg(long)]
        to: Address,
    },

    /// Exit successfully iff the user holds the permission through the role
    Check {
        #[arg(long)]
        root: Address,

        #[arg(long)]
        user: Address,

        #[arg(long)]
        role: String,

        #[arg(long)]
        permission: String,
    },

    /// Print the record stored at an address
    Show { address: Address },

    /// List the records under a root authority
    List {
        #[arg(long)]
        root: Address,

        #[command(subcommand)]
        records: ListCommand,
    },

    /// Print derived addresses without touching the store
    Address {
        #[command(subcommand)]
        of: AddressCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ListCommand {
    Roles,
    Permissions,
    Assignments {
        /// Only this user's assignments
        #[arg(long)]
        user: Option<Address>,
    },
    Bindings {
        #[arg(long)]
        role: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AddressCommand {
    Root {
        #[arg(long)]
        controller: Address,
    },
    Role {
        #[arg(long)]
        root: Address,

        #[arg(long)]
        name: String,
    },
    Permission {
        #[arg(long)]
        root: Address,

        #[arg(long)]
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_negative_expiry() {
        let user = Address::from([3u8; 32]).to_string();
        let cli = RolegateCli::try_parse_from([
            "rolegate",
            "assign",
            "--key",
            "owner.key",
            "--user",
            &user,
            "--role",
            "admin",
            "--expires-at",
            "-1",
        ])
        .unwrap();

        match cli.command {
            Command::Assign { expires_at, .. } => assert_eq!(expires_at, Some(-1)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn it_accepts_global_flags_after_the_subcommand() {
        let cli =
            RolegateCli::try_parse_from(["rolegate", "init", "--key", "k", "--store", "/tmp/s"])
                .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/s")));
    }

    #[test]
    fn it_rejects_malformed_addresses() {
        assert!(RolegateCli::try_parse_from(["rolegate", "show", "not-base58!"]).is_err());
    }
}
