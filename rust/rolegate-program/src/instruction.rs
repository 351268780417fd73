use rolegate_common::Address;
use serde::{Deserialize, Serialize};

const INSTRUCTION_DOMAIN: &[u8] = b"rolegate-instruction-v1";

/// A request to the program. Record addresses that the program can derive
/// itself (roles from names, bindings and assignments from their parents) are
/// never passed in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Create the signer's root authority
    Initialize,

    /// Create a role under `root`
    CreateRole {
        /// Root authority the role belongs to
        root: Address,
        /// Name of the role
        name: String,
    },

    /// Create a permission under `root`
    CreatePermission {
        /// Root authority the permission belongs to
        root: Address,
        /// Name of the permission
        name: String,
    },

    /// Grant `permission` to holders of `role`
    BindPermissionToRole {
        /// Root authority both records belong to
        root: Address,
        /// Role record address
        role: Address,
        /// Permission record address
        permission: Address,
    },

    /// Withdraw `permission` from `role`
    UnbindPermissionFromRole {
        /// Root authority both records belong to
        root: Address,
        /// Role record address
        role: Address,
        /// Permission record address
        permission: Address,
    },

    /// Give `role` to `user` until `expires_at`
    AssignRoleToUser {
        /// Root authority the role belongs to
        root: Address,
        /// The user's key
        user: Address,
        /// Role record address
        role: Address,
        /// Unix seconds, or [`NEVER_EXPIRES`](crate::NEVER_EXPIRES)
        expires_at: i64,
    },

    /// Take `role` away from `user`
    RevokeRoleFromUser {
        /// Root authority the assignment belongs to
        root: Address,
        /// The user's key
        user: Address,
        /// Role record address
        role: Address,
    },

    /// Hand the tenant over to another key
    TransferAuthority {
        /// Root authority to transfer
        root: Address,
        /// The key that controls the tenant afterwards
        new_controlling_key: Address,
    },

    /// Prove that `user` holds `permission` through `role`
    CheckPermission {
        /// Root authority the assignment belongs to
        root: Address,
        /// The user's key
        user: Address,
        /// Role record address
        role: Address,
        /// Permission record address
        permission: Address,
    },
}

impl Instruction {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Initialize => "initialize",
            Instruction::CreateRole { .. } => "create_role",
            Instruction::CreatePermission { .. } => "create_permission",
            Instruction::BindPermissionToRole { .. } => "bind_permission_to_role",
            Instruction::UnbindPermissionFromRole { .. } => "unbind_permission_from_role",
            Instruction::AssignRoleToUser { .. } => "assign_role_to_user",
            Instruction::RevokeRoleFromUser { .. } => "revoke_role_from_user",
            Instruction::TransferAuthority { .. } => "transfer_authority",
            Instruction::CheckPermission { .. } => "check_permission",
        }
    }

    /// Whether the instruction changes state and so must be signed.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Instruction::CheckPermission { .. })
    }

    /// The bytes a signer commits to: a domain tag, the program id, an
    /// opcode and the fields in order. Binding the program id keeps a
    /// signature from being replayed under another program.
    pub fn signing_bytes(&self, program_id: &Address) -> Vec<u8> {
        let mut bytes = INSTRUCTION_DOMAIN.to_vec();
        bytes.extend_from_slice(program_id.as_ref());

        let mut addresses = |opcode: u8, addresses: &[&Address]| {
            bytes.push(opcode);
            for address in addresses {
                bytes.extend_from_slice(address.as_ref());
            }
        };

        match self {
            Instruction::Initialize => addresses(0, &[]),
            Instruction::CreateRole { root, .. } => addresses(1, &[root]),
            Instruction::CreatePermission { root, .. } => addresses(2, &[root]),
            Instruction::BindPermissionToRole {
                root,
                role,
                permission,
            } => addresses(3, &[root, role, permission]),
            Instruction::UnbindPermissionFromRole {
                root,
                role,
                permission,
            } => addresses(4, &[root, role, permission]),
            Instruction::AssignRoleToUser {
                root, user, role, ..
            } => addresses(5, &[root, user, role]),
            Instruction::RevokeRoleFromUser { root, user, role } => {
                addresses(6, &[root, user, role])
            }
            Instruction::TransferAuthority {
                root,
                new_controlling_key,
            } => addresses(7, &[root, new_controlling_key]),
            Instruction::CheckPermission {
                root,
                user,
                role,
                permission,
            } => addresses(8, &[root, user, role, permission]),
        }

        match self {
            Instruction::CreateRole { name, .. } | Instruction::CreatePermission { name, .. } => {
                bytes.extend_from_slice(&(name.len() as u64).to_le_bytes());
                bytes.extend_from_slice(name.as_bytes());
            }
            Instruction::AssignRoleToUser { expires_at, .. } => {
                bytes.extend_from_slice(&expires_at.to_le_bytes());
            }
            _ => (),
        }

        bytes
    }
}
