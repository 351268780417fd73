use rolegate_common::{Address, DerivationError, derive_address};

/// Tag seed for [`RootAuthority`](crate::RootAuthority) addresses.
pub const ROOT_SEED: &[u8] = b"root";
/// Tag seed for [`Role`](crate::Role) addresses.
pub const ROLE_SEED: &[u8] = b"role";
/// Tag seed for [`Permission`](crate::Permission) addresses.
pub const PERMISSION_SEED: &[u8] = b"permission";
/// Tag seed for [`RolePermission`](crate::RolePermission) addresses.
pub const ROLE_PERMISSION_SEED: &[u8] = b"role_permission";
/// Tag seed for [`UserRole`](crate::UserRole) addresses.
pub const USER_ROLE_SEED: &[u8] = b"user_role";

/// The root authority created by `controlling_key`.
pub fn root_address(
    program_id: &Address,
    controlling_key: &Address,
) -> Result<(Address, u8), DerivationError> {
    derive_address(program_id, &[ROOT_SEED, controlling_key.as_ref()])
}

/// The role named `name` under `root`.
pub fn role_address(
    program_id: &Address,
    root: &Address,
    name: &str,
) -> Result<(Address, u8), DerivationError> {
    derive_address(program_id, &[ROLE_SEED, root.as_ref(), name.as_bytes()])
}

/// The permission named `name` under `root`.
pub fn permission_address(
    program_id: &Address,
    root: &Address,
    name: &str,
) -> Result<(Address, u8), DerivationError> {
    derive_address(
        program_id,
        &[PERMISSION_SEED, root.as_ref(), name.as_bytes()],
    )
}

/// The binding of `permission` to `role`.
pub fn role_permission_address(
    program_id: &Address,
    role: &Address,
    permission: &Address,
) -> Result<(Address, u8), DerivationError> {
    derive_address(
        program_id,
        &[ROLE_PERMISSION_SEED, role.as_ref(), permission.as_ref()],
    )
}

/// The assignment of `role` to `user` under `root`.
pub fn user_role_address(
    program_id: &Address,
    root: &Address,
    user: &Address,
    role: &Address,
) -> Result<(Address, u8), DerivationError> {
    derive_address(
        program_id,
        &[USER_ROLE_SEED, root.as_ref(), user.as_ref(), role.as_ref()],
    )
}
