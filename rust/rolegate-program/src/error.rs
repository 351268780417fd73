use rolegate_common::DerivationError;
use rolegate_storage::RolegateStorageError;
use thiserror::Error;

/// The first code in the [`RbacError`] range. Codes are assigned in
/// declaration order and never reused.
pub const RBAC_ERROR_CODE_OFFSET: u32 = 6000;

/// Failures raised by the access-control operations themselves.
///
/// Every variant aborts the operation that raised it; nothing it staged is
/// committed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RbacError {
    /// The signer is not the tenant's current controlling key
    #[error("You are not authorized to perform this action")]
    Unauthorized = RBAC_ERROR_CODE_OFFSET,

    /// A role with this name already exists under the root
    #[error("A role with this name already exists")]
    RoleAlreadyExists,

    /// A permission with this name already exists under the root
    #[error("A permission with this name already exists")]
    PermissionAlreadyExists,

    /// No role record at the supplied address
    #[error("The specified role was not found")]
    RoleNotFound,

    /// No permission record at the supplied address
    #[error("The specified permission was not found")]
    PermissionNotFound,

    /// The assignment's expiry has passed
    #[error("The user's role assignment has expired")]
    RoleExpired,

    /// The supplied root address holds some other kind of record
    #[error("Only the root authority can perform this action")]
    NotRootAuthority,

    /// The role already has this permission
    #[error("This permission is already assigned to the role")]
    RolePermissionAlreadyAssigned,

    /// The user already holds this role
    #[error("This role is already assigned to the user")]
    UserRoleAlreadyAssigned,

    /// The role belongs to a different root, or a stored link names a
    /// different role
    #[error("The role does not belong to this root authority")]
    RoleMismatch,

    /// The permission belongs to a different root
    #[error("The permission does not belong to this root authority")]
    PermissionMismatch,

    /// A stored assignment names a different user
    #[error("The user role does not match the expected user")]
    UserMismatch,

    /// A stored binding names a different role or permission
    #[error("The role permission link does not match the expected permission")]
    RolePermissionMismatch,

    /// A counter would overflow
    #[error("Arithmetic Error")]
    ArithmeticError,

    /// The signer already controls a root authority
    #[error("A root authority already exists for this key")]
    RootAlreadyExists,

    /// No root authority at the supplied address
    #[error("The specified root authority was not found")]
    RootNotFound,

    /// No assignment for this (root, user, role)
    #[error("The user does not hold this role")]
    UserRoleNotFound,

    /// No binding for this (role, permission)
    #[error("The role does not have this permission")]
    RolePermissionNotFound,

    /// The name exceeds the configured maximum length
    #[error("The name is too long")]
    NameTooLong,

    /// The bytes at an address belong to a different kind of record
    #[error("The account discriminator does not match the expected record")]
    AccountDiscriminatorMismatch,

    /// The bytes at an address do not decode as the expected record
    #[error("The account could not be deserialized")]
    AccountDidNotDeserialize,

    /// An address argument cannot be used for this purpose
    #[error("The supplied address is not valid here")]
    InvalidAddress,
}

impl RbacError {
    /// The stable numeric code of this error.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Whether this error means "the user does not hold the permission".
    ///
    /// A permission check fails with a missing record, a broken link or an
    /// expired assignment; callers that want a plain yes/no treat all of
    /// those the same way.
    pub fn is_denial(self) -> bool {
        matches!(
            self,
            RbacError::RoleNotFound
                | RbacError::PermissionNotFound
                | RbacError::RoleExpired
                | RbacError::RoleMismatch
                | RbacError::PermissionMismatch
                | RbacError::UserMismatch
                | RbacError::RolePermissionMismatch
                | RbacError::RootNotFound
                | RbacError::UserRoleNotFound
                | RbacError::RolePermissionNotFound
        )
    }
}

/// Everything that can go wrong while processing an
/// [`Invocation`](crate::Invocation).
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The operation itself was rejected
    #[error(transparent)]
    Program(#[from] RbacError),

    /// The record store failed
    #[error(transparent)]
    Storage(#[from] RolegateStorageError),

    /// The invocation's signature does not verify against its signer
    #[error("Invocation signature does not verify")]
    InvalidSignature,

    /// A mutating instruction arrived without a signer
    #[error("Instruction requires a signer")]
    MissingSigner,

    /// A record address could not be derived
    #[error(transparent)]
    Derivation(#[from] DerivationError),
}

impl ProcessError {
    /// The program error, if this is one.
    pub fn program_error(&self) -> Option<RbacError> {
        match self {
            ProcessError::Program(error) => Some(*error),
            _ => None,
        }
    }

    /// See [`RbacError::is_denial`].
    pub fn is_denial(&self) -> bool {
        self.program_error().is_some_and(RbacError::is_denial)
    }
}

/// Invalid [`EngineSettings`](crate::EngineSettings).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Names are address seeds, so they cannot be longer than a seed
    #[error("max_name_length {0} exceeds the seed limit of {max}", max = rolegate_common::MAX_SEED_LEN)]
    NameLengthTooLarge(usize),
}
