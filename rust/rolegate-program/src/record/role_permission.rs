use rolegate_common::Address;
use serde::Serialize;

use super::{
    ADDRESS_LENGTH, BUMP_LENGTH, DISCRIMINATOR_LENGTH, Record, RecordKind, RecordReader,
    RecordWriter,
};
use crate::RbacError;

/// Offset of [`RolePermission::role`] in the record bytes.
pub const ROLE_PERMISSION_ROLE_OFFSET: usize = DISCRIMINATOR_LENGTH;
/// Offset of [`RolePermission::permission`] in the record bytes.
pub const ROLE_PERMISSION_PERMISSION_OFFSET: usize = ROLE_PERMISSION_ROLE_OFFSET + ADDRESS_LENGTH;

/// Total size of an encoded [`RolePermission`].
pub const ROLE_PERMISSION_LENGTH: usize =
    ROLE_PERMISSION_PERMISSION_OFFSET + ADDRESS_LENGTH + BUMP_LENGTH;

/// A binding: its existence grants `permission` to holders of `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolePermission {
    /// The bound role
    pub role: Address,
    /// The granted permission
    pub permission: Address,
    /// Bump the record's address was derived with
    pub bump: u8,
}

impl Record for RolePermission {
    const KIND: RecordKind = RecordKind::RolePermission;

    fn write_fields(&self, writer: &mut RecordWriter) {
        writer.address(&self.role);
        writer.address(&self.permission);
        writer.u8(self.bump);
    }

    fn read_fields(reader: &mut RecordReader<'_>) -> Result<Self, RbacError> {
        Ok(Self {
            role: reader.address()?,
            permission: reader.address()?,
            bump: reader.u8()?,
        })
    }
}
