use rolegate_common::Address;
use serde::Serialize;

use super::{
    ADDRESS_LENGTH, BUMP_LENGTH, DISCRIMINATOR_LENGTH, I64_LENGTH, Record, RecordKind,
    RecordReader, RecordWriter,
};
use crate::RbacError;

/// Offset of [`UserRole::user`] in the record bytes.
pub const USER_ROLE_USER_OFFSET: usize = DISCRIMINATOR_LENGTH;
/// Offset of [`UserRole::role`] in the record bytes.
pub const USER_ROLE_ROLE_OFFSET: usize = USER_ROLE_USER_OFFSET + ADDRESS_LENGTH;
/// Offset of [`UserRole::root`] in the record bytes.
pub const USER_ROLE_ROOT_OFFSET: usize = USER_ROLE_ROLE_OFFSET + ADDRESS_LENGTH;
const GRANTED_BY_OFFSET: usize = USER_ROLE_ROOT_OFFSET + ADDRESS_LENGTH;
const EXPIRES_AT_OFFSET: usize = GRANTED_BY_OFFSET + ADDRESS_LENGTH;

/// Total size of an encoded [`UserRole`].
pub const USER_ROLE_LENGTH: usize = EXPIRES_AT_OFFSET + I64_LENGTH + BUMP_LENGTH;

/// `expires_at` value of an assignment that never lapses.
pub const NEVER_EXPIRES: i64 = -1;

/// An assignment of a role to a user, optionally time-bounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRole {
    /// The user holding the role
    pub user: Address,
    /// The role held
    pub role: Address,
    /// The root authority the assignment belongs to
    pub root: Address,
    /// Controlling key that made the assignment
    pub granted_by: Address,
    /// [`NEVER_EXPIRES`], or the last Unix second the assignment is valid
    pub expires_at: i64,
    /// Bump the record's address was derived with
    pub bump: u8,
}

impl UserRole {
    /// Whether the assignment is still valid at `unix_timestamp`.
    ///
    /// Only [`NEVER_EXPIRES`] is special; every other value, including other
    /// negative ones, is a point in time.
    pub fn is_active_at(&self, unix_timestamp: i64) -> bool {
        self.expires_at == NEVER_EXPIRES || self.expires_at >= unix_timestamp
    }
}

impl Record for UserRole {
    const KIND: RecordKind = RecordKind::UserRole;

    fn write_fields(&self, writer: &mut RecordWriter) {
        writer.address(&self.user);
        writer.address(&self.role);
        writer.address(&self.root);
        writer.address(&self.granted_by);
        writer.i64(self.expires_at);
        writer.u8(self.bump);
    }

    fn read_fields(reader: &mut RecordReader<'_>) -> Result<Self, RbacError> {
        Ok(Self {
            user: reader.address()?,
            role: reader.address()?,
            root: reader.address()?,
            granted_by: reader.address()?,
            expires_at: reader.i64()?,
            bump: reader.u8()?,
        })
    }
}
