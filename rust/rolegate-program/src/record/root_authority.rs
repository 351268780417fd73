use rolegate_common::Address;
use serde::Serialize;

use super::{
    ADDRESS_LENGTH, BUMP_LENGTH, DISCRIMINATOR_LENGTH, Record, RecordKind, RecordReader,
    RecordWriter, U64_LENGTH,
};
use crate::RbacError;

/// Offset of [`RootAuthority::controlling_key`] in the record bytes.
pub const ROOT_AUTHORITY_CONTROLLING_KEY_OFFSET: usize = DISCRIMINATOR_LENGTH;
const ROLE_COUNT_OFFSET: usize = ROOT_AUTHORITY_CONTROLLING_KEY_OFFSET + ADDRESS_LENGTH;
const PERMISSION_COUNT_OFFSET: usize = ROLE_COUNT_OFFSET + U64_LENGTH;
const BUMP_OFFSET: usize = PERMISSION_COUNT_OFFSET + U64_LENGTH;

/// Total size of an encoded [`RootAuthority`].
pub const ROOT_AUTHORITY_LENGTH: usize = BUMP_OFFSET + BUMP_LENGTH;

/// The per-tenant anchor: who controls the tenant and how many roles and
/// permissions have been created under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootAuthority {
    /// The key allowed to administer this tenant
    pub controlling_key: Address,
    /// Roles created so far
    pub role_count: u64,
    /// Permissions created so far
    pub permission_count: u64,
    /// Bump the record's address was derived with
    pub bump: u8,
}

impl Record for RootAuthority {
    const KIND: RecordKind = RecordKind::RootAuthority;

    fn write_fields(&self, writer: &mut RecordWriter) {
        writer.address(&self.controlling_key);
        writer.u64(self.role_count);
        writer.u64(self.permission_count);
        writer.u8(self.bump);
    }

    fn read_fields(reader: &mut RecordReader<'_>) -> Result<Self, RbacError> {
        Ok(Self {
            controlling_key: reader.address()?,
            role_count: reader.u64()?,
            permission_count: reader.u64()?,
            bump: reader.u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_lays_out_a_root_authority_byte_for_byte() {
        let root = RootAuthority {
            controlling_key: Address::from([7u8; 32]),
            role_count: 3,
            permission_count: 0x0102,
            bump: 250,
        };
        let bytes = root.encode();

        assert_eq!(bytes.len(), ROOT_AUTHORITY_LENGTH);
        assert_eq!(
            &bytes[ROOT_AUTHORITY_CONTROLLING_KEY_OFFSET..ROLE_COUNT_OFFSET],
            &[7u8; 32]
        );
        assert_eq!(&bytes[ROLE_COUNT_OFFSET..PERMISSION_COUNT_OFFSET], &3u64.to_le_bytes());
        assert_eq!(&bytes[PERMISSION_COUNT_OFFSET..BUMP_OFFSET], &[2, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[BUMP_OFFSET], 250);
        assert_eq!(RootAuthority::decode(&bytes), Ok(root));
    }
}
