use rolegate_common::Address;
use serde::Serialize;

use super::{
    ADDRESS_LENGTH, BUMP_LENGTH, DISCRIMINATOR_LENGTH, Record, RecordKind, RecordReader,
    RecordWriter, TEXT_LENGTH_PREFIX,
};
use crate::RbacError;

/// Offset of [`Role::owner_root`] in the record bytes.
pub const ROLE_OWNER_ROOT_OFFSET: usize = DISCRIMINATOR_LENGTH;
const NAME_OFFSET: usize = ROLE_OWNER_ROOT_OFFSET + ADDRESS_LENGTH;

/// Size of an encoded [`Role`] whose name is `name_length` bytes long.
pub const fn role_length(name_length: usize) -> usize {
    NAME_OFFSET + TEXT_LENGTH_PREFIX + name_length + BUMP_LENGTH
}

/// A named role under one root authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    /// The root authority this role belongs to
    pub owner_root: Address,
    /// Opaque name, unique per root
    pub name: String,
    /// Bump the record's address was derived with
    pub bump: u8,
}

impl Record for Role {
    const KIND: RecordKind = RecordKind::Role;

    fn write_fields(&self, writer: &mut RecordWriter) {
        writer.address(&self.owner_root);
        writer.text(&self.name);
        writer.u8(self.bump);
    }

    fn read_fields(reader: &mut RecordReader<'_>) -> Result<Self, RbacError> {
        Ok(Self {
            owner_root: reader.address()?,
            name: reader.text()?,
            bump: reader.u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_length_prefixes_the_name() {
        let role = Role {
            owner_root: Address::from([4u8; 32]),
            name: "editor".into(),
            bump: 255,
        };
        let bytes = role.encode();

        assert_eq!(bytes.len(), role_length(6));
        assert_eq!(&bytes[NAME_OFFSET..NAME_OFFSET + 4], &6u32.to_le_bytes());
        assert_eq!(&bytes[NAME_OFFSET + 4..NAME_OFFSET + 10], b"editor");
        assert_eq!(Role::decode(&bytes), Ok(role));
    }
}
