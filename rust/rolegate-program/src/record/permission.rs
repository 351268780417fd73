use rolegate_common::Address;
use serde::Serialize;

use super::{DISCRIMINATOR_LENGTH, Record, RecordKind, RecordReader, RecordWriter};
use crate::RbacError;

/// Offset of [`Permission::owner_root`] in the record bytes.
pub const PERMISSION_OWNER_ROOT_OFFSET: usize = DISCRIMINATOR_LENGTH;

/// A named permission under one root authority. Shares the [`Role`](super::Role)
/// layout under its own discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    /// The root authority this permission belongs to
    pub owner_root: Address,
    /// Opaque name, unique per root
    pub name: String,
    /// Bump the record's address was derived with
    pub bump: u8,
}

impl Record for Permission {
    const KIND: RecordKind = RecordKind::Permission;

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
