//! Byte-exact record layouts.
//!
//! Every record starts with an 8 byte discriminator naming its kind, followed
//! by its fields in declaration order (integers little-endian, text as a u32
//! LE length and UTF-8 bytes) and ends with the bump its address was derived
//! with. Offsets of the fields that bulk queries filter on are exported.

use rolegate_common::{ADDRESS_SIZE, Address};
use sha2::{Digest, Sha256};

use crate::RbacError;

mod root_authority;
pub use root_authority::*;

mod role;
pub use role::*;

mod permission;
pub use permission::*;

mod role_permission;
pub use role_permission::*;

mod user_role;
pub use user_role::*;

/// Width of the leading kind discriminator.
pub const DISCRIMINATOR_LENGTH: usize = 8;

pub(crate) const ADDRESS_LENGTH: usize = ADDRESS_SIZE;
pub(crate) const U64_LENGTH: usize = 8;
pub(crate) const I64_LENGTH: usize = 8;
pub(crate) const TEXT_LENGTH_PREFIX: usize = 4;
pub(crate) const BUMP_LENGTH: usize = 1;

/// The five kinds of record the program keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// [`RootAuthority`]
    RootAuthority,
    /// [`Role`]
    Role,
    /// [`Permission`]
    Permission,
    /// [`RolePermission`]
    RolePermission,
    /// [`UserRole`]
    UserRole,
}

impl RecordKind {
    /// The record name the discriminator is computed from.
    pub fn name(self) -> &'static str {
        match self {
            RecordKind::RootAuthority => "RootAuthority",
            RecordKind::Role => "Role",
            RecordKind::Permission => "Permission",
            RecordKind::RolePermission => "RolePermission",
            RecordKind::UserRole => "UserRole",
        }
    }

    /// The leading bytes of SHA-256 over `account:<name>`.
    pub fn discriminator(self) -> [u8; DISCRIMINATOR_LENGTH] {
        let digest = Sha256::digest(format!("account:{}", self.name()));
        let mut discriminator = [0u8; DISCRIMINATOR_LENGTH];
        discriminator.copy_from_slice(&digest[..DISCRIMINATOR_LENGTH]);
        discriminator
    }

    /// The kind of record `bytes` claims to be, if any.
    pub fn of(bytes: &[u8]) -> Option<Self> {
        let discriminator = bytes.get(..DISCRIMINATOR_LENGTH)?;
        [
            RecordKind::RootAuthority,
            RecordKind::Role,
            RecordKind::Permission,
            RecordKind::RolePermission,
            RecordKind::UserRole,
        ]
        .into_iter()
        .find(|kind| kind.discriminator() == discriminator)
    }
}

/// A record type with a fixed byte layout.
pub trait Record: Sized {
    /// Which kind of record this is.
    const KIND: RecordKind;

    /// Appends the fields (everything after the discriminator).
    fn write_fields(&self, writer: &mut RecordWriter);

    /// Reads the fields back in the same order.
    fn read_fields(reader: &mut RecordReader<'_>) -> Result<Self, RbacError>;

    /// The full record bytes.
    fn encode(&self) -> Vec<u8> {
        let mut writer = RecordWriter::new(Self::KIND);
        self.write_fields(&mut writer);
        writer.finish()
    }

    /// Parses a full record, checking kind and exact length.
    fn decode(bytes: &[u8]) -> Result<Self, RbacError> {
        let mut reader = RecordReader::new(Self::KIND, bytes)?;
        let record = Self::read_fields(&mut reader)?;
        reader.finish()?;
        Ok(record)
    }
}

/// Builds record bytes field by field.
pub struct RecordWriter {
    buffer: Vec<u8>,
}

impl RecordWriter {
    fn new(kind: RecordKind) -> Self {
        Self {
            buffer: kind.discriminator().to_vec(),
        }
    }

    /// An address field.
    pub fn address(&mut self, address: &Address) {
        self.buffer.extend_from_slice(address.as_ref());
    }

    /// A u64 field.
    pub fn u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// An i64 field.
    pub fn i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// A length-prefixed text field.
    ///
    /// Names are bounded well below `u32::MAX` before they reach a record.
    pub fn text(&mut self, value: &str) {
        self.buffer
            .extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.buffer.extend_from_slice(value.as_bytes());
    }

    /// A single byte field.
    pub fn u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    fn finish(self) -> Vec<u8> {
        self.buffer
    }
}

/// Reads record fields in order. Every shortfall is reported as
/// [`RbacError::AccountDidNotDeserialize`].
pub struct RecordReader<'a> {
    remaining: &'a [u8],
}

impl<'a> RecordReader<'a> {
    fn new(kind: RecordKind, bytes: &'a [u8]) -> Result<Self, RbacError> {
        if bytes.len() < DISCRIMINATOR_LENGTH {
            return Err(RbacError::AccountDidNotDeserialize);
        }
        let (discriminator, remaining) = bytes.split_at(DISCRIMINATOR_LENGTH);
        if discriminator != kind.discriminator() {
            return Err(RbacError::AccountDiscriminatorMismatch);
        }
        Ok(Self { remaining })
    }

    fn take(&mut self, length: usize) -> Result<&'a [u8], RbacError> {
        if self.remaining.len() < length {
            return Err(RbacError::AccountDidNotDeserialize);
        }
        let (head, tail) = self.remaining.split_at(length);
        self.remaining = tail;
        Ok(head)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], RbacError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    /// An address field.
    pub fn address(&mut self) -> Result<Address, RbacError> {
        Ok(Address::from(self.take_array::<ADDRESS_LENGTH>()?))
    }

    /// A u64 field.
    pub fn u64(&mut self) -> Result<u64, RbacError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    /// An i64 field.
    pub fn i64(&mut self) -> Result<i64, RbacError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    /// A length-prefixed UTF-8 text field.
    pub fn text(&mut self) -> Result<String, RbacError> {
        let length = u32::from_le_bytes(self.take_array()?) as usize;
        let bytes = self.take(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| RbacError::AccountDidNotDeserialize)
    }

    /// A single byte field.
    pub fn u8(&mut self) -> Result<u8, RbacError> {
        Ok(self.take(1)?[0])
    }

    fn finish(self) -> Result<(), RbacError> {
        if self.remaining.is_empty() {
            Ok(())
        } else {
            Err(RbacError::AccountDidNotDeserialize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_gives_every_kind_a_distinct_discriminator() {
        let kinds = [
            RecordKind::RootAuthority,
            RecordKind::Role,
            RecordKind::Permission,
            RecordKind::RolePermission,
            RecordKind::UserRole,
        ];
        for kind in kinds {
            let tagged = kind.discriminator();
            assert_eq!(RecordKind::of(&tagged), Some(kind));
        }
        assert_eq!(RecordKind::of(&[0u8; 4]), None);
    }

    #[test]
    fn it_matches_the_well_known_discriminator() {
        let digest = Sha256::digest(b"account:RootAuthority");
        assert_eq!(&RecordKind::RootAuthority.discriminator()[..], &digest[..8]);
    }

    #[test]
    fn it_refuses_to_read_one_kind_as_another() {
        let role = Role {
            owner_root: Address::from([1u8; 32]),
            name: "admin".into(),
            bump: 254,
        };

        assert_eq!(
            Permission::decode(&role.encode()),
            Err(RbacError::AccountDiscriminatorMismatch)
        );
    }

    #[test]
    fn it_refuses_truncated_and_padded_records() {
        let role = Role {
            owner_root: Address::from([1u8; 32]),
            name: "admin".into(),
            bump: 254,
        };
        let bytes = role.encode();

        assert_eq!(
            Role::decode(&bytes[..bytes.len() - 1]),
            Err(RbacError::AccountDidNotDeserialize)
        );

        let mut padded = bytes.clone();
        padded.push(0);
        assert_eq!(Role::decode(&padded), Err(RbacError::AccountDidNotDeserialize));
    }

    #[test]
    fn it_refuses_names_that_are_not_utf8() {
        let mut bytes = RecordKind::Role.discriminator().to_vec();
        bytes.extend_from_slice(&[1u8; 32]);
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.push(255);

        assert_eq!(Role::decode(&bytes), Err(RbacError::AccountDidNotDeserialize));
    }
}
