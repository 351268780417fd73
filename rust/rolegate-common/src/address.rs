use std::{fmt, str::FromStr};

use base58::{FromBase58, ToBase58};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// The size of an [`Address`] in bytes.
pub const ADDRESS_SIZE: usize = 32;

/// A 32-byte record or key address.
///
/// Addresses name two kinds of things: Ed25519 public keys (tenants' controlling
/// keys and users), and records in the store, whose addresses are produced by
/// the [address deriver](crate::derive_address). The deriver guarantees the
/// two sets never overlap.
///
/// Addresses display, parse and serialize as base58 text.
///
/// ```rust
/// use rolegate_common::Address;
///
/// let address = Address::from([7u8; 32]);
/// let parsed: Address = address.to_string().parse().unwrap();
/// assert_eq!(address, parsed);
/// ```
#[derive(
    FromBytes,
    IntoBytes,
    Immutable,
    KnownLayout,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[repr(transparent)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// The raw bytes of this address.
    pub fn bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(value: [u8; ADDRESS_SIZE]) -> Self {
        Address(value)
    }
}

impl From<Address> for [u8; ADDRESS_SIZE] {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl From<ed25519_dalek::VerifyingKey> for Address {
    fn from(value: ed25519_dalek::VerifyingKey) -> Self {
        Address(value.to_bytes())
    }
}

impl From<&ed25519_dalek::SigningKey> for Address {
    fn from(value: &ed25519_dalek::SigningKey) -> Self {
        Address(value.verifying_key().to_bytes())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = AddressParseError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::read_from_bytes(value).map_err(|_| AddressParseError::InvalidLength(value.len()))
    }
}

impl TryFrom<Vec<u8>> for Address {
    type Error = AddressParseError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Address::try_from(value.as_slice())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0.to_base58())
    }
}

/// Errors produced when parsing an [`Address`] from text or bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// The text is not valid base58.
    #[error("invalid base58 encoding")]
    InvalidBase58,

    /// The decoded value is not exactly 32 bytes.
    #[error("expected {ADDRESS_SIZE} address bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s
            .from_base58()
            .map_err(|_| AddressParseError::InvalidBase58)?;
        Address::try_from(bytes.as_slice())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AddressVisitor;

        impl serde::de::Visitor<'_> for AddressVisitor {
            type Value = Address;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a base58 encoded 32-byte address")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(AddressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_rejects_text_of_the_wrong_length() {
        let short = [1u8; 8].to_base58();
        assert_eq!(
            short.parse::<Address>(),
            Err(AddressParseError::InvalidLength(8))
        );
        assert_eq!(
            "0OIl".parse::<Address>(),
            Err(AddressParseError::InvalidBase58)
        );
    }

    #[test]
    fn it_serializes_as_base58_text() -> anyhow::Result<()> {
        let address = Address::from([42u8; ADDRESS_SIZE]);
        let json = serde_json::to_string(&address)?;

        assert_eq!(json, format!("\"{address}\""));
        assert_eq!(serde_json::from_str::<Address>(&json)?, address);

        Ok(())
    }
}
