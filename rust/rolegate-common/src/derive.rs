//! Deterministic record addressing.
//!
//! Every record in a rolegate store lives at an address computed from a kind
//! tag, the addresses of its parents and (for roles and permissions) its name.
//! Two calls that derive the same address are by construction talking about
//! the same logical record, so uniqueness needs no coordinator and no index.
//!
//! A derived address is the BLAKE3 hash of the seeds, a one-byte "bump", the
//! program id and a fixed marker. Candidates that happen to be valid Ed25519
//! points are rejected, so a derived address can never double as somebody's
//! public key. [`derive_address`] walks the bump down from 255 and returns the
//! first viable candidate together with its bump.

use thiserror::Error;

use crate::{ADDRESS_SIZE, Address};

/// Longest permitted single seed, in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Largest permitted number of seeds, counting the bump.
pub const MAX_SEEDS: usize = 16;

const DERIVED_ADDRESS_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Errors produced while deriving an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DerivationError {
    /// One of the seeds is longer than [`MAX_SEED_LEN`].
    #[error("seed {index} is {length} bytes long, the maximum is {MAX_SEED_LEN}")]
    MaxSeedLengthExceeded {
        /// Position of the offending seed
        index: usize,
        /// Its length in bytes
        length: usize,
    },

    /// More than [`MAX_SEEDS`] seeds were supplied.
    #[error("{0} seeds supplied, the maximum is {MAX_SEEDS}")]
    TooManySeeds(usize),

    /// The candidate address is a valid Ed25519 point.
    #[error("derived address lies on the ed25519 curve")]
    OnCurve,

    /// No bump in `0..=255` produced an off-curve address.
    #[error("unable to find a viable bump for the supplied seeds")]
    NoViableBump,
}

/// Returns true when `bytes` decompress to a point on the Ed25519 curve, i.e.
/// when they could be a public key.
pub fn is_on_curve(bytes: &[u8; ADDRESS_SIZE]) -> bool {
    ed25519_dalek::VerifyingKey::from_bytes(bytes).is_ok()
}

/// Computes the address for `seeds` (which must already include the bump
/// byte, if any) under `program_id`.
///
/// Fails with [`DerivationError::OnCurve`] when the result is a valid public
/// key.
pub fn create_address(program_id: &Address, seeds: &[&[u8]]) -> Result<Address, DerivationError> {
    if seeds.len() > MAX_SEEDS {
        return Err(DerivationError::TooManySeeds(seeds.len()));
    }

    let mut hasher = blake3::Hasher::new();
    for (index, seed) in seeds.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(DerivationError::MaxSeedLengthExceeded {
                index,
                length: seed.len(),
            });
        }
        hasher.update(seed);
    }
    hasher.update(program_id.as_ref());
    hasher.update(DERIVED_ADDRESS_MARKER);

    let candidate: [u8; ADDRESS_SIZE] = hasher.finalize().into();

    if is_on_curve(&candidate) {
        return Err(DerivationError::OnCurve);
    }

    Ok(Address::from(candidate))
}

/// Finds the canonical address for `seeds` under `program_id`, returning it
/// together with the bump that produced it.
///
/// The bump search starts at 255 and counts down; the first off-curve
/// candidate wins. The function is pure: the same inputs always yield the
/// same `(address, bump)`.
pub fn derive_address(
    program_id: &Address,
    seeds: &[&[u8]],
) -> Result<(Address, u8), DerivationError> {
    if seeds.len() + 1 > MAX_SEEDS {
        return Err(DerivationError::TooManySeeds(seeds.len() + 1));
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);

        match create_address(program_id, &with_bump) {
            Ok(address) => {
                tracing::trace!(%address, bump, "Derived address");
                return Ok((address, bump));
            }
            Err(DerivationError::OnCurve) => continue,
            Err(error) => return Err(error),
        }
    }

    Err(DerivationError::NoViableBump)
}
