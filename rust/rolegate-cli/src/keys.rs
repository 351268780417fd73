//! Key files: a base58 encoded 32 byte Ed25519 seed on one line.

use std::path::Path;

use anyhow::{Context, Result, bail};
use base58::{FromBase58, ToBase58};
use ed25519_dalek::{SECRET_KEY_LENGTH, SigningKey};

/// A new key from the operating system's randomness.
pub fn generate() -> Result<SigningKey> {
    let mut seed = [0u8; SECRET_KEY_LENGTH];
    getrandom::getrandom(&mut seed).context("Unable to gather randomness for a new key")?;
    Ok(SigningKey::from_bytes(&seed))
}

/// Writes `key` to `path`, refusing to replace an existing file unless
/// `overwrite` is set.
pub async fn write(path: &Path, key: &SigningKey, overwrite: bool) -> Result<()> {
    if !overwrite && tokio::fs::try_exists(path).await? {
        bail!("{} already exists", path.display());
    }

    let encoded = format!("{}\n", key.to_bytes().to_base58());
    tokio::fs::write(path, encoded)
        .await
        .with_context(|| format!("Unable to write key to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }

    Ok(())
}

/// Reads a key written by [`write`].
pub async fn read(path: &Path) -> Result<SigningKey> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Unable to read key from {}", path.display()))?;
    let bytes = text
        .trim()
        .from_base58()
        .map_err(|_| anyhow::anyhow!("{} is not base58", path.display()))?;
    let seed: [u8; SECRET_KEY_LENGTH] = bytes.try_into().map_err(|bytes: Vec<u8>| {
        anyhow::anyhow!(
            "{} holds {} bytes, expected {SECRET_KEY_LENGTH}",
            path.display(),
            bytes.len()
        )
    })?;

    Ok(SigningKey::from_bytes(&seed))
}

#[cfg(test)]
mod tests {
    use rolegate_common::Address;

    use super::*;

    #[tokio::test]
    async fn it_reads_back_the_key_it_wrote() -> Result<()> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("owner.key");
        let key = generate()?;

        write(&path, &key, false).await?;

        assert_eq!(Address::from(&read(&path).await?), Address::from(&key));
        Ok(())
    }

    #[tokio::test]
    async fn it_does_not_clobber_an_existing_key() -> Result<()> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("owner.key");
        let original = generate()?;
        write(&path, &original, false).await?;

        assert!(write(&path, &generate()?, false).await.is_err());
        assert_eq!(read(&path).await?.to_bytes(), original.to_bytes());

        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_a_short_seed() -> Result<()> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("short.key");
        tokio::fs::write(&path, [1u8; 8].to_base58()).await?;

        assert!(read(&path).await.is_err());
        Ok(())
    }
}
