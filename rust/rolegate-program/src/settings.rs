use rolegate_common::{Address, MAX_SEED_LEN};
use serde::{Deserialize, Serialize};

use crate::SettingsError;

/// The program id used when none is configured.
pub fn default_program_id() -> Address {
    Address::from(*blake3::hash(b"rolegate").as_bytes())
}

/// Tunables for an [`Engine`](crate::Engine).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineSettings {
    /// Namespace for every derived address. Tenants under different program
    /// ids never see each other's records.
    pub program_id: Address,

    /// Longest role or permission name accepted, in bytes.
    pub max_name_length: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program_id: default_program_id(),
            max_name_length: MAX_SEED_LEN,
        }
    }
}

impl EngineSettings {
    /// Settings with the default name limit under `program_id`.
    pub fn with_program_id(program_id: Address) -> Self {
        Self {
            program_id,
            ..Self::default()
        }
    }

    /// Rejects settings the engine cannot honor.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_name_length > MAX_SEED_LEN {
            return Err(SettingsError::NameLengthTooLarge(self.max_name_length));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_fills_missing_fields_with_defaults() -> anyhow::Result<()> {
        let settings: EngineSettings = serde_json::from_str(r#"{ "max_name_length": 8 }"#)?;

        assert_eq!(settings.program_id, default_program_id());
        assert_eq!(settings.max_name_length, 8);
        settings.validate()?;

        Ok(())
    }

    #[test]
    fn it_rejects_names_longer_than_a_seed() {
        let settings = EngineSettings {
            max_name_length: 33,
            ..EngineSettings::default()
        };

        assert_eq!(
            settings.validate(),
            Err(SettingsError::NameLengthTooLarge(33))
        );
    }
}
