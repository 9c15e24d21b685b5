use std::collections::HashMap;

use crate::bandits::BanditModel;
use crate::error::Error;
use crate::ufc::{Flag, UniversalFlagConfig};

/// An immutable, fully precomputed configuration snapshot.
///
/// Built once from a parsed [`UniversalFlagConfig`] payload; every derived index (the
/// flag→bandit association map) is computed at construction time so evaluation never recomputes
/// it.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    flags: HashMap<String, Flag>,
    bandits: HashMap<String, BanditModel>,
    /// flag_key -> (variation_value -> bandit_key)
    flag_to_bandit_associations: HashMap<String, HashMap<String, String>>,
}

impl Configuration {
    /// Parses a configuration payload (as fetched by the caller) and builds a precomputed
    /// snapshot. Individual malformed flags/bandits are dropped (see [`crate::ufc::TryParse`])
    /// rather than failing the whole load; only a structurally invalid top-level payload is an
    /// `Err`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        let ufc: UniversalFlagConfig = serde_json::from_slice(bytes)
            .map_err(|e| Error::ConfigurationParseError(e.to_string()))?;
        Ok(Self::from_parsed(ufc))
    }

    pub fn from_parsed(ufc: UniversalFlagConfig) -> Self {
        let flags = ufc
            .flags
            .into_iter()
            .filter_map(|(key, flag)| flag.ok().map(|f| (key, f)))
            .map(|(key, mut flag)| {
                flag.precompute();
                (key, flag)
            })
            .collect();
        let bandits: HashMap<String, BanditModel> = ufc
            .bandits
            .into_iter()
            .filter_map(|(key, bandit)| bandit.ok().map(|b| (key, b)))
            .collect();

        let mut flag_to_bandit_associations: HashMap<String, HashMap<String, String>> =
            HashMap::new();
        for (bandit_key, variations) in &ufc.bandit_flags {
            for variation in variations {
                flag_to_bandit_associations
                    .entry(variation.flag_key.clone())
                    .or_default()
                    .insert(variation.variation_value.clone(), bandit_key.clone());
            }
        }

        Configuration { flags, bandits, flag_to_bandit_associations }
    }

    pub fn get_flag(&self, key: &str) -> Option<&Flag> {
        self.flags.get(key)
    }

    pub fn get_bandit(&self, key: &str) -> Option<&BanditModel> {
        self.bandits.get(key)
    }

    pub fn get_bandit_key(&self, flag_key: &str, variation_value: &str) -> Option<&str> {
        self.flag_to_bandit_associations
            .get(flag_key)?
            .get(variation_value)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_configuration_has_no_flags() {
        let config = Configuration::default();
        assert!(config.get_flag("anything").is_none());
    }
}
