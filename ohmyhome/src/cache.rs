use std::collections::BTreeMap;

use ohmyhome_common::{OutOfDomain, Setting, SettingValue};

use crate::Store;

/// Last known value of every setting
///
/// Every setting always has a value, and every value is inside its domain.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingCache {
    values: BTreeMap<Setting, SettingValue>,
}

impl Default for SettingCache {
    fn default() -> Self {
        Self {
            values: Setting::ALL
                .iter()
                .map(|setting| (*setting, setting.default_value()))
                .collect(),
        }
    }
}

impl SettingCache {
    /// Seeds every setting from `store`, falling back to the legacy key and then the default
    pub fn load(store: &impl Store) -> Self {
        let mut cache = Self::default();

        for &setting in Setting::ALL {
            let stored = store.get(setting.key()).or_else(|| {
                let legacy = store.get(setting.legacy_key()?)?;
                tracing::debug!("Reading {setting} from legacy key");
                Some(legacy)
            });

            let Some(raw) = stored else {
                continue;
            };

            match setting.parse_value(&raw) {
                Ok(value) => {
                    cache.values.insert(setting, value);
                }
                Err(e) => {
                    tracing::warn!("Ignoring stored value ({e}), using default {}", setting.default_value());
                }
            }
        }

        cache
    }

    pub fn read(&self, setting: Setting) -> SettingValue {
        self.values
            .get(&setting)
            .copied()
            .unwrap_or_else(|| setting.default_value())
    }

    /// Stores `value` and returns the value it replaced
    pub fn write(&mut self, setting: Setting, value: SettingValue) -> Result<SettingValue, OutOfDomain> {
        setting.validate(&value)?;

        Ok(self
            .values
            .insert(setting, value)
            .unwrap_or_else(|| setting.default_value()))
    }

    /// Every setting with its value, in catalogue order
    pub fn snapshot(&self) -> Vec<(Setting, SettingValue)> {
        Setting::ALL
            .iter()
            .map(|&setting| (setting, self.read(setting)))
            .collect()
    }
}
