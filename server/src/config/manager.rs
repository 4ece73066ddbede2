//! SettingsManager: DB-backed settings with defaults and env migration.

use std::collections::HashMap;

use wheel_db::Database;

use super::SettingInfo;
use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(def) = DEFAULT_SETTINGS.get(key) {
            return Ok(def.default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Set a setting value with validation.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        if !DEFAULT_SETTINGS.contains_key(key) {
            anyhow::bail!("unknown setting key: {key}");
        }
        validate_setting(key, value).map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;
        self.db.set_setting(key, value)?;
        Ok(())
    }

    /// Validate every entry first, then write them together.
    pub fn set_settings(&self, settings: &HashMap<String, String>) -> Result<(), anyhow::Error> {
        for (key, value) in settings {
            if !DEFAULT_SETTINGS.contains_key(key.as_str()) {
                anyhow::bail!("unknown setting key: {key}");
            }
            validate_setting(key, value).map_err(|e| anyhow::anyhow!("{key}: {e}"))?;
        }
        self.db.update_settings_bulk(settings)?;
        Ok(())
    }

    /// Get all settings, filling in defaults for missing keys.
    pub fn get_all_settings(&self) -> Result<HashMap<String, SettingInfo>, anyhow::Error> {
        let db_settings = self.db.get_all_settings()?;

        let result = DEFAULT_SETTINGS
            .values()
            .map(|def| {
                let value = db_settings
                    .get(def.key)
                    .cloned()
                    .unwrap_or_else(|| def.default.to_string());
                (
                    def.key.to_string(),
                    SettingInfo {
                        key: def.key.to_string(),
                        has_value: !value.is_empty(),
                        value,
                        required: def.required,
                        description: def.description.to_string(),
                    },
                )
            })
            .collect();

        Ok(result)
    }

    /// Initialize default settings in DB (skip existing).
    pub fn initialize_defaults(&self) -> Result<(), anyhow::Error> {
        for (key, def) in DEFAULT_SETTINGS.iter() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            self.db.set_setting(key, def.default)?;
        }
        Ok(())
    }

    /// Copy settings from environment variables into the DB (one-time).
    pub fn migrate_from_env(&self) -> Result<u32, anyhow::Error> {
        let mut migrated = 0u32;
        for key in DEFAULT_SETTINGS.keys() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            let Ok(env_val) = std::env::var(key) else {
                continue;
            };
            if env_val.is_empty() {
                continue;
            }
            if let Err(e) = validate_setting(key, &env_val) {
                tracing::warn!("Ignoring invalid env setting {key}: {e}");
                continue;
            }
            self.db.set_setting(key, &env_val)?;
            tracing::info!("Migrated setting from env: {key}");
            migrated += 1;
        }
        if migrated > 0 {
            tracing::info!("Migration completed: {migrated} settings migrated");
        }
        Ok(migrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SettingsManager {
        SettingsManager::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn defaults_are_returned_before_initialization() {
        let sm = manager();
        assert_eq!(sm.get_setting("COMBO_VALUE_THRESHOLD").unwrap(), "99");
        assert!(sm.get_setting("UNKNOWN").is_err());
    }

    #[test]
    fn set_setting_validates() {
        let sm = manager();
        sm.set_setting("COMBO_DELAY_MS", "2500").unwrap();
        assert_eq!(sm.get_setting("COMBO_DELAY_MS").unwrap(), "2500");

        assert!(sm.set_setting("COMBO_DELAY_MS", "soon").is_err());
        assert!(sm.set_setting("NOT_A_SETTING", "1").is_err());
        assert_eq!(sm.get_setting("COMBO_DELAY_MS").unwrap(), "2500");
    }

    #[test]
    fn bulk_update_is_all_or_nothing() {
        let sm = manager();
        let mut batch = HashMap::new();
        batch.insert("TARGET_GIFT".to_string(), "Rose".to_string());
        batch.insert("SPIN_DURATION_MS".to_string(), "1".to_string());

        assert!(sm.set_settings(&batch).is_err());
        assert_eq!(sm.get_setting("TARGET_GIFT").unwrap(), "");

        batch.insert("SPIN_DURATION_MS".to_string(), "6000".to_string());
        sm.set_settings(&batch).unwrap();
        assert_eq!(sm.get_setting("TARGET_GIFT").unwrap(), "Rose");
        assert_eq!(sm.get_setting("SPIN_DURATION_MS").unwrap(), "6000");
    }

    #[test]
    fn get_all_settings_fills_defaults() {
        let sm = manager();
        sm.initialize_defaults().unwrap();
        sm.set_setting("TARGET_GIFT", "Galaxy").unwrap();

        let all = sm.get_all_settings().unwrap();
        assert_eq!(all.len(), DEFAULT_SETTINGS.len());
        assert_eq!(all["TARGET_GIFT"].value, "Galaxy");
        assert!(all["TARGET_GIFT"].has_value);
        assert_eq!(all["SERVER_PORT"].value, "3000");
        assert!(all["SERVER_PORT"].required);
    }
}
