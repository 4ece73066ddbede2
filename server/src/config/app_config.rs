//! Runtime application configuration loaded from DB + environment overrides.

use gift_engine::resolver::ResolverConfig;

use super::manager::SettingsManager;

/// Runtime configuration populated from the settings DB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server_port: u16,
    pub combo_value_threshold: u64,
    pub combo_delay_ms: i64,
    pub dedupe_window_ms: i64,
    pub combo_lifetime_ms: i64,
    pub target_gift: String,
    pub spin_duration_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let resolver = ResolverConfig::default();
        Self {
            server_port: 3000,
            combo_value_threshold: resolver.combo_value_threshold,
            combo_delay_ms: resolver.combo_delay_ms,
            dedupe_window_ms: resolver.dedupe_window_ms,
            combo_lifetime_ms: resolver.combo_lifetime_ms,
            target_gift: String::new(),
            spin_duration_ms: 4000,
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings manager (DB-first, env overrides).
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };
        let defaults = Self::default();

        let mut server_port = parse_or(&g("SERVER_PORT"), defaults.server_port);

        // Hosting platforms usually hand the port over as PORT.
        for var in ["SERVER_PORT", "PORT"] {
            if let Ok(v) = std::env::var(var) {
                if let Ok(p) = v.trim().parse::<u16>() {
                    server_port = p;
                }
            }
        }

        Ok(Self {
            server_port,
            combo_value_threshold: parse_or(&g("COMBO_VALUE_THRESHOLD"), defaults.combo_value_threshold),
            combo_delay_ms: parse_or(&g("COMBO_DELAY_MS"), defaults.combo_delay_ms),
            dedupe_window_ms: parse_or(&g("DEDUPE_WINDOW_MS"), defaults.dedupe_window_ms),
            combo_lifetime_ms: parse_or(&g("COMBO_LIFETIME_MS"), defaults.combo_lifetime_ms),
            target_gift: g("TARGET_GIFT").trim().to_string(),
            spin_duration_ms: parse_or(&g("SPIN_DURATION_MS"), defaults.spin_duration_ms),
        })
    }

    /// Reload config from the settings manager.
    pub fn reload(&mut self, sm: &SettingsManager) -> Result<(), anyhow::Error> {
        *self = Self::load(sm)?;
        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            dedupe_window_ms: self.dedupe_window_ms,
            combo_lifetime_ms: self.combo_lifetime_ms,
            combo_delay_ms: self.combo_delay_ms,
            combo_value_threshold: self.combo_value_threshold,
        }
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    let s = s.trim();
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheel_db::Database;

    #[test]
    fn load_reads_tuning_from_db() {
        let sm = SettingsManager::new(Database::open_in_memory().unwrap());
        sm.set_setting("COMBO_DELAY_MS", "1200").unwrap();
        sm.set_setting("COMBO_VALUE_THRESHOLD", "10").unwrap();
        sm.set_setting("TARGET_GIFT", " Rose ").unwrap();

        let config = AppConfig::load(&sm).unwrap();
        assert_eq!(config.combo_delay_ms, 1200);
        assert_eq!(config.target_gift, "Rose");

        let resolver = config.resolver_config();
        assert_eq!(resolver.combo_value_threshold, 10);
        assert_eq!(resolver.combo_delay_ms, 1200);
        assert_eq!(resolver.combo_lifetime_ms, 30_000);
    }

    #[test]
    fn parse_or_falls_back() {
        assert_eq!(parse_or("", 7u64), 7);
        assert_eq!(parse_or("x", 7u64), 7);
        assert_eq!(parse_or(" 9 ", 7u64), 9);
    }
}
