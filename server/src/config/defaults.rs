//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

/// (key, default, required, description)
type DefTuple = (&'static str, &'static str, bool, &'static str);

const DEFS: &[DefTuple] = &[
    ("SERVER_PORT", "3000", true, "HTTP listen port"),
    (
        "COMBO_VALUE_THRESHOLD",
        "99",
        false,
        "Gifts worth more coins than this wait for combo upgrades",
    ),
    (
        "COMBO_DELAY_MS",
        "5000",
        false,
        "How long a high-value gift waits before it is allocated",
    ),
    (
        "DEDUPE_WINDOW_MS",
        "5000",
        false,
        "Identical notifications inside this window are dropped",
    ),
    (
        "COMBO_LIFETIME_MS",
        "30000",
        false,
        "Idle time after which a combo starts over",
    ),
    (
        "TARGET_GIFT",
        "",
        false,
        "Only this gift id or name earns entries (empty accepts all)",
    ),
    ("SPIN_DURATION_MS", "4000", false, "Wheel spin animation length"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, required, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    required,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
