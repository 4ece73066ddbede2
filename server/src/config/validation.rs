//! Per-key setting validation.

/// Validate a setting value for the given key.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        "COMBO_VALUE_THRESHOLD" => validate_int_range(value, 0, 1_000_000)?,
        "COMBO_DELAY_MS" => validate_int_range(value, 0, 60_000)?,
        "DEDUPE_WINDOW_MS" => validate_int_range(value, 0, 60_000)?,
        "COMBO_LIFETIME_MS" => validate_int_range(value, 1_000, 600_000)?,
        "SPIN_DURATION_MS" => validate_int_range(value, 500, 30_000)?,
        "TARGET_GIFT" => {
            if value.len() > 128 {
                return Err("must be at most 128 characters".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.trim().parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
