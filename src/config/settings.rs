//! `settings show` / `settings set`: dotted keys over the config file.

use std::fmt;

use super::init::{parse_rounding, parse_theme};
use super::Config;
use crate::scoring::validate_scoring;

/// Keys accepted by `settings set`.
pub const KEYS: [&str; 10] = [
    "store.owner",
    "store.repo",
    "store.branch",
    "store.path",
    "store.proxy_url",
    "store.api_url",
    "scoring.pivot_fraction",
    "scoring.top_multiplier",
    "scoring.rounding",
    "theme",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingError {
    #[error("Unknown setting '{0}'. Known settings: {known}", known = KEYS.join(", "))]
    UnknownKey(String),
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

fn invalid(key: &str, reason: impl fmt::Display) -> SettingError {
    SettingError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Blank or "none" clears an optional value.
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

fn required(key: &str, value: &str) -> Result<String, SettingError> {
    optional(value).ok_or_else(|| invalid(key, "cannot be empty"))
}

fn number(key: &str, value: &str) -> Result<f64, SettingError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(key, format!("'{}' is not a number", value.trim())))
}

/// Apply one `key = value` change. Scoring changes are validated against
/// the rest of the scoring section; on error `config` is left untouched.
pub fn set_value(config: &mut Config, key: &str, value: &str) -> Result<(), SettingError> {
    let mut next = config.clone();
    match key {
        "store.owner" => next.store.owner = required(key, value)?,
        "store.repo" => next.store.repo = required(key, value)?,
        "store.branch" => next.store.branch = required(key, value)?,
        "store.path" => next.store.path = required(key, value)?,
        "store.proxy_url" => next.store.proxy_url = optional(value),
        "store.api_url" => next.store.api_url = optional(value),
        "scoring.pivot_fraction" | "scoring.top_multiplier" | "scoring.rounding" => {
            let mut scoring = next.scoring();
            match key {
                "scoring.pivot_fraction" => scoring.pivot_fraction = Some(number(key, value)?),
                "scoring.top_multiplier" => scoring.top_multiplier = Some(number(key, value)?),
                _ => {
                    scoring.rounding = Some(
                        parse_rounding(value.trim())
                            .ok_or_else(|| invalid(key, "expected nearest, floor or ceil"))?,
                    )
                }
            }
            validate_scoring(&scoring).map_err(|errors| invalid(key, errors.join("; ")))?;
            next.scoring = Some(scoring);
        }
        "theme" => {
            next.theme = parse_theme(value.trim())
                .ok_or_else(|| invalid(key, "expected auto, dark or light"))?
        }
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    }
    *config = next;
    Ok(())
}

/// Every setting with its effective value, defaults filled in.
pub fn describe(config: &Config) -> Vec<(&'static str, String)> {
    let scoring = config.scoring();
    let unset = || "(not set)".to_string();
    vec![
        ("store.owner", config.store.owner.clone()),
        ("store.repo", config.store.repo.clone()),
        ("store.branch", config.store.branch.clone()),
        ("store.path", config.store.path.clone()),
        (
            "store.proxy_url",
            config.store.proxy_url.clone().unwrap_or_else(unset),
        ),
        (
            "store.api_url",
            config.store.api_url.clone().unwrap_or_else(unset),
        ),
        (
            "scoring.pivot_fraction",
            scoring.pivot_fraction().to_string(),
        ),
        (
            "scoring.top_multiplier",
            scoring.top_multiplier().to_string(),
        ),
        (
            "scoring.rounding",
            format!("{:?}", scoring.rounding()).to_lowercase(),
        ),
        ("theme", format!("{:?}", config.theme).to_lowercase()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeMode;
    use crate::scoring::Rounding;

    #[test]
    fn test_set_store_fields() {
        let mut config = Config::default();
        set_value(&mut config, "store.owner", " alice ").unwrap();
        set_value(&mut config, "store.proxy_url", "https://proxy.example").unwrap();
        assert_eq!(config.store.owner, "alice");
        assert_eq!(
            config.store.proxy_url.as_deref(),
            Some("https://proxy.example")
        );

        set_value(&mut config, "store.proxy_url", "none").unwrap();
        assert_eq!(config.store.proxy_url, None);
    }

    #[test]
    fn test_required_field_rejects_blank() {
        let mut config = Config::default();
        let err = set_value(&mut config, "store.repo", "  ").unwrap_err();
        assert!(matches!(err, SettingError::InvalidValue { .. }));
        assert_eq!(config.store.repo, "coasterbook-data");
    }

    #[test]
    fn test_scoring_values_are_validated() {
        let mut config = Config::default();
        set_value(&mut config, "scoring.top_multiplier", "4").unwrap();
        set_value(&mut config, "scoring.rounding", "floor").unwrap();
        let scoring = config.scoring();
        assert_eq!(scoring.top_multiplier, Some(4.0));
        assert_eq!(scoring.rounding, Some(Rounding::Floor));

        let before = config.clone();
        assert!(set_value(&mut config, "scoring.pivot_fraction", "1.5").is_err());
        assert!(set_value(&mut config, "scoring.pivot_fraction", "half").is_err());
        assert_eq!(config, before);
    }

    #[test]
    fn test_theme_and_unknown_key() {
        let mut config = Config::default();
        set_value(&mut config, "theme", "Light").unwrap();
        assert_eq!(config.theme, ThemeMode::Light);

        let err = set_value(&mut config, "colour", "red").unwrap_err();
        assert!(err.to_string().starts_with("Unknown setting 'colour'"));
        assert!(err.to_string().contains("Known settings: store.owner, "));
    }

    #[test]
    fn test_describe_fills_defaults() {
        let lines = describe(&Config::default());
        assert_eq!(lines.len(), KEYS.len());
        assert!(lines.contains(&("scoring.top_multiplier", "8".to_string())));
        assert!(lines.contains(&("theme", "auto".to_string())));
        assert!(lines.contains(&("store.proxy_url", "(not set)".to_string())));
    }
}
