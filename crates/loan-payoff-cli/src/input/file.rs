use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the section holding loan settings in an application settings file.
const LOAN_SETTINGS_SECTION: &str = "LoanSettings";

/// Read a JSON or YAML settings file and deserialise into a typed struct.
///
/// YAML is chosen by a `.yaml`/`.yml` extension; anything else is parsed as
/// JSON. A top-level `LoanSettings` section is unwrapped when present.
pub fn read_settings<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value = parse_settings(&contents, is_yaml(&canonical))
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    log::info!("loaded loan settings from {}", canonical.display());
    let settings: T = serde_json::from_value(loan_settings_section(value))
        .map_err(|e| format!("Invalid settings in '{}': {}", canonical.display(), e))?;
    Ok(settings)
}

/// Parse settings text into a generic JSON value.
pub fn parse_settings(contents: &str, yaml: bool) -> Result<Value, Box<dyn std::error::Error>> {
    let value = if yaml {
        serde_yaml::from_str(contents)?
    } else {
        serde_json::from_str(contents)?
    };
    Ok(value)
}

/// Unwrap `{"LoanSettings": {...}}` to its inner object; other shapes pass through.
pub fn loan_settings_section(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key(LOAN_SETTINGS_SECTION) => map
            .remove(LOAN_SETTINGS_SECTION)
            .unwrap_or(Value::Null),
        other => other,
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_payoff_core::report::LoanPayoffInput;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unwraps_loan_settings_section() {
        let json = r#"{
            "LoanSettings": {
                "InitialLoan": 70000,
                "Payment": 500,
                "YearsPaid": 23,
                "RemainingLoan": 60000
            }
        }"#;
        let value = loan_settings_section(parse_settings(json, false).unwrap());
        let input: LoanPayoffInput = serde_json::from_value(value).unwrap();
        assert_eq!(input.initial_loan, dec!(70000));
        assert_eq!(input.years_paid, 23);
        assert!(input.payment_range.is_none());
    }

    #[test]
    fn test_yaml_flat_settings() {
        let yaml = "initial_loan: 70000\npayment: 500\nyears_paid: 23\nremaining_loan: 60000\npayment_range:\n  start: 400\n  end: 1000\n  step: 50\n";
        let value = loan_settings_section(parse_settings(yaml, true).unwrap());
        let input: LoanPayoffInput = serde_json::from_value(value).unwrap();
        assert_eq!(input.remaining_loan, dec!(60000));
        let range = input.payment_range.unwrap();
        assert_eq!(range.step, dec!(50));
    }

    #[test]
    fn test_flat_json_passes_through() {
        let value = serde_json::json!({"initial_loan": 1});
        assert_eq!(loan_settings_section(value.clone()), value);
    }

    #[test]
    fn test_yaml_extension_detection() {
        assert!(is_yaml(Path::new("settings.yaml")));
        assert!(is_yaml(Path::new("settings.yml")));
        assert!(!is_yaml(Path::new("appsettings.json")));
    }
}
