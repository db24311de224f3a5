//! Tests for configuration loading
//!
//! These tests verify that:
//! - YAML files load with defaults for omitted settings
//! - Environment values override file values
//! - Invalid settings are reported with the offending key

use std::collections::HashMap;
use std::io::Write;
use supply::core::ConfigError;
use supply::prelude::*;
use tempfile::NamedTempFile;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

fn yaml_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

// =============================================================================
// YAML Loading
// =============================================================================

mod yaml_tests {
    use super::*;

    #[test]
    fn test_load_full_file() {
        let file = yaml_file(
            r#"
environment: production
bind_address: 127.0.0.1
port: 8080
recipient: supplies@example.com
log_format: pretty
smtp:
  host: smtp.example.com
  port: 465
  secure: true
  user: orders@example.com
  password: hunter2
  from_name: Store Orders
  timeout_secs: 10
"#,
        );

        let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.port, 8080);
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.secure);
        assert_eq!(config.smtp.from_name, "Store Orders");
        assert_eq!(config.log_format(), LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_omitted_settings_use_defaults() {
        let config = AppConfig::from_yaml_str(
            r#"
recipient: supplies@example.com
smtp:
  host: smtp.example.com
"#,
        )
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.timeout_secs, 30);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = AppConfig::from_yaml_file("/nonexistent/supply.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Load { file: Some(_), .. }));
        assert!(err.to_string().contains("/nonexistent/supply.yaml"));
    }

    #[test]
    fn test_malformed_yaml_is_load_error() {
        let err = AppConfig::from_yaml_str("port: [not a port").unwrap_err();
        assert!(matches!(err, ConfigError::Load { file: None, .. }));
    }

    #[test]
    fn test_password_is_not_serialized() {
        let mut config = AppConfig::default();
        config.smtp.password = "hunter2".to_string();

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("hunter2"));
    }
}

// =============================================================================
// Environment Overrides
// =============================================================================

mod override_tests {
    use super::*;

    #[test]
    fn test_environment_overrides_file() {
        let config = AppConfig::from_yaml_str(
            r#"
port: 8080
recipient: file@example.com
smtp:
  host: file.example.com
"#,
        )
        .unwrap()
        .apply_overrides(lookup(&[
            ("EMAIL_SERVER", "env.example.com"),
            ("RECIPIENT_EMAIL", "env@example.com"),
        ]))
        .unwrap();

        assert_eq!(config.smtp.host, "env.example.com");
        assert_eq!(config.recipient, "env@example.com");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_empty_values_do_not_override() {
        let config = AppConfig::from_yaml_str("recipient: file@example.com")
            .unwrap()
            .apply_overrides(lookup(&[("RECIPIENT_EMAIL", "")]))
            .unwrap();
        assert_eq!(config.recipient, "file@example.com");
    }

    #[test]
    fn test_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("EMAIL_SERVER", "smtp.example.com"),
            ("EMAIL_PORT", "2525"),
            ("EMAIL_SECURE", "false"),
            ("EMAIL_USER", "orders@example.com"),
            ("EMAIL_PASSWORD", "secret"),
            ("RECIPIENT_EMAIL", "supplies@example.com"),
            ("PORT", "4000"),
            ("NODE_ENV", "test"),
            ("EMAIL_FROM_NAME", "Orders Bot"),
            ("EMAIL_TIMEOUT_SECS", "5"),
            ("BIND_ADDRESS", "127.0.0.1"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.smtp.server(), "smtp.example.com:2525");
        assert!(!config.smtp.secure);
        assert_eq!(config.smtp.password, "secret");
        assert_eq!(config.port, 4000);
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.smtp.from_name, "Orders Bot");
        assert_eq!(config.smtp.timeout_secs, 5);
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.socket_address().unwrap().to_string(), "127.0.0.1:4000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_environment_is_invalid() {
        let err = AppConfig::from_lookup(lookup(&[("NODE_ENV", "staging")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "NODE_ENV"));
    }
}

// =============================================================================
// Validation
// =============================================================================

mod validation_tests {
    use super::*;

    fn valid() -> AppConfig {
        AppConfig::from_lookup(lookup(&[
            ("EMAIL_SERVER", "smtp.example.com"),
            ("EMAIL_USER", "orders@example.com"),
            ("RECIPIENT_EMAIL", "supplies@example.com"),
        ]))
        .unwrap()
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = valid();
        config.smtp.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref key, .. }) if key == "EMAIL_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn test_malformed_sender_is_invalid() {
        let mut config = valid();
        config.smtp.user = "orders".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref key, .. }) if key == "EMAIL_USER"
        ));
    }

    #[test]
    fn test_dry_run_needs_only_recipient() {
        let config = AppConfig::from_lookup(lookup(&[("RECIPIENT_EMAIL", "supplies@example.com")]))
            .unwrap();
        assert!(config.validate().is_err());
        assert!(config.validate_recipient().is_ok());
    }
}
