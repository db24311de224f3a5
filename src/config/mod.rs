//! Configuration loading and management
//!
//! Settings come from the process environment (the variable names are shared
//! with the web form's deployment), from a YAML file, or from both: values in
//! the environment override the file.
//!
//! ```yaml
//! environment: production
//! port: 3000
//! recipient: supplies@example.com
//! smtp:
//!   host: smtp.example.com
//!   port: 465
//!   secure: true
//!   user: orders@example.com
//!   password: hunter2
//! ```

use crate::core::ConfigError;
use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use validator::ValidateEmail;

pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_FROM_NAME: &str = "Metro Supply Orders";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Deployment environment, read from `NODE_ENV`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Whether error responses may carry raw failure details
    pub fn exposes_error_detail(&self) -> bool {
        !self.is_production()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(format!(
                "unknown environment '{}', expected development, production or test",
                other
            )),
        }
    }
}

/// Outgoing mail server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when set, opportunistic STARTTLS otherwise
    pub secure: bool,
    /// Login name, also used as the sender address
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Display name on the From header
    pub from_name: String,
    pub timeout_secs: u64,
}

impl SmtpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `host:port`, as shown in diagnostic emails
    pub fn server(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_SMTP_PORT,
            secure: false,
            user: String::new(),
            password: String::new(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub bind_address: String,
    pub port: u16,
    /// Mailbox that receives every order email
    pub recipient: String,
    pub smtp: SmtpConfig,
    /// Explicit log format; derived from the environment when absent
    pub log_format: Option<LogFormat>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_HTTP_PORT,
            recipient: String::new(),
            smtp: SmtpConfig::default(),
            log_format: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().apply_overrides(lookup)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Load {
            file: None,
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Load {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Apply values set in the process environment on top of this config
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply values found through `lookup`; empty values are ignored
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("NODE_ENV") {
            self.environment = parse("NODE_ENV", &value)?;
        }
        if let Some(value) = get("BIND_ADDRESS") {
            self.bind_address = value;
        }
        if let Some(value) = get("PORT") {
            self.port = parse("PORT", &value)?;
        }
        if let Some(value) = get("RECIPIENT_EMAIL") {
            self.recipient = value;
        }
        if let Some(value) = get("EMAIL_SERVER") {
            self.smtp.host = value;
        }
        if let Some(value) = get("EMAIL_PORT") {
            self.smtp.port = parse("EMAIL_PORT", &value)?;
        }
        if let Some(value) = get("EMAIL_SECURE") {
            self.smtp.secure = value.trim().eq_ignore_ascii_case("true");
        }
        if let Some(value) = get("EMAIL_USER") {
            self.smtp.user = value;
        }
        if let Some(value) = get("EMAIL_PASSWORD") {
            self.smtp.password = value;
        }
        if let Some(value) = get("EMAIL_FROM_NAME") {
            self.smtp.from_name = value;
        }
        if let Some(value) = get("EMAIL_TIMEOUT_SECS") {
            self.smtp.timeout_secs = parse("EMAIL_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("LOG_FORMAT") {
            self.log_format = Some(parse("LOG_FORMAT", &value)?);
        }

        Ok(self)
    }

    /// Check everything needed to deliver order emails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp.host.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "EMAIL_SERVER".to_string(),
            });
        }
        if self.smtp.user.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "EMAIL_USER".to_string(),
            });
        }
        if !self.smtp.user.validate_email() {
            return Err(ConfigError::Invalid {
                key: "EMAIL_USER".to_string(),
                message: format!("'{}' is not an email address", self.smtp.user),
            });
        }
        if self.smtp.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "EMAIL_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        self.validate_recipient()
    }

    /// Check only the recipient address
    ///
    /// Enough for dry runs, where no mail server is contacted.
    pub fn validate_recipient(&self) -> Result<(), ConfigError> {
        if self.recipient.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "RECIPIENT_EMAIL".to_string(),
            });
        }
        if !self.recipient.validate_email() {
            return Err(ConfigError::Invalid {
                key: "RECIPIENT_EMAIL".to_string(),
                message: format!("'{}' is not an email address", self.recipient),
            });
        }
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn socket_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "BIND_ADDRESS".to_string(),
                message: e.to_string(),
            })
    }

    /// Log format to use, JSON in production unless set explicitly
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or(if self.environment.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        })
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        message: format!("'{}': {}", value, e),
    })
}
