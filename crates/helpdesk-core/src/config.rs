//! Portal configuration read from environment variables.
//!
//! | key                             | default              |
//! |---------------------------------|----------------------|
//! | `APP_NAME`                      | `Ticketing System`   |
//! | `EMAIL_HOST`                    | `localhost`          |
//! | `EMAIL_PORT`                    | `587`                |
//! | `EMAIL_FROM`                    | `support@localhost`  |
//! | `EMAIL_USER`                    | unset                |
//! | `EMAIL_PASSWORD`                | unset                |
//! | `EMAIL_TLS_ACCEPT_INVALID_CERTS`| `false`              |
//! | `EMAIL_TRANSPORT`               | see below            |
//! | `EMAIL_MAX_ATTEMPTS`            | `3`                  |
//! | `EMAIL_RETRY_DELAY_SECS`        | `2`                  |
//! | `TICKET_CLOSED_ACCEPTS_REPLIES` | `true`               |
//!
//! Empty values count as unset. Loading `.env` is left to the binary.
//!
//! `EMAIL_TRANSPORT` is `smtp` or `log`. When it is unset, setting
//! `EMAIL_HOST` selects `smtp`; otherwise mail only goes to the log.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::LifecyclePolicy;
use crate::notify::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Which transport the binary wires in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    /// Log each message instead of sending it.
    #[default]
    Log,
    /// Send through the SMTP relay at `host:port`.
    Smtp,
}

/// Mail relay settings.
#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    /// Sender address for every notification.
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Skip certificate verification after STARTTLS (self-signed relays).
    pub accept_invalid_certs: bool,
    pub delivery: Delivery,
}

impl MailConfig {
    /// `host:port`, as handed to the transport.
    pub fn relay(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Login for the relay. Authentication is only attempted when both the
    /// user and the password are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 587,
            from: "support@localhost".into(),
            username: None,
            password: None,
            accept_invalid_certs: false,
            delivery: Delivery::Log,
        }
    }
}

// Manual impl keeps the password out of logs.
impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from", &self.from)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("delivery", &self.delivery)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    pub app_name: String,
    pub mail: MailConfig,
    pub retry: RetryPolicy,
    pub lifecycle: LifecyclePolicy,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            app_name: "Ticketing System".into(),
            mail: MailConfig::default(),
            retry: RetryPolicy::default(),
            lifecycle: LifecyclePolicy::default(),
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let max_attempts = parse_or(&get, "EMAIL_MAX_ATTEMPTS", defaults.retry.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "EMAIL_MAX_ATTEMPTS",
                value: "0".into(),
            });
        }
        let delay_secs = parse_or(
            &get,
            "EMAIL_RETRY_DELAY_SECS",
            defaults.retry.base_delay.as_secs(),
        )?;

        let closed_accepts_replies = bool_or(
            &get,
            "TICKET_CLOSED_ACCEPTS_REPLIES",
            defaults.lifecycle.closed_accepts_replies,
        )?;
        let accept_invalid_certs = bool_or(
            &get,
            "EMAIL_TLS_ACCEPT_INVALID_CERTS",
            defaults.mail.accept_invalid_certs,
        )?;

        let delivery = match get("EMAIL_TRANSPORT") {
            None if get("EMAIL_HOST").is_some() => Delivery::Smtp,
            None => defaults.mail.delivery,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "smtp" => Delivery::Smtp,
                "log" => Delivery::Log,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "EMAIL_TRANSPORT",
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            mail: MailConfig {
                host: get("EMAIL_HOST").unwrap_or(defaults.mail.host),
                port: parse_or(&get, "EMAIL_PORT", defaults.mail.port)?,
                from: get("EMAIL_FROM").unwrap_or(defaults.mail.from),
                username: get("EMAIL_USER"),
                password: get("EMAIL_PASSWORD"),
                accept_invalid_certs,
                delivery,
            },
            retry: RetryPolicy::fixed(max_attempts, Duration::from_secs(delay_secs)),
            lifecycle: LifecyclePolicy {
                closed_accepts_replies,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn bool_or<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
