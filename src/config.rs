//! Runtime configuration from `STOREFRONT_*` environment variables.

use std::env;
use std::path::PathBuf;
use chrono::Duration;
use thiserror::Error;
use crate::domain::{ChannelId, RoleId};

pub const DEFAULT_CLOSE_DELAY_SECS: i64 = 60;
pub const DEFAULT_CART_TIMEOUT_SECS: i64 = 30 * 60;
pub const DEFAULT_ACTOR_BUFFER: usize = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub admin_roles: Vec<RoleId>,
    pub audit_channel: Option<ChannelId>,
    pub ticket_category: Option<ChannelId>,
    /// Sent to the buyer when a payment is approved.
    pub delivery_link: String,
    pub close_delay: Duration,
    pub cart_timeout: Duration,
    pub actor_buffer: usize,
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let admin_roles = var("STOREFRONT_ADMIN_ROLE_ID")
            .ok_or(ConfigError::Missing("STOREFRONT_ADMIN_ROLE_ID"))?
            .split(',')
            .map(|part| parse_number("STOREFRONT_ADMIN_ROLE_ID", part.trim()).map(RoleId))
            .collect::<Result<Vec<_>, _>>()?;

        let optional_channel = |name: &'static str| -> Result<Option<ChannelId>, ConfigError> {
            var(name).map(|v| parse_number(name, &v).map(ChannelId)).transpose()
        };
        let seconds = |name: &'static str, default: i64| -> Result<Duration, ConfigError> {
            match var(name) {
                Some(v) => {
                    let secs = parse_number(name, &v)?;
                    i64::try_from(secs)
                        .ok()
                        .and_then(Duration::try_seconds)
                        .ok_or(ConfigError::Invalid { name, value: v })
                }
                None => Ok(Duration::seconds(default)),
            }
        };

        Ok(Self {
            admin_roles,
            audit_channel: optional_channel("STOREFRONT_LOG_CHANNEL_ID")?,
            ticket_category: optional_channel("STOREFRONT_TICKET_CATEGORY_ID")?,
            delivery_link: var("STOREFRONT_DELIVERY_LINK")
                .ok_or(ConfigError::Missing("STOREFRONT_DELIVERY_LINK"))?,
            close_delay: seconds("STOREFRONT_CLOSE_DELAY_SECS", DEFAULT_CLOSE_DELAY_SECS)?,
            cart_timeout: seconds("STOREFRONT_CART_TIMEOUT_SECS", DEFAULT_CART_TIMEOUT_SECS)?,
            actor_buffer: buffer_size(var("STOREFRONT_ACTOR_BUFFER"))?,
            snapshot_path: var("STOREFRONT_SNAPSHOT_PATH").map(PathBuf::from),
        })
    }
}

fn buffer_size(value: Option<String>) -> Result<usize, ConfigError> {
    let Some(value) = value else {
        return Ok(DEFAULT_ACTOR_BUFFER);
    };
    parse_number("STOREFRONT_ACTOR_BUFFER", &value)?
        .try_into()
        .ok()
        .filter(|&n: &usize| n > 0)
        .ok_or(ConfigError::Invalid {
            name: "STOREFRONT_ACTOR_BUFFER",
            value,
        })
}

fn parse_number(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        admin_roles: vec![RoleId(900)],
        audit_channel: Some(ChannelId(1)),
        ticket_category: Some(ChannelId(2)),
        delivery_link: "https://example.com/private-server".to_string(),
        close_delay: Duration::seconds(DEFAULT_CLOSE_DELAY_SECS),
        cart_timeout: Duration::seconds(DEFAULT_CART_TIMEOUT_SECS),
        actor_buffer: 32,
        snapshot_path: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_apply() {
        let config = Config::from_lookup(lookup(&[
            ("STOREFRONT_ADMIN_ROLE_ID", "123, 456"),
            ("STOREFRONT_DELIVERY_LINK", "https://example.com/join"),
        ]))
        .unwrap();

        assert_eq!(config.admin_roles, vec![RoleId(123), RoleId(456)]);
        assert_eq!(config.close_delay, Duration::seconds(60));
        assert_eq!(config.cart_timeout, Duration::minutes(30));
        assert_eq!(config.actor_buffer, DEFAULT_ACTOR_BUFFER);
        assert_eq!(config.audit_channel, None);
        assert_eq!(config.snapshot_path, None);
    }

    #[test]
    fn test_missing_and_malformed_values() {
        assert_eq!(
            Config::from_lookup(lookup(&[("STOREFRONT_DELIVERY_LINK", "x")])),
            Err(ConfigError::Missing("STOREFRONT_ADMIN_ROLE_ID"))
        );
        assert!(matches!(
            Config::from_lookup(lookup(&[
                ("STOREFRONT_ADMIN_ROLE_ID", "1"),
                ("STOREFRONT_DELIVERY_LINK", "x"),
                ("STOREFRONT_LOG_CHANNEL_ID", "not-a-number"),
            ])),
            Err(ConfigError::Invalid { name: "STOREFRONT_LOG_CHANNEL_ID", .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[
                ("STOREFRONT_ADMIN_ROLE_ID", "1"),
                ("STOREFRONT_DELIVERY_LINK", "x"),
                ("STOREFRONT_ACTOR_BUFFER", "0"),
            ])),
            Err(ConfigError::Invalid { name: "STOREFRONT_ACTOR_BUFFER", .. })
        ));
    }
}
