use std::{env, fmt::Display, str::FromStr};

use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub orders: OrderSettings,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Knobs the order services read at request time.
#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub order_number_prefix: String,
    pub estimated_time: String,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            order_number_prefix: "TCH".into(),
            estimated_time: "15-20 minutes".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub email_gateway_url: Option<String>,
    pub sms_enabled: bool,
    pub site_url: String,
}

/// Reads the service configuration from the environment (after `.env` has been loaded).
pub fn load() -> Result<AppConfig> {
    let defaults = OrderSettings::default();

    Ok(AppConfig {
        server: ServerConfig {
            port: try_load("SERVER_PORT", "3000")?,
        },
        database: DatabaseConfig {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: try_load("DATABASE_MAX_CONNECTIONS", "10")?,
        },
        orders: OrderSettings {
            order_number_prefix: try_load("ORDER_NUMBER_PREFIX", &defaults.order_number_prefix)?,
            estimated_time: try_load("ORDER_ESTIMATED_TIME", &defaults.estimated_time)?,
        },
        notifications: NotificationConfig {
            email_gateway_url: env::var("EMAIL_GATEWAY_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            sms_enabled: try_load("SMS_ENABLED", "true")?,
            site_url: try_load("SITE_URL", "http://localhost:3000")?,
        },
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid {key} value '{raw}': {e}"))
}
