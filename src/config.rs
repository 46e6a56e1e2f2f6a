//! Service configuration
//!
//! Loaded from environment variables (a `.env` file is read first by `main`),
//! with defaults for everything except the optional backing services.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::domain::shipping::calculator::{DEFAULT_FALLBACK_COST, DEFAULT_HOME_STATE};
use crate::domain::shipping::{is_destination_state, ShippingPolicy};
use crate::domain::value_objects::DEFAULT_CURRENCY;
use crate::{EcommerceError, Result};

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_TAX_RATE: i64 = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres connection string. Without it the service keeps data in memory.
    pub database_url: Option<String>,
    pub nats_url: Option<String>,
    /// Percent applied to the cart subtotal.
    pub tax_rate: Decimal,
    pub currency: String,
    pub shipping: ShippingPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            nats_url: None,
            tax_rate: Decimal::from(DEFAULT_TAX_RATE),
            currency: DEFAULT_CURRENCY.to_string(),
            shipping: ShippingPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config = Self {
            port: parse(&var, "PORT", DEFAULT_PORT)?,
            database_url: var("DATABASE_URL"),
            nats_url: var("NATS_URL"),
            tax_rate: parse(&var, "TAX_RATE", Decimal::from(DEFAULT_TAX_RATE))?,
            currency: var("CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            shipping: ShippingPolicy {
                home_state: var("SHIPPING_HOME_STATE").unwrap_or_else(|| DEFAULT_HOME_STATE.to_string()),
                fallback_cost: parse(&var, "SHIPPING_FALLBACK_COST", Decimal::from(DEFAULT_FALLBACK_COST))?,
            },
        };

        if config.tax_rate.is_sign_negative() {
            return Err(EcommerceError::Config("TAX_RATE must not be negative".into()));
        }
        if config.shipping.fallback_cost.is_sign_negative() {
            return Err(EcommerceError::Config("SHIPPING_FALLBACK_COST must not be negative".into()));
        }
        if !is_destination_state(&config.shipping.home_state) {
            return Err(EcommerceError::Config(format!("SHIPPING_HOME_STATE is not a known state: {}", config.shipping.home_state)));
        }
        Ok(config)
    }
}

fn parse<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match var(key) {
        Some(raw) => raw.parse().map_err(|_| EcommerceError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.shipping.fallback_cost, Decimal::from(50));
        assert_eq!(config.shipping.home_state, "Tamil Nadu");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[("PORT", "9000"), ("TAX_RATE", "12.5"), ("SHIPPING_FALLBACK_COST", "60"), ("DATABASE_URL", " "), ("NATS_URL", "nats://localhost:4222")]).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.tax_rate, Decimal::new(125, 1));
        assert_eq!(config.shipping.fallback_cost, Decimal::from(60));
        assert_eq!(config.database_url, None);
        assert_eq!(config.nats_url.as_deref(), Some("nats://localhost:4222"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(load(&[("PORT", "eighty")]), Err(EcommerceError::Config(_))));
        assert!(matches!(load(&[("SHIPPING_FALLBACK_COST", "-1")]), Err(EcommerceError::Config(_))));
        assert!(matches!(load(&[("SHIPPING_HOME_STATE", "Other States")]), Err(EcommerceError::Config(_))));
    }
}
