//! Environment-driven configuration.

use anyhow::{Context, Result};

use crate::domain::totals::{CheckoutPolicy, TaxRule};

/// Service configuration, read once at startup. All amounts are in minor
/// currency units.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub free_shipping_threshold: i64,
    pub shipping_flat_fee: i64,
    pub tax_basis_points: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL is required")?,
            port: env_parse("PORT", 8080)?,
            nats_url: std::env::var("NATS_URL").ok(),
            free_shipping_threshold: env_parse("FREE_SHIPPING_THRESHOLD", 99_900)?,
            shipping_flat_fee: env_parse("SHIPPING_FLAT_FEE", 5_000)?,
            tax_basis_points: env_parse("TAX_BASIS_POINTS", 0)?,
        })
    }

    pub fn checkout_policy(&self) -> CheckoutPolicy {
        CheckoutPolicy {
            free_shipping_threshold: self.free_shipping_threshold,
            shipping_flat_fee: self.shipping_flat_fee,
            tax: if self.tax_basis_points == 0 {
                TaxRule::None
            } else {
                TaxRule::FlatRate { basis_points: self.tax_basis_points }
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().with_context(|| format!("{name} is not a valid value")),
        Err(_) => Ok(default),
    }
}
