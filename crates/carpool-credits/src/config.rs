use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CreditError, Result};
use crate::records::Credits;

/// Credits charged per mile when nothing else is configured.
pub const DEFAULT_RATE_PER_MILE: f64 = 4.0;
/// Maximum credits a driver may earn per accounting week by default.
pub const DEFAULT_WEEKLY_EARN_CAP: Credits = 200;
/// Upper bound on the price of a single ride. Keeps a rider's balance from
/// leaving the `Credits` range for billions of maximum-price rides.
pub const MAX_RIDE_CREDITS: Credits = 1_000_000_000;

pub const ENV_RATE_PER_MILE: &str = "CARPOOL_CREDIT_RATE_PER_MILE";
pub const ENV_WEEKLY_EARN_CAP: &str = "CARPOOL_WEEKLY_EARN_CAP";
pub const ENV_OVERDRAFT_FLOOR: &str = "CARPOOL_OVERDRAFT_FLOOR";
pub const ENV_DEDUPE_RIDES: &str = "CARPOOL_DEDUPE_RIDES";
pub const ENV_AUTO_WEEK_ROLLOVER: &str = "CARPOOL_AUTO_WEEK_ROLLOVER";

/// Configuration for the credit ledger. Read once at startup and fixed for
/// the lifetime of the ledger it is handed to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditConfig {
    /// Credits charged to each rider (and earned by the driver) per mile.
    pub rate_per_mile: f64,
    /// Maximum credits a single user may earn by driving per accounting week.
    pub weekly_earn_cap: Credits,
    /// When set, a completion that would push any rider below this balance
    /// is rejected without effects. `None` allows unbounded overdraft.
    pub overdraft_floor: Option<Credits>,
    /// When `true`, a repeated ride id returns the original settlement and
    /// applies nothing.
    pub dedupe_rides: bool,
    /// When `true`, weekly-earned counters are cleared the first time a
    /// settlement lands in a later ISO week.
    pub auto_week_rollover: bool,
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            rate_per_mile: DEFAULT_RATE_PER_MILE,
            weekly_earn_cap: DEFAULT_WEEKLY_EARN_CAP,
            overdraft_floor: None,
            dedupe_rides: false,
            auto_week_rollover: false,
        }
    }
}

impl CreditConfig {
    /// Build a configuration from process environment variables.
    ///
    /// Unset or invalid values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let rate_per_mile = match lookup(ENV_RATE_PER_MILE) {
            None => defaults.rate_per_mile,
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(rate) if rate.is_finite() && rate > 0.0 => rate,
                _ => {
                    warn!(key = ENV_RATE_PER_MILE, value = %raw, "invalid rate; using default");
                    defaults.rate_per_mile
                }
            },
        };

        let weekly_earn_cap = match lookup(ENV_WEEKLY_EARN_CAP) {
            None => defaults.weekly_earn_cap,
            Some(raw) => match raw.trim().parse::<Credits>() {
                Ok(cap) if cap >= 0 => cap,
                _ => {
                    warn!(key = ENV_WEEKLY_EARN_CAP, value = %raw, "invalid cap; using default");
                    defaults.weekly_earn_cap
                }
            },
        };

        let overdraft_floor = lookup(ENV_OVERDRAFT_FLOOR).and_then(|raw| {
            let parsed = raw.trim().parse::<Credits>().ok();
            if parsed.is_none() {
                warn!(key = ENV_OVERDRAFT_FLOOR, value = %raw, "invalid floor; overdraft unbounded");
            }
            parsed
        });

        Self {
            rate_per_mile,
            weekly_earn_cap,
            overdraft_floor,
            dedupe_rides: flag(&lookup, ENV_DEDUPE_RIDES, defaults.dedupe_rides),
            auto_week_rollover: flag(&lookup, ENV_AUTO_WEEK_ROLLOVER, defaults.auto_week_rollover),
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| CreditError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check that the rate is positive and the cap non-negative.
    pub fn validate(&self) -> Result<()> {
        if !self.rate_per_mile.is_finite() || self.rate_per_mile <= 0.0 {
            return Err(CreditError::Config(format!(
                "rate_per_mile must be a positive number, got {}",
                self.rate_per_mile
            )));
        }
        if self.weekly_earn_cap < 0 {
            return Err(CreditError::Config(format!(
                "weekly_earn_cap must not be negative, got {}",
                self.weekly_earn_cap
            )));
        }
        Ok(())
    }

    /// Price a ride of the given distance.
    ///
    /// Returns 0 for a missing, zero, negative or non-finite distance.
    /// Otherwise `distance * rate_per_mile` rounded half away from zero,
    /// so 2.5 credits round to 3, clamped to [`MAX_RIDE_CREDITS`].
    pub fn estimate_credits(&self, distance_miles: Option<f64>) -> Credits {
        match distance_miles {
            Some(miles) if miles.is_finite() && miles > 0.0 => {
                // `as` saturates on overflow.
                ((miles * self.rate_per_mile).round() as Credits).clamp(0, MAX_RIDE_CREDITS)
            }
            _ => 0,
        }
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(key, value = %raw, "invalid flag; using default");
            default
        }
    }
}
