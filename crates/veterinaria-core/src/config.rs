//! Clinic configuration: opening hours, conflict window, booking horizon.
//!
//! Values come from the process environment (after loading a `.env` file, if
//! any) and fall back to the clinic's standard schedule.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, Months, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Opening hour {opening} must be before closing hour {closing} (both within 0..=24)")]
    InvalidHours { opening: u32, closing: u32 },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Scheduling and storage settings for one clinic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicConfig {
    /// SQLite file path
    pub database_path: PathBuf,
    /// First bookable hour, local time
    pub opening_hour: u32,
    /// Bookings must start before this hour, local time
    pub closing_hour: u32,
    /// Weekday on which the clinic takes no appointments
    pub closed_weekday: Weekday,
    /// Half-width of the conflict window around an appointment
    pub conflict_window_minutes: i64,
    /// How far ahead appointments may be booked
    pub booking_horizon_months: u32,
    /// Clinic local time relative to UTC
    pub utc_offset_minutes: i32,
    /// Presentation locale; validators never read it
    pub locale: String,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("veterinaria.db"),
            opening_hour: 8,
            closing_hour: 20,
            closed_weekday: Weekday::Sun,
            conflict_window_minutes: 30,
            booking_horizon_months: 12,
            utc_offset_minutes: 0,
            locale: "es".to_string(),
        }
    }
}

impl ClinicConfig {
    /// Load from the environment, reading `.env` first when present.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            database_path: lookup("VET_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            opening_hour: parse_var(&lookup, "VET_OPENING_HOUR")?.unwrap_or(defaults.opening_hour),
            closing_hour: parse_var(&lookup, "VET_CLOSING_HOUR")?.unwrap_or(defaults.closing_hour),
            closed_weekday: parse_var(&lookup, "VET_CLOSED_WEEKDAY")?
                .unwrap_or(defaults.closed_weekday),
            conflict_window_minutes: parse_var(&lookup, "VET_CONFLICT_WINDOW_MINUTES")?
                .unwrap_or(defaults.conflict_window_minutes),
            booking_horizon_months: parse_var(&lookup, "VET_BOOKING_HORIZON_MONTHS")?
                .unwrap_or(defaults.booking_horizon_months),
            utc_offset_minutes: parse_var(&lookup, "VET_UTC_OFFSET_MINUTES")?
                .unwrap_or(defaults.utc_offset_minutes),
            locale: lookup("VET_LOCALE").unwrap_or(defaults.locale),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the values that cannot be expressed in the types.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.opening_hour >= self.closing_hour || self.closing_hour > 24 {
            return Err(ConfigError::InvalidHours {
                opening: self.opening_hour,
                closing: self.closing_hour,
            });
        }
        if self.conflict_window_minutes < 0 {
            return Err(ConfigError::InvalidValue {
                key: "VET_CONFLICT_WINDOW_MINUTES",
                value: self.conflict_window_minutes.to_string(),
            });
        }
        if self.utc_offset().is_none() {
            return Err(ConfigError::InvalidValue {
                key: "VET_UTC_OFFSET_MINUTES",
                value: self.utc_offset_minutes.to_string(),
            });
        }
        Ok(())
    }

    pub fn conflict_window(&self) -> Duration {
        Duration::minutes(self.conflict_window_minutes)
    }

    /// Clinic offset from UTC, `None` when out of range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }

    /// `instant` in clinic local time.
    pub fn local_time(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = self.utc_offset().unwrap_or_else(|| Utc.fix());
        instant.with_timezone(&offset)
    }

    /// Latest instant that may still be booked, or `None` if the horizon overflows.
    pub fn booking_horizon(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_months(Months::new(self.booking_horizon_months))
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> ConfigResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
