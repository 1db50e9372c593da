//! Fee engine configuration.
//!
//! A [`TollConfig`] bundles everything the engine needs: the rate
//! table, the toll-free calendar, the toll-free vehicle categories,
//! the daily cap and the consolidation window.  It is loaded once at
//! startup from a JSON file so that yearly holiday updates need no
//! code change, and is then shared read-only.

use crate::calendar::{gothenburg_2013, TollFreeCalendar};
use crate::error::{Result, TollError};
use crate::models::VehicleCategory;
use crate::rates::{default_rate_table, RateTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TollConfig {
    /// Upper bound on what one vehicle pays in one day.
    #[serde(default = "default_max_daily_fee")]
    pub max_daily_fee: u32,
    /// Passages at most this many minutes after a window's first
    /// passage are charged once.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
    pub rates: RateTable,
    pub toll_free_vehicles: BTreeSet<VehicleCategory>,
    pub calendar: TollFreeCalendar,
}

fn default_max_daily_fee() -> u32 {
    60
}

fn default_window_minutes() -> u32 {
    60
}

impl TollConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: TollConfig = serde_json::from_str(&data)?;
        config.validate()?;
        info!(
            path = %path.display(),
            rules = config.rates.rules().len(),
            toll_free_dates = config.calendar.dates.len(),
            "loaded toll configuration"
        );
        Ok(config)
    }

    /// Checks the invariants serde cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        if self.toll_free_vehicles.contains(&VehicleCategory::Unknown) {
            return Err(TollError::InvalidConfig(
                "toll_free_vehicles contains an unrecognised category".into(),
            ));
        }
        if let Some(month) = self.calendar.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(TollError::InvalidConfig(format!(
                "calendar month out of range: {month}"
            )));
        }
        Ok(())
    }
}

impl Default for TollConfig {
    /// Gothenburg congestion tax as of 2013.
    fn default() -> Self {
        Self {
            max_daily_fee: default_max_daily_fee(),
            window_minutes: default_window_minutes(),
            rates: default_rate_table(),
            toll_free_vehicles: VehicleCategory::DEFAULT_TOLL_FREE.into_iter().collect(),
            calendar: gothenburg_2013(),
        }
    }
}
