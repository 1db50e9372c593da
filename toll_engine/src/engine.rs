//! Fee computation engine.
//!
//! The `engine` module turns a vehicle category and a day's passages
//! into a [`DailyFee`].  The work is split into three steps: the
//! exemption checks, consolidation of passages into charged windows,
//! and the daily cap.  Multi-day passage lists are partitioned by date
//! and processed in parallel with [`rayon`].
//!
//! The engine holds nothing but an immutable [`TollConfig`] behind an
//! `Arc`, so a single instance can be shared by every request.

use crate::config::TollConfig;
use crate::error::{Result, TollError};
use crate::models::{ChargedWindow, DailyFee, Exemption, VehicleCategory};
use chrono::{NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FeeEngine {
    config: Arc<TollConfig>,
}

impl FeeEngine {
    pub fn new(config: TollConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &TollConfig {
        &self.config
    }

    /// Rate-table fee for the time of day of `timestamp`.  Calendar and
    /// vehicle exemptions are not considered; see [`Self::passage_fee`].
    pub fn single_fee(&self, timestamp: NaiveDateTime) -> u32 {
        self.config.rates.fee_at(timestamp.time().into())
    }

    /// Fee for one isolated passage, with every exemption applied.
    pub fn passage_fee(&self, category: VehicleCategory, timestamp: NaiveDateTime) -> u32 {
        if self.is_toll_free_vehicle(category) || self.is_toll_free_day(timestamp.date()) {
            0
        } else {
            self.single_fee(timestamp).min(self.config.max_daily_fee)
        }
    }

    pub fn is_toll_free_day(&self, date: NaiveDate) -> bool {
        self.config.calendar.is_toll_free(date)
    }

    /// `Unknown` is never toll free, whatever the configuration says.
    pub fn is_toll_free_vehicle(&self, category: VehicleCategory) -> bool {
        category != VehicleCategory::Unknown && self.config.toll_free_vehicles.contains(&category)
    }

    /// Total owed for one day of passages.
    ///
    /// Returns 0 for an empty slice and an error when the passages do
    /// not all share one calendar date.
    pub fn daily_fee(&self, category: VehicleCategory, passages: &[NaiveDateTime]) -> Result<u32> {
        self.daily_breakdown(category, passages).map(|day| day.total)
    }

    /// Like [`Self::daily_fee`], but itemised per charged window.
    ///
    /// A toll-free vehicle is answered before the single-day check, so
    /// it pays nothing for any input.
    pub fn daily_breakdown(
        &self,
        category: VehicleCategory,
        passages: &[NaiveDateTime],
    ) -> Result<DailyFee> {
        if self.is_toll_free_vehicle(category) {
            let date = passages.iter().map(NaiveDateTime::date).min();
            debug!(?category, ?date, "toll-free vehicle");
            return Ok(DailyFee::exempt(date, Some(Exemption::TollFreeVehicle)));
        }
        let Some(date) = single_date(passages)? else {
            return Ok(DailyFee::exempt(None, None));
        };
        if self.is_toll_free_day(date) {
            debug!(?category, %date, "toll-free day");
            return Ok(DailyFee::exempt(Some(date), Some(Exemption::TollFreeDay)));
        }

        let mut sorted = passages.to_vec();
        sorted.sort_unstable();
        let windows = self.consolidate(&sorted);
        let uncapped = windows
            .iter()
            .fold(0u32, |sum, window| sum.saturating_add(window.fee));
        let total = uncapped.min(self.config.max_daily_fee);
        debug!(
            ?category,
            %date,
            windows = windows.len(),
            uncapped,
            total,
            "computed daily fee"
        );
        Ok(DailyFee {
            date: Some(date),
            windows,
            uncapped,
            total,
            exemption: None,
        })
    }

    /// Splits passages from any number of days by date and computes
    /// each day independently.  Results are ordered by date.
    pub fn fees_by_day(
        &self,
        category: VehicleCategory,
        passages: &[NaiveDateTime],
    ) -> Result<Vec<DailyFee>> {
        let mut by_date: BTreeMap<NaiveDate, Vec<NaiveDateTime>> = BTreeMap::new();
        for passage in passages {
            by_date.entry(passage.date()).or_default().push(*passage);
        }
        by_date
            .into_values()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|day| self.daily_breakdown(category, &day))
            .collect()
    }

    /// Groups sorted passages into windows.  A window is anchored at
    /// its first passage and takes every later passage no more than
    /// `window_minutes` after the anchor, counted in whole minutes; the
    /// anchor never moves.
    fn consolidate(&self, sorted: &[NaiveDateTime]) -> Vec<ChargedWindow> {
        let span = i64::from(self.config.window_minutes);
        let mut windows: Vec<ChargedWindow> = Vec::new();
        for &passage in sorted {
            let fee = self.single_fee(passage);
            match windows.last_mut() {
                Some(open) if (passage - open.anchor).num_minutes() <= span => {
                    open.passages += 1;
                    open.fee = open.fee.max(fee);
                }
                _ => windows.push(ChargedWindow {
                    anchor: passage,
                    passages: 1,
                    fee,
                }),
            }
        }
        windows
    }
}

impl Default for FeeEngine {
    fn default() -> Self {
        Self::new(TollConfig::default())
    }
}

/// The one date every passage falls on, or `None` for no passages.
fn single_date(passages: &[NaiveDateTime]) -> Result<Option<NaiveDate>> {
    let mut dates = passages.iter().map(NaiveDateTime::date);
    let Some(first) = dates.next() else {
        return Ok(None);
    };
    let (earliest, latest) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    if earliest != latest {
        return Err(TollError::PassagesSpanMultipleDays {
            first: earliest,
            last: latest,
        });
    }
    Ok(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::TollFreeCalendar;
    use chrono::Duration;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        // Monday, an ordinary chargeable day.
        NaiveDate::from_ymd_opt(2013, 4, 29)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_window_is_inclusive_at_sixty_minutes() {
        let engine = FeeEngine::default();
        // 06:00 (8) and 07:00 (18) are one window charged at 18.
        let day = engine
            .daily_breakdown(VehicleCategory::Car, &[at(6, 0), at(7, 0)])
            .unwrap();
        assert_eq!(day.windows.len(), 1);
        assert_eq!(day.total, 18);
    }

    #[test]
    fn test_window_distance_counts_whole_minutes() {
        let engine = FeeEngine::default();
        let half_past = at(10, 0) + Duration::seconds(30);
        // 60 minutes 30 seconds after the anchor is still the same window.
        assert_eq!(engine.daily_fee(VehicleCategory::Car, &[at(9, 0), half_past]).unwrap(), 8);
        let day = engine
            .daily_breakdown(VehicleCategory::Car, &[at(9, 0), at(10, 1)])
            .unwrap();
        assert_eq!(day.windows.len(), 2);
    }

    #[test]
    fn test_anchor_does_not_slide() {
        let engine = FeeEngine::default();
        // 06:00 opens a window; 06:50 joins it; 07:30 is 90 minutes past
        // the anchor and opens a second window even though it is only
        // 40 minutes after 06:50.
        let day = engine
            .daily_breakdown(VehicleCategory::Car, &[at(6, 0), at(6, 50), at(7, 30)])
            .unwrap();
        assert_eq!(day.windows.len(), 2);
        assert_eq!(day.windows[0].passages, 2);
        assert_eq!(day.windows[0].fee, 13);
        assert_eq!(day.windows[1].fee, 18);
        assert_eq!(day.total, 31);
    }

    #[test]
    fn test_unknown_category_is_charged() {
        let mut config = TollConfig::default();
        config.toll_free_vehicles.insert(VehicleCategory::Unknown);
        let engine = FeeEngine::new(config);
        assert!(!engine.is_toll_free_vehicle(VehicleCategory::Unknown));
        assert_eq!(engine.daily_fee(VehicleCategory::Unknown, &[at(7, 0)]).unwrap(), 18);
    }

    #[test]
    fn test_exemption_is_reported() {
        let engine = FeeEngine::default();
        let day = engine
            .daily_breakdown(VehicleCategory::Diplomat, &[at(7, 0)])
            .unwrap();
        assert_eq!(day.exemption, Some(Exemption::TollFreeVehicle));
        assert_eq!(day.total, 0);
    }

    #[test]
    fn test_configurable_cap_and_window() {
        let config = TollConfig {
            max_daily_fee: 20,
            window_minutes: 1,
            calendar: TollFreeCalendar::weekends_only(),
            ..TollConfig::default()
        };
        let engine = FeeEngine::new(config);
        // 07:00 and 07:30 are separate windows with a one-minute span.
        let day = engine
            .daily_breakdown(VehicleCategory::Car, &[at(7, 0), at(7, 30)])
            .unwrap();
        assert_eq!(day.uncapped, 36);
        assert_eq!(day.total, 20);
    }

    #[test]
    fn test_passage_fee_applies_exemptions() {
        let engine = FeeEngine::default();
        let saturday = NaiveDate::from_ymd_opt(2013, 4, 27)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        assert_eq!(engine.single_fee(saturday), 18);
        assert_eq!(engine.passage_fee(VehicleCategory::Car, saturday), 0);
        assert_eq!(engine.passage_fee(VehicleCategory::Car, at(7, 0)), 18);
        assert_eq!(engine.passage_fee(VehicleCategory::Tractor, at(7, 0)), 0);
    }

    #[test]
    fn test_multiple_days_error_names_range() {
        let engine = FeeEngine::default();
        let next_day = at(7, 0) + Duration::days(1);
        match engine.daily_fee(VehicleCategory::Car, &[next_day, at(7, 0)]) {
            Err(TollError::PassagesSpanMultipleDays { first, last }) => {
                assert_eq!(first, at(0, 0).date());
                assert_eq!(last, next_day.date());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
