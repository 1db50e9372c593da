//! Toll-free calendar.
//!
//! A day is toll free when it falls on a weekend, in a toll-free
//! month, on a listed date, or on the eve of a holiday that is
//! configured to carry its eve.  Calendars are plain data and are
//! usually loaded once a year from JSON.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TollFreeCalendar {
    /// Exact toll-free dates.
    #[serde(default)]
    pub dates: BTreeSet<NaiveDate>,
    /// Holidays whose preceding day is also toll free.  The holiday
    /// itself is toll free as well.
    #[serde(default)]
    pub holidays_with_eve: BTreeSet<NaiveDate>,
    /// Whole months (1-12) without tolls.
    #[serde(default)]
    pub months: BTreeSet<u32>,
    /// Whether Saturdays and Sundays are toll free.
    #[serde(default = "default_weekends")]
    pub weekends: bool,
}

fn default_weekends() -> bool {
    true
}

impl TollFreeCalendar {
    /// A calendar with only the weekend rule.
    pub fn weekends_only() -> Self {
        Self {
            dates: BTreeSet::new(),
            holidays_with_eve: BTreeSet::new(),
            months: BTreeSet::new(),
            weekends: true,
        }
    }

    pub fn is_toll_free(&self, date: NaiveDate) -> bool {
        if self.weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return true;
        }
        if self.months.contains(&date.month()) {
            return true;
        }
        if self.dates.contains(&date) || self.holidays_with_eve.contains(&date) {
            return true;
        }
        date.succ_opt()
            .is_some_and(|next| self.holidays_with_eve.contains(&next))
    }

    /// Number of chargeable days in `year`.
    pub fn chargeable_days_in(&self, year: i32) -> usize {
        NaiveDate::from_ymd_opt(year, 1, 1)
            .map(|first| {
                first
                    .iter_days()
                    .take_while(|d| d.year() == year)
                    .filter(|d| !self.is_toll_free(*d))
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Swedish public holidays for 2013 as applied by the Gothenburg
/// congestion tax, with July exempt.
pub fn gothenburg_2013() -> TollFreeCalendar {
    let d = |m, day| NaiveDate::from_ymd_opt(2013, m, day).expect("valid 2013 date");
    TollFreeCalendar {
        dates: [
            d(1, 1),
            d(4, 1),
            d(6, 21),
            d(11, 1),
            d(12, 24),
            d(12, 25),
            d(12, 26),
            d(12, 31),
        ]
        .into_iter()
        .collect(),
        // Good Friday, May Day, Ascension, National Day.
        holidays_with_eve: [d(3, 29), d(5, 1), d(5, 9), d(6, 6)].into_iter().collect(),
        months: [7].into_iter().collect(),
        weekends: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekends_are_free() {
        let cal = TollFreeCalendar::weekends_only();
        assert!(cal.is_toll_free(date(2013, 4, 27)));
        assert!(cal.is_toll_free(date(2013, 4, 28)));
        assert!(!cal.is_toll_free(date(2013, 4, 29)));
    }

    #[test]
    fn test_weekend_rule_can_be_disabled() {
        let cal = TollFreeCalendar {
            weekends: false,
            ..TollFreeCalendar::weekends_only()
        };
        assert!(!cal.is_toll_free(date(2013, 4, 27)));
    }

    #[test]
    fn test_july_is_free() {
        let cal = gothenburg_2013();
        assert!(cal.is_toll_free(date(2013, 7, 1)));
        assert!(cal.is_toll_free(date(2013, 7, 31)));
        assert!(!cal.is_toll_free(date(2013, 8, 1)));
    }

    #[test]
    fn test_holiday_eve_is_free() {
        let cal = gothenburg_2013();
        // Maundy Thursday, Walpurgis Night, Ascension eve, National Day eve.
        for (m, d) in [(3, 28), (4, 30), (5, 8), (6, 5)] {
            assert!(cal.is_toll_free(date(2013, m, d)), "2013-{m}-{d}");
        }
        // Midsummer Eve is listed on its own and has no eve.
        assert!(cal.is_toll_free(date(2013, 6, 21)));
        assert!(!cal.is_toll_free(date(2013, 6, 20)));
    }

    #[test]
    fn test_2013_has_222_chargeable_days() {
        assert_eq!(gothenburg_2013().chargeable_days_in(2013), 222);
    }

    #[test]
    fn test_deserialise_defaults() {
        let cal: TollFreeCalendar = serde_json::from_str(r#"{"dates":["2024-01-01"]}"#).unwrap();
        assert!(cal.weekends);
        assert!(cal.months.is_empty());
        assert!(cal.is_toll_free(date(2024, 1, 1)));
    }
}
