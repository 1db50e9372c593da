//! Time-of-day rate table.
//!
//! A [`RateTable`] is an ordered list of half-open intervals
//! `[start, end)` over a single day, each mapped to a fee.  Times of
//! day are held as minutes past midnight so that the end of the day
//! can be written as `24:00`, which `chrono::NaiveTime` cannot
//! represent.

use crate::error::{Result, TollError};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minutes past midnight, `00:00` through `24:00` inclusive.
///
/// Serialised as an `"HH:MM"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    /// Builds a time of day, returning `None` past `24:00`.
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        let total = hour.checked_mul(60)?.checked_add(minute)?;
        (total <= MINUTES_PER_DAY).then_some(TimeOfDay(total))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Truncates to the minute; `06:29:59` maps to `06:29`.
    fn from(time: NaiveTime) -> Self {
        TimeOfDay((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let (hour, minute) = value
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got {value:?}"))?;
        let hour: u16 = hour
            .parse()
            .map_err(|_| format!("invalid hour in {value:?}"))?;
        let minute: u16 = minute
            .parse()
            .map_err(|_| format!("invalid minute in {value:?}"))?;
        TimeOfDay::new(hour, minute).ok_or_else(|| format!("time of day out of range: {value:?}"))
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// A fee charged for passages within `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRule {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub fee: u32,
}

impl RateRule {
    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.start <= time && time < self.end
    }
}

/// Ordered, non-overlapping rate rules for one day.
///
/// Gaps between rules are allowed and charge nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RateRule>", into = "Vec<RateRule>")]
pub struct RateTable {
    rules: Vec<RateRule>,
}

impl RateTable {
    /// Validates and wraps a list of rules.
    ///
    /// Each rule must have `start < end`, and rules must be sorted by
    /// start time without overlapping.
    pub fn new(rules: Vec<RateRule>) -> Result<Self> {
        for rule in &rules {
            if rule.start >= rule.end {
                return Err(TollError::InvalidRateTable(format!(
                    "empty interval {}-{}",
                    rule.start, rule.end
                )));
            }
        }
        for pair in rules.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(TollError::InvalidRateTable(format!(
                    "{}-{} overlaps or precedes {}-{}",
                    pair[1].start, pair[1].end, pair[0].start, pair[0].end
                )));
            }
        }
        Ok(Self { rules })
    }

    /// Fee for a time of day, or 0 when no rule covers it.
    pub fn fee_at(&self, time: TimeOfDay) -> u32 {
        // Rules are sorted and disjoint, so the candidate is the last
        // rule starting at or before `time`.
        let idx = self.rules.partition_point(|rule| rule.start <= time);
        idx.checked_sub(1)
            .map(|i| &self.rules[i])
            .filter(|rule| rule.contains(time))
            .map_or(0, |rule| rule.fee)
    }

    /// True when the rules cover 00:00-24:00 without gaps.
    pub fn is_contiguous(&self) -> bool {
        let mut cursor = TimeOfDay::MIDNIGHT;
        for rule in &self.rules {
            if rule.start != cursor {
                return false;
            }
            cursor = rule.end;
        }
        cursor == TimeOfDay::END_OF_DAY
    }

    pub fn rules(&self) -> &[RateRule] {
        &self.rules
    }
}

impl TryFrom<Vec<RateRule>> for RateTable {
    type Error = TollError;

    fn try_from(rules: Vec<RateRule>) -> Result<Self> {
        RateTable::new(rules)
    }
}

impl From<RateTable> for Vec<RateRule> {
    fn from(table: RateTable) -> Self {
        table.rules
    }
}

/// The Gothenburg congestion-tax schedule.
pub fn default_rate_table() -> RateTable {
    let rule = |sh: u16, sm: u16, eh: u16, em: u16, fee: u32| RateRule {
        start: TimeOfDay(sh * 60 + sm),
        end: TimeOfDay(eh * 60 + em),
        fee,
    };
    RateTable {
        rules: vec![
            rule(0, 0, 6, 0, 0),
            rule(6, 0, 6, 30, 8),
            rule(6, 30, 7, 0, 13),
            rule(7, 0, 8, 0, 18),
            rule(8, 0, 8, 30, 13),
            rule(8, 30, 15, 0, 8),
            rule(15, 0, 15, 30, 13),
            rule(15, 30, 17, 0, 18),
            rule(17, 0, 18, 0, 13),
            rule(18, 0, 18, 30, 8),
            rule(18, 30, 24, 0, 0),
        ],
    }
}
