//! Data models for the Toll Engine.
//!
//! The `models` module defines the serialisable structs and enums
//! that flow in and out of the engine and the HTTP API: vehicles and
//! their categories, passage requests, and the itemised daily fee
//! results.  Passages are local wall-clock date-times; the engine
//! never converts between time zones.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The kind of vehicle passing a toll point.
///
/// Only membership in the configured toll-free set matters to the
/// engine.  Names that are not recognised deserialise to
/// [`VehicleCategory::Unknown`], which is always charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Car,
    Motorbike,
    Bus,
    Diplomat,
    Emergency,
    Foreign,
    Military,
    Tractor,
    #[serde(other)]
    Unknown,
}

impl VehicleCategory {
    /// Categories exempt from the congestion tax unless configured
    /// otherwise.
    pub const DEFAULT_TOLL_FREE: [VehicleCategory; 6] = [
        VehicleCategory::Motorbike,
        VehicleCategory::Tractor,
        VehicleCategory::Emergency,
        VehicleCategory::Diplomat,
        VehicleCategory::Foreign,
        VehicleCategory::Military,
    ];
}

/// A registered vehicle and the passages recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub registration_number: String,
    pub category: VehicleCategory,
    /// Passages across any number of days, in recording order.
    #[serde(default)]
    pub passages: Vec<NaiveDateTime>,
}

/// Body of `POST /api/fee`: an ad-hoc calculation for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeRequest {
    pub category: VehicleCategory,
    pub passages: Vec<NaiveDateTime>,
}

/// Body of `POST /api/vehicle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleQuery {
    pub registration_number: String,
}

/// Body of `POST /api/vehicles/:registration/passages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassagesRequest {
    pub passages: Vec<NaiveDateTime>,
}

/// One consolidated charge: every passage within the window starting
/// at `anchor` is billed once, at the highest fee among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargedWindow {
    pub anchor: NaiveDateTime,
    pub passages: usize,
    pub fee: u32,
}

/// Why a day was not charged at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exemption {
    TollFreeVehicle,
    TollFreeDay,
}

/// The fee owed by one vehicle for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFee {
    /// `None` only when no passages were supplied.
    pub date: Option<NaiveDate>,
    pub windows: Vec<ChargedWindow>,
    /// Sum of window fees before the daily cap.
    pub uncapped: u32,
    /// Amount owed, never above the configured daily maximum.
    pub total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemption: Option<Exemption>,
}

impl DailyFee {
    pub(crate) fn exempt(date: Option<NaiveDate>, exemption: Option<Exemption>) -> Self {
        Self {
            date,
            windows: Vec::new(),
            uncapped: 0,
            total: 0,
            exemption,
        }
    }
}

/// Response of `POST /api/vehicle`: fees for every recorded day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleFeeReport {
    pub registration_number: String,
    pub category: VehicleCategory,
    pub toll_free_vehicle: bool,
    pub days: Vec<DailyFee>,
    /// Sum of the daily totals.
    pub total: u32,
}
