/// Business availability configuration
///
/// Merges weekly opening hours, holidays, ad-hoc unavailable dates, and
/// discrete bookable time slots into one settings aggregate. Weekly hours
/// are keyed by ISO weekday and default to Mon-Sat 10:00-19:00 with
/// Sunday closed when no configuration exists yet.

mod manager;

pub use manager::AvailabilityManager;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::{BookableTimeSlot, BusinessHour, Holiday, UnavailableDate};

/// The computed availability surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSettingsResponse {
    pub business_hours: Vec<BusinessHour>,
    pub holidays: Vec<Holiday>,
    pub unavailable_dates: Vec<UnavailableDate>,
    pub bookable_time_slots: Vec<BookableTimeSlot>,
}

/// Weekly-hours row supplied by an admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessHourInput {
    pub day_of_week: i64,
    pub open_time: String,
    pub close_time: String,
    pub is_closed: Option<bool>,
}

/// Holiday supplied by an admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayInput {
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Blackout date supplied by an admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableDateInput {
    pub date: NaiveDate,
    pub reason: Option<String>,
}

/// Bookable window supplied by an admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlotInput {
    pub start_time: String,
    pub end_time: String,
}

/// Partial settings update
///
/// Each collection is independently optional; a present collection
/// replaces the stored one wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBusinessSettingsRequest {
    pub business_hours: Option<Vec<BusinessHourInput>>,
    pub holidays: Option<Vec<HolidayInput>>,
    pub unavailable_dates: Option<Vec<UnavailableDateInput>>,
    pub bookable_time_slots: Option<Vec<TimeSlotInput>>,
}
