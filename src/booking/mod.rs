/// Appointment bookings
///
/// Bookings link an optional account (guest bookings are permitted) to a
/// catalog service on a calendar date and time-of-day. The manager resolves
/// the acting identity for each request and generates reference codes.

mod manager;

pub use manager::BookingManager;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::BookingStatus;

/// Booking creation request
///
/// `user_id` names the owning account; when absent the guest contact
/// fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub user_id: Option<i64>,
    pub service_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub notes: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
}

/// General booking update; non-admin callers may only supply `notes`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBookingRequest {
    pub service_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Status-only update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Booking view enriched with display names joined at read time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i64,
    pub account_id: Option<i64>,
    pub service_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub reference_code: Option<String>,
    /// Account display name, or the guest name for anonymous bookings
    pub client_name: Option<String>,
    pub service_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
