/// Availability manager implementation using runtime queries
///
/// Weekly hours are stored keyed by ISO weekday (Monday = 1 .. Sunday = 7)
/// and the table holds either zero or exactly seven rows. Collection
/// replacements run as single transactions so concurrent readers never see
/// a half-replaced configuration.

use crate::{
    availability::{
        BusinessHourInput, BusinessSettingsResponse, HolidayInput, TimeSlotInput,
        UnavailableDateInput, UpdateBusinessSettingsRequest,
    },
    db::models::{BookableTimeSlot, BusinessHour, Holiday, UnavailableDate},
    error::{ApiError, ApiResult},
};
use chrono::NaiveTime;
use sqlx::SqlitePool;
use std::collections::HashSet;

const DEFAULT_OPEN: &str = "10:00";
const DEFAULT_CLOSE: &str = "19:00";
const SUNDAY: i64 = 7;

/// Availability manager service
pub struct AvailabilityManager {
    db: SqlitePool,
}

impl AvailabilityManager {
    /// Create a new availability manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Load the full availability surface
    ///
    /// When no weekly hours exist yet, the default week is persisted first.
    /// The other collections default to empty without persistence.
    pub async fn get_settings(&self) -> ApiResult<BusinessSettingsResponse> {
        let mut business_hours = self.fetch_business_hours().await?;

        if business_hours.is_empty() {
            self.seed_default_week().await?;
            business_hours = self.fetch_business_hours().await?;
        }

        let holidays = sqlx::query_as::<_, Holiday>(
            "SELECT id, date, description FROM holidays ORDER BY date",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        let unavailable_dates = sqlx::query_as::<_, UnavailableDate>(
            "SELECT id, date, reason FROM unavailable_dates ORDER BY date",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        let bookable_time_slots = sqlx::query_as::<_, BookableTimeSlot>(
            "SELECT id, start_time, end_time FROM bookable_time_slots ORDER BY start_time",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(BusinessSettingsResponse {
            business_hours,
            holidays,
            unavailable_dates,
            bookable_time_slots,
        })
    }

    /// Replace supplied collections wholesale in one transaction
    pub async fn replace_settings(
        &self,
        req: UpdateBusinessSettingsRequest,
    ) -> ApiResult<BusinessSettingsResponse> {
        if let Some(ref hours) = req.business_hours {
            validate_week(hours)?;
        }
        if let Some(ref holidays) = req.holidays {
            validate_unique_dates(holidays.iter().map(|h| h.date), "holiday")?;
        }
        if let Some(ref dates) = req.unavailable_dates {
            validate_unique_dates(dates.iter().map(|d| d.date), "unavailable date")?;
        }
        if let Some(ref slots) = req.bookable_time_slots {
            for slot in slots {
                validate_slot(slot)?;
            }
        }

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        if let Some(hours) = req.business_hours {
            sqlx::query("DELETE FROM business_hours")
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;

            for hour in hours {
                sqlx::query(
                    "INSERT INTO business_hours (day_of_week, open_time, close_time, is_closed)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(hour.day_of_week)
                .bind(&hour.open_time)
                .bind(&hour.close_time)
                .bind(hour.is_closed.unwrap_or(false))
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;
            }
        }

        if let Some(holidays) = req.holidays {
            sqlx::query("DELETE FROM holidays")
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;

            for holiday in holidays {
                sqlx::query("INSERT INTO holidays (date, description) VALUES (?1, ?2)")
                    .bind(holiday.date)
                    .bind(&holiday.description)
                    .execute(&mut *tx)
                    .await
                    .map_err(ApiError::Database)?;
            }
        }

        if let Some(dates) = req.unavailable_dates {
            sqlx::query("DELETE FROM unavailable_dates")
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;

            for date in dates {
                sqlx::query("INSERT INTO unavailable_dates (date, reason) VALUES (?1, ?2)")
                    .bind(date.date)
                    .bind(&date.reason)
                    .execute(&mut *tx)
                    .await
                    .map_err(ApiError::Database)?;
            }
        }

        if let Some(slots) = req.bookable_time_slots {
            sqlx::query("DELETE FROM bookable_time_slots")
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;

            for slot in slots {
                sqlx::query(
                    "INSERT INTO bookable_time_slots (start_time, end_time) VALUES (?1, ?2)",
                )
                .bind(&slot.start_time)
                .bind(&slot.end_time)
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;
            }
        }

        tx.commit().await.map_err(ApiError::Database)?;

        self.get_settings().await
    }

    /// Add a holiday date
    pub async fn add_holiday(&self, input: HolidayInput) -> ApiResult<Holiday> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM holidays WHERE date = ?1")
            .bind(input.date)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if exists > 0 {
            return Err(ApiError::Duplicate(format!(
                "Holiday already exists for {}",
                input.date
            )));
        }

        let result = sqlx::query("INSERT INTO holidays (date, description) VALUES (?1, ?2)")
            .bind(input.date)
            .bind(&input.description)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(Holiday {
            id: result.last_insert_rowid(),
            date: input.date,
            description: input.description,
        })
    }

    /// Remove a holiday by id
    pub async fn remove_holiday(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM holidays WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Holiday not found".to_string()));
        }

        Ok(())
    }

    /// Add a blackout date
    pub async fn add_unavailable_date(
        &self,
        input: UnavailableDateInput,
    ) -> ApiResult<UnavailableDate> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM unavailable_dates WHERE date = ?1",
        )
        .bind(input.date)
        .fetch_one(&self.db)
        .await
        .map_err(ApiError::Database)?;

        if exists > 0 {
            return Err(ApiError::Duplicate(format!(
                "Unavailable date already exists for {}",
                input.date
            )));
        }

        let result = sqlx::query("INSERT INTO unavailable_dates (date, reason) VALUES (?1, ?2)")
            .bind(input.date)
            .bind(&input.reason)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(UnavailableDate {
            id: result.last_insert_rowid(),
            date: input.date,
            reason: input.reason,
        })
    }

    /// Remove a blackout date by id
    pub async fn remove_unavailable_date(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM unavailable_dates WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Unavailable date not found".to_string()));
        }

        Ok(())
    }

    /// Add a bookable time slot
    pub async fn add_time_slot(&self, input: TimeSlotInput) -> ApiResult<BookableTimeSlot> {
        validate_slot(&input)?;

        let result =
            sqlx::query("INSERT INTO bookable_time_slots (start_time, end_time) VALUES (?1, ?2)")
                .bind(&input.start_time)
                .bind(&input.end_time)
                .execute(&self.db)
                .await
                .map_err(ApiError::Database)?;

        Ok(BookableTimeSlot {
            id: result.last_insert_rowid(),
            start_time: input.start_time,
            end_time: input.end_time,
        })
    }

    /// Remove a bookable time slot by id
    pub async fn remove_time_slot(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM bookable_time_slots WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Time slot not found".to_string()));
        }

        Ok(())
    }

    async fn fetch_business_hours(&self) -> ApiResult<Vec<BusinessHour>> {
        sqlx::query_as::<_, BusinessHour>(
            "SELECT id, day_of_week, open_time, close_time, is_closed
             FROM business_hours ORDER BY day_of_week",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)
    }

    /// Persist the default week: Mon-Sat open 10:00-19:00, Sunday closed
    ///
    /// INSERT OR IGNORE keeps concurrent first readers from tripping over
    /// the day_of_week uniqueness constraint.
    async fn seed_default_week(&self) -> ApiResult<()> {
        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        for day in 1..=7i64 {
            sqlx::query(
                "INSERT OR IGNORE INTO business_hours (day_of_week, open_time, close_time, is_closed)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(day)
            .bind(DEFAULT_OPEN)
            .bind(DEFAULT_CLOSE)
            .bind(day == SUNDAY)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::Database)?;
        }

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!("Seeded default business hours");

        Ok(())
    }
}

/// A supplied week must cover each ISO weekday exactly once
fn validate_week(hours: &[BusinessHourInput]) -> ApiResult<()> {
    if hours.len() != 7 {
        return Err(ApiError::Validation(format!(
            "Business hours must cover all 7 weekdays, got {} rows",
            hours.len()
        )));
    }

    let mut seen = HashSet::new();
    for hour in hours {
        if !(1..=7).contains(&hour.day_of_week) {
            return Err(ApiError::Validation(format!(
                "day_of_week must be 1-7 (Monday-Sunday), got {}",
                hour.day_of_week
            )));
        }
        if !seen.insert(hour.day_of_week) {
            return Err(ApiError::Validation(format!(
                "Duplicate weekday {} in business hours",
                hour.day_of_week
            )));
        }

        let open = parse_time_of_day(&hour.open_time)?;
        let close = parse_time_of_day(&hour.close_time)?;
        if !hour.is_closed.unwrap_or(false) && close <= open {
            return Err(ApiError::Validation(format!(
                "Close time must be after open time on weekday {}",
                hour.day_of_week
            )));
        }
    }

    Ok(())
}

fn validate_unique_dates(
    dates: impl Iterator<Item = chrono::NaiveDate>,
    kind: &str,
) -> ApiResult<()> {
    let mut seen = HashSet::new();
    for date in dates {
        if !seen.insert(date) {
            return Err(ApiError::Validation(format!(
                "Duplicate {} {} supplied",
                kind, date
            )));
        }
    }

    Ok(())
}

fn validate_slot(slot: &TimeSlotInput) -> ApiResult<()> {
    let start = parse_time_of_day(&slot.start_time)?;
    let end = parse_time_of_day(&slot.end_time)?;

    if end <= start {
        return Err(ApiError::Validation(
            "Slot end time must be after start time".to_string(),
        ));
    }

    Ok(())
}

fn parse_time_of_day(value: &str) -> ApiResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ApiError::Validation(format!("Invalid time of day '{}'", value)))
}
