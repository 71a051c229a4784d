/// Booking manager implementation using runtime queries
///
/// Resolves the acting identity for each booking request (account owner,
/// admin on behalf of another account, or guest), enforces the status
/// transition table, and projects enriched booking views.

use crate::{
    booking::{BookingResponse, CreateBookingRequest, UpdateBookingRequest},
    db::models::{Account, Booking, BookingStatus},
    error::{ApiError, ApiResult},
};
use chrono::{NaiveTime, Utc};
use rand::Rng;
use sqlx::{Row, SqlitePool};

/// Reference codes are "NA" + 6 random characters from this set + row id
const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Booking manager service
pub struct BookingManager {
    db: SqlitePool,
}

impl BookingManager {
    /// Create a new booking manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a booking on behalf of the resolved actor
    ///
    /// When the request names an owning account, the caller must be that
    /// account or an admin. Without one the request is a guest booking and
    /// all three guest contact fields are required.
    pub async fn create_booking(
        &self,
        req: CreateBookingRequest,
        actor: Option<&Account>,
    ) -> ApiResult<BookingResponse> {
        validate_time_of_day(&req.time)?;

        let client_name = match req.user_id {
            Some(user_id) => {
                let actor = actor.ok_or_else(|| {
                    ApiError::Forbidden(
                        "Authentication required to book for an account".to_string(),
                    )
                })?;

                if !actor.role.is_admin() && actor.id != user_id {
                    return Err(ApiError::Forbidden(
                        "Cannot create bookings for another account".to_string(),
                    ));
                }

                let owner = self.get_account_name(user_id).await?;
                Some(owner)
            }
            None => {
                let all_present = [&req.guest_name, &req.guest_email, &req.guest_phone]
                    .iter()
                    .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()));

                if !all_present {
                    return Err(ApiError::Validation(
                        "Guest bookings require name, email, and phone".to_string(),
                    ));
                }

                req.guest_name.clone()
            }
        };

        let service_name = self.get_service_name(req.service_id).await?;

        let now = Utc::now();
        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        let result = sqlx::query(
            "INSERT INTO bookings (account_id, service_id, date, time, status, notes,
                                   guest_name, guest_email, guest_phone, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(req.user_id)
        .bind(req.service_id)
        .bind(req.date)
        .bind(&req.time)
        .bind(BookingStatus::Pending)
        .bind(&req.notes)
        .bind(&req.guest_name)
        .bind(&req.guest_email)
        .bind(&req.guest_phone)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::Database)?;

        // The code embeds the row id, so the row must exist first
        let id = result.last_insert_rowid();
        let reference_code = generate_reference_code(id);

        sqlx::query("UPDATE bookings SET reference_code = ?1 WHERE id = ?2")
            .bind(&reference_code)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::Database)?;

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!("Created booking {} ({})", id, reference_code);

        Ok(BookingResponse {
            id,
            account_id: req.user_id,
            service_id: req.service_id,
            date: req.date,
            time: req.time,
            status: BookingStatus::Pending,
            notes: req.notes,
            guest_name: req.guest_name,
            guest_email: req.guest_email,
            guest_phone: req.guest_phone,
            reference_code: Some(reference_code),
            client_name,
            service_name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a booking row by id
    pub async fn get_booking(&self, id: i64) -> ApiResult<Booking> {
        sqlx::query_as::<_, Booking>(
            "SELECT id, account_id, service_id, date, time, status, notes,
                    guest_name, guest_email, guest_phone, reference_code, created_at, updated_at
             FROM bookings WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))
    }

    /// List bookings owned by an account, enriched with display names
    pub async fn list_for_account(&self, account_id: i64) -> ApiResult<Vec<BookingResponse>> {
        let rows = sqlx::query(&format!(
            "{} WHERE b.account_id = ?1 ORDER BY b.date, b.time",
            PROJECTION_QUERY
        ))
        .bind(account_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        rows.iter().map(project_row).collect()
    }

    /// List every booking, enriched with display names (admin view)
    pub async fn list_all(&self) -> ApiResult<Vec<BookingResponse>> {
        let rows = sqlx::query(&format!("{} ORDER BY b.date, b.time", PROJECTION_QUERY))
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)?;

        rows.iter().map(project_row).collect()
    }

    /// Load one booking as an enriched view
    pub async fn get_booking_response(&self, id: i64) -> ApiResult<BookingResponse> {
        let row = sqlx::query(&format!("{} WHERE b.id = ?1", PROJECTION_QUERY))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

        project_row(&row)
    }

    /// Apply a general update with role-gated field restrictions
    ///
    /// Non-admin actors may only touch `notes` on their own bookings; any
    /// other supplied field is refused outright rather than partially
    /// applied.
    pub async fn update_booking(
        &self,
        id: i64,
        req: UpdateBookingRequest,
        actor: &Account,
    ) -> ApiResult<BookingResponse> {
        let mut booking = self.get_booking(id).await?;

        if !actor.role.is_admin() {
            if booking.account_id != Some(actor.id) {
                return Err(ApiError::Forbidden(
                    "Cannot modify another account's booking".to_string(),
                ));
            }

            if req.status.is_some()
                || req.service_id.is_some()
                || req.date.is_some()
                || req.time.is_some()
            {
                return Err(ApiError::Forbidden(
                    "Only notes may be updated on your own booking".to_string(),
                ));
            }
        }

        if let Some(service_id) = req.service_id {
            self.get_service_name(service_id).await?;
            booking.service_id = service_id;
        }
        if let Some(date) = req.date {
            booking.date = date;
        }
        if let Some(time) = req.time {
            validate_time_of_day(&time)?;
            booking.time = time;
        }
        if let Some(status) = req.status {
            booking.status = parse_transition(booking.status, &status)?;
        }
        if let Some(notes) = req.notes {
            booking.notes = Some(notes);
        }

        booking.updated_at = Utc::now();

        sqlx::query(
            "UPDATE bookings
             SET service_id = ?1, date = ?2, time = ?3, status = ?4, notes = ?5, updated_at = ?6
             WHERE id = ?7",
        )
        .bind(booking.service_id)
        .bind(booking.date)
        .bind(&booking.time)
        .bind(booking.status)
        .bind(&booking.notes)
        .bind(booking.updated_at)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        self.get_booking_response(id).await
    }

    /// Move a booking through the status state machine (admin operation)
    pub async fn update_status(&self, id: i64, status: &str) -> ApiResult<BookingResponse> {
        let booking = self.get_booking(id).await?;
        let next = parse_transition(booking.status, status)?;

        sqlx::query("UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(next)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        self.get_booking_response(id).await
    }

    /// Delete a booking (admin operation)
    pub async fn delete_booking(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Booking not found".to_string()));
        }

        Ok(())
    }

    async fn get_account_name(&self, id: i64) -> ApiResult<String> {
        sqlx::query_scalar::<_, String>("SELECT name FROM accounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
    }

    async fn get_service_name(&self, id: i64) -> ApiResult<String> {
        sqlx::query_scalar::<_, String>("SELECT name FROM services WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
    }
}

/// Enriched projection over bookings; display names are joined at read
/// time, never stored on the row.
const PROJECTION_QUERY: &str = "SELECT b.id, b.account_id, b.service_id, b.date, b.time, b.status,
        b.notes, b.guest_name, b.guest_email, b.guest_phone, b.reference_code,
        b.created_at, b.updated_at,
        COALESCE(a.name, b.guest_name) AS client_name,
        s.name AS service_name
 FROM bookings b
 JOIN services s ON s.id = b.service_id
 LEFT JOIN accounts a ON a.id = b.account_id";

fn project_row(row: &sqlx::sqlite::SqliteRow) -> ApiResult<BookingResponse> {
    Ok(BookingResponse {
        id: row.get("id"),
        account_id: row.get("account_id"),
        service_id: row.get("service_id"),
        date: row.get("date"),
        time: row.get("time"),
        status: row.get("status"),
        notes: row.get("notes"),
        guest_name: row.get("guest_name"),
        guest_email: row.get("guest_email"),
        guest_phone: row.get("guest_phone"),
        reference_code: row.get("reference_code"),
        client_name: row.get("client_name"),
        service_name: row.get("service_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Parse a requested status and check it against the transition table
fn parse_transition(current: BookingStatus, requested: &str) -> ApiResult<BookingStatus> {
    let next = BookingStatus::parse(requested)
        .ok_or_else(|| ApiError::Validation(format!("Unknown status '{}'", requested)))?;

    if !current.can_transition_to(next) {
        return Err(ApiError::Validation(format!(
            "Cannot transition booking from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    Ok(next)
}

/// Generate a human-readable reference code for a stored booking
fn generate_reference_code(id: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| {
            let idx = rng.gen_range(0..REFERENCE_CHARSET.len());
            REFERENCE_CHARSET[idx] as char
        })
        .collect();

    format!("NA{}{}", suffix, id)
}

/// Validate a "HH:MM" (or "HH:MM:SS") time-of-day string
fn validate_time_of_day(value: &str) -> ApiResult<()> {
    let valid = NaiveTime::parse_from_str(value, "%H:%M").is_ok()
        || NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok();

    if !valid {
        return Err(ApiError::Validation(format!(
            "Invalid time of day '{}'",
            value
        )));
    }

    Ok(())
}
