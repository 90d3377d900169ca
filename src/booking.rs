//! Accepts or rejects booking and cancellation attempts.
//!
//! Decisions are made against an in-memory snapshot of active reservations
//! and never touch storage. An accepted attempt yields a command for the
//! repository to carry out.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::calendar::format_hhmm;
use crate::config::Config;
use crate::eligibility::{window_state, WindowState};
use crate::error::{BookingError, Result};
use crate::model::{
    is_valid_student_id, NewReservation, Reservation, ReservationStatus, SlotCategory, User,
};
use crate::query::{active_reservation_for, after_school_count_today};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub room_id: String,
    pub slot_id: String,
    pub date: NaiveDate,
    /// Student id and name as entered for this booking.
    pub student_id: String,
    pub student_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingDecision {
    /// Create this reservation.
    Create(NewReservation),
    /// The slot is already held and the caller may cancel the holder instead.
    OfferCancel(Reservation),
}

/// Status change emitted by an accepted cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub reservation_id: String,
    pub status: ReservationStatus,
}

fn validate_request(request: &BookingRequest) -> Result<()> {
    if !is_valid_student_id(&request.student_id) {
        return Err(BookingError::Validation(format!(
            "student id '{}' must be exactly 5 digits",
            request.student_id
        )));
    }
    if request.student_name.trim().is_empty() {
        return Err(BookingError::Validation(
            "student name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Decide a booking attempt by `user` at `now`.
///
/// Checks run in order: input validation, existing holder, room and slot
/// flags, the after-school limit, then the booking window. Admins skip the
/// window check only.
pub fn attempt_booking(
    config: &Config,
    user: &User,
    request: &BookingRequest,
    active: &[Reservation],
    now: NaiveDateTime,
) -> Result<BookingDecision> {
    validate_request(request)?;

    let room = config.room(&request.room_id)?;
    let slot = config.slot(&request.slot_id)?;

    if let Some(holder) = active_reservation_for(active, &room.id, &slot.id, request.date) {
        if user.is_admin() || holder.user_id == user.id {
            debug!(
                "User {} may cancel reservation {} instead of booking",
                user.id, holder.id
            );
            return Ok(BookingDecision::OfferCancel(holder.clone()));
        }
        info!(
            "Rejected {} for {} {} on {}: already booked by {}",
            user.id, room.id, slot.id, request.date, holder.student_name
        );
        return Err(BookingError::AlreadyBooked {
            reservation_id: holder.id.clone(),
            booked_by: holder.student_name.clone(),
        });
    }

    if !room.available {
        return Err(BookingError::RoomUnavailable(room.name.clone()));
    }
    if !slot.active {
        return Err(BookingError::SlotInactive(slot.name.clone()));
    }

    if slot.category == SlotCategory::AfterSchool {
        let limit = config.system.max_after_school_per_day;
        let count = after_school_count_today(
            active,
            &config.slots,
            &user.id,
            request.date,
            config.system.quota_scope,
        );
        if count >= limit {
            info!(
                "Rejected {} for {}: after-school limit {} reached on {}",
                user.id, slot.id, limit, request.date
            );
            return Err(BookingError::AfterSchoolQuotaExceeded {
                date: request.date.to_string(),
                count,
                limit,
            });
        }
    }

    if !user.is_admin() {
        let kind = slot.category.window_kind();
        let state = window_state(&config.schedule, now, request.date, kind, Some(user.grade()));
        if !state.is_open() {
            let detail = match state {
                WindowState::OpensAt { opens_at } => {
                    format!("{} on {} (opens {})", kind, request.date, format_hhmm(opens_at))
                }
                _ => format!("{} on {}", kind, request.date),
            };
            info!("Rejected {} for {}: window closed, {}", user.id, slot.id, detail);
            return Err(BookingError::WindowClosed(detail));
        }
    }

    info!(
        "Accepted booking of {} {} on {} for {}",
        room.id, slot.id, request.date, user.id
    );
    Ok(BookingDecision::Create(NewReservation {
        user_id: user.id.clone(),
        room_id: room.id.clone(),
        slot_id: slot.id.clone(),
        date: request.date,
        student_id: request.student_id.clone(),
        student_name: request.student_name.trim().to_string(),
        requested_at: now,
    }))
}

/// Decide whether `user` may cancel `reservation`. Owners and admins may.
pub fn attempt_cancellation(user: &User, reservation: &Reservation) -> Result<StatusUpdate> {
    if !user.is_admin() && reservation.user_id != user.id {
        return Err(BookingError::NotAuthorized(format!(
            "user {} does not own reservation {}",
            user.id, reservation.id
        )));
    }
    if !reservation.is_active() {
        return Err(BookingError::AlreadyCancelled(reservation.id.clone()));
    }
    info!("Accepted cancellation of {} by {}", reservation.id, user.id);
    Ok(StatusUpdate {
        reservation_id: reservation.id.clone(),
        status: ReservationStatus::Cancelled,
    })
}
