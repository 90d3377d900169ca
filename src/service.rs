//! Boundary orchestration: look up the caller, load a snapshot, decide, then
//! persist the decision.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use crate::booking::{attempt_booking, attempt_cancellation, BookingDecision, BookingRequest};
use crate::calendar::Clock;
use crate::cleanup::{reservations_to_cleanup, CleanupKind};
use crate::config::Config;
use crate::eligibility::{window_state, WindowState};
use crate::error::{BookingError, Result};
use crate::model::{Reservation, ReservationStatus, TimeSlot};
use crate::query::active_reservation_for;
use crate::repository::{ReservationRepository, UserDirectory};

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Booked(Reservation),
    /// The slot is held and the caller is allowed to cancel the holder.
    CancelAvailable(Reservation),
}

#[derive(Debug, Clone)]
pub struct RoomAvailability {
    pub room_id: String,
    pub room_name: String,
    pub room_available: bool,
    pub holder: Option<Reservation>,
}

#[derive(Debug, Clone)]
pub struct SlotAvailability {
    pub slot: TimeSlot,
    pub window: WindowState,
    pub rooms: Vec<RoomAvailability>,
}

#[derive(Clone)]
pub struct BookingService {
    config: Arc<Config>,
    users: Arc<dyn UserDirectory>,
    reservations: Arc<dyn ReservationRepository>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(
        config: Arc<Config>,
        users: Arc<dyn UserDirectory>,
        reservations: Arc<dyn ReservationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            users,
            reservations,
            clock,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn book(&self, user_id: &str, request: BookingRequest) -> Result<BookingOutcome> {
        let user = self.users.get_user(user_id).await?;
        let active = self.reservations.list_active(request.date).await?;

        let decision = attempt_booking(&self.config, &user, &request, &active, self.clock.now())?;
        let new_reservation = match decision {
            BookingDecision::OfferCancel(existing) => {
                return Ok(BookingOutcome::CancelAvailable(existing));
            }
            BookingDecision::Create(new_reservation) => new_reservation,
        };

        match self.reservations.create(new_reservation).await {
            Ok(created) => {
                info!("Created reservation {}", created.id);
                Ok(BookingOutcome::Booked(created))
            }
            Err(BookingError::Conflict(reason)) => {
                warn!("Lost booking race for {}: {}", user.id, reason);
                let active = self.reservations.list_active(request.date).await?;
                let holder =
                    active_reservation_for(&active, &request.room_id, &request.slot_id, request.date);
                Err(BookingError::AlreadyBooked {
                    reservation_id: holder.map(|r| r.id.clone()).unwrap_or_default(),
                    booked_by: holder.map(|r| r.student_name.clone()).unwrap_or(reason),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn cancel(&self, user_id: &str, reservation_id: &str) -> Result<Reservation> {
        let user = self.users.get_user(user_id).await?;
        let reservation = self.reservations.get(reservation_id).await?;

        let update = attempt_cancellation(&user, &reservation)?;
        self.reservations
            .set_status(&update.reservation_id, update.status)
            .await?;

        Ok(Reservation {
            status: update.status,
            ..reservation
        })
    }

    /// Cancel everything a sweep of `kind` selects. Returns the ids cancelled.
    pub async fn run_cleanup(&self, kind: CleanupKind, reference_date: NaiveDate) -> Result<Vec<String>> {
        let all = self.reservations.list_all().await?;
        let targets = reservations_to_cleanup(
            &all,
            &self.config.slots,
            kind,
            reference_date,
            self.config.system.weekly_cleanup.exclude_after_school,
        );

        let mut cancelled = Vec::with_capacity(targets.len());
        for reservation in targets {
            match self
                .reservations
                .set_status(&reservation.id, ReservationStatus::Cancelled)
                .await
            {
                Ok(()) => cancelled.push(reservation.id),
                Err(BookingError::ReservationNotFound(id)) => {
                    warn!("Reservation {} disappeared during {} cleanup", id, kind);
                }
                Err(e) => return Err(e),
            }
        }

        info!("{} cleanup cancelled {} reservations", kind, cancelled.len());
        Ok(cancelled)
    }

    /// Per-slot view of `date` for `user_id`: window state and who holds
    /// each room.
    pub async fn availability(&self, user_id: &str, date: NaiveDate) -> Result<Vec<SlotAvailability>> {
        let user = self.users.get_user(user_id).await?;
        let active = self.reservations.list_active(date).await?;
        let now = self.clock.now();

        Ok(self
            .config
            .slots
            .iter()
            .map(|slot| SlotAvailability {
                slot: slot.clone(),
                window: window_state(
                    &self.config.schedule,
                    now,
                    date,
                    slot.category.window_kind(),
                    Some(user.grade()),
                ),
                rooms: self
                    .config
                    .rooms
                    .iter()
                    .map(|room| RoomAvailability {
                        room_id: room.id.clone(),
                        room_name: room.name.clone(),
                        room_available: room.available,
                        holder: active_reservation_for(&active, &room.id, &slot.id, date).cloned(),
                    })
                    .collect(),
            })
            .collect())
    }

    pub async fn reservations_on(&self, date: NaiveDate) -> Result<Vec<Reservation>> {
        self.reservations.list_active(date).await
    }
}
