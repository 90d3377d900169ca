//! Storage seams used by the booking service.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{BookingError, Result};
use crate::model::{NewReservation, Reservation, ReservationStatus, User};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fails with [`BookingError::UserNotFound`] for an unknown id.
    async fn get_user(&self, user_id: &str) -> Result<User>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Active reservations on `date`.
    async fn list_active(&self, date: NaiveDate) -> Result<Vec<Reservation>>;

    /// Every stored reservation, cancelled ones included.
    async fn list_all(&self) -> Result<Vec<Reservation>>;

    async fn get(&self, reservation_id: &str) -> Result<Reservation>;

    /// Store a new active reservation. Must fail with
    /// [`BookingError::Conflict`] if an active reservation already holds the
    /// same (room, slot, date), checked atomically with the insert.
    async fn create(&self, reservation: NewReservation) -> Result<Reservation>;

    async fn set_status(&self, reservation_id: &str, status: ReservationStatus) -> Result<()>;
}

/// Users served from a fixed list, typically the configuration file.
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    users: Vec<User>,
}

impl StaticUserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| BookingError::UserNotFound(user_id.to_string()))
    }
}
