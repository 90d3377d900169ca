use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{BookingError, Result};
use crate::model::{NewReservation, Reservation, ReservationStatus};
use crate::repository::ReservationRepository;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    reservations: Vec<Reservation>,
}

/// Reservation repository kept in memory and, when given a path, written
/// back to a JSON file after every change.
#[derive(Debug)]
pub struct ReservationStore {
    path: Option<PathBuf>,
    reservations: Mutex<Vec<Reservation>>,
}

impl ReservationStore {
    pub fn in_memory() -> Self {
        Self::with_reservations(Vec::new())
    }

    pub fn with_reservations(reservations: Vec<Reservation>) -> Self {
        Self {
            path: None,
            reservations: Mutex::new(reservations),
        }
    }

    /// Load the store from file, or start empty if it doesn't exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self {
                path: Some(path),
                reservations: Mutex::new(Vec::new()),
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            BookingError::Config(format!(
                "Failed to read reservations file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let file: StoreFile = serde_json::from_str(&content)?;

        debug!(
            "Loaded {} reservations from {}",
            file.reservations.len(),
            path.display()
        );
        Ok(Self {
            path: Some(path),
            reservations: Mutex::new(file.reservations),
        })
    }

    async fn save(&self, reservations: &[Reservation]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = StoreFile {
            reservations: reservations.to_vec(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        tokio::fs::write(path, content).await.map_err(|e| {
            BookingError::Config(format!(
                "Failed to write reservations file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for ReservationStore {
    async fn list_active(&self, date: NaiveDate) -> Result<Vec<Reservation>> {
        let reservations = self.reservations.lock().await;
        Ok(reservations
            .iter()
            .filter(|r| r.is_active() && r.date == date)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Reservation>> {
        Ok(self.reservations.lock().await.clone())
    }

    async fn get(&self, reservation_id: &str) -> Result<Reservation> {
        self.reservations
            .lock()
            .await
            .iter()
            .find(|r| r.id == reservation_id)
            .cloned()
            .ok_or_else(|| BookingError::ReservationNotFound(reservation_id.to_string()))
    }

    async fn create(&self, reservation: NewReservation) -> Result<Reservation> {
        let mut reservations = self.reservations.lock().await;

        // Checked under the same lock as the insert.
        if let Some(existing) = reservations.iter().find(|r| {
            r.is_active() && r.matches(&reservation.room_id, &reservation.slot_id, reservation.date)
        }) {
            return Err(BookingError::Conflict(format!(
                "room {} slot {} on {} is held by reservation {}",
                reservation.room_id, reservation.slot_id, reservation.date, existing.id
            )));
        }

        let created = reservation.into_reservation(Uuid::new_v4().to_string());
        reservations.push(created.clone());
        if let Err(e) = self.save(&reservations).await {
            reservations.pop();
            return Err(e);
        }
        Ok(created)
    }

    async fn set_status(&self, reservation_id: &str, status: ReservationStatus) -> Result<()> {
        let mut reservations = self.reservations.lock().await;
        let entry = reservations
            .iter_mut()
            .find(|r| r.id == reservation_id)
            .ok_or_else(|| BookingError::ReservationNotFound(reservation_id.to_string()))?;
        if !entry.is_active() && status == ReservationStatus::Active {
            return Err(BookingError::Conflict(format!(
                "reservation {} is cancelled and cannot be reactivated",
                reservation_id
            )));
        }
        let previous = std::mem::replace(&mut entry.status, status);

        if let Err(e) = self.save(&reservations).await {
            if let Some(entry) = reservations.iter_mut().find(|r| r.id == reservation_id) {
                entry.status = previous;
            }
            return Err(e);
        }
        Ok(())
    }
}
