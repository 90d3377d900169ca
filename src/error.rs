use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Room {0} is not available for booking")]
    RoomUnavailable(String),

    #[error("Time slot {0} is not active")]
    SlotInactive(String),

    #[error("Booking window is closed for {0}")]
    WindowClosed(String),

    #[error("After-school limit reached: {count} of {limit} already booked on {date}")]
    AfterSchoolQuotaExceeded {
        date: String,
        count: usize,
        limit: usize,
    },

    #[error("Already booked by {booked_by} (reservation {reservation_id})")]
    AlreadyBooked {
        reservation_id: String,
        booked_by: String,
    },

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("Reservation {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    #[error("Unknown time slot: {0}")]
    UnknownSlot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BookingError>;
