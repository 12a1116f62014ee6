use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Week '{week_id}' not found")]
    WeekNotFound { week_id: String },

    #[error("Shift '{shift_id}' not found")]
    ShiftNotFound { shift_id: String },

    #[error("Unit '{unit_id}' is not in the rotation list")]
    UnknownUnit { unit_id: String },

    #[error("Week '{week_id}' already exists")]
    WeekExists { week_id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
