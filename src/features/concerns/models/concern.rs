use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::concerns::models::ConcernStatus;

/// Database model for a reported concern
#[derive(Debug, Clone, FromRow)]
pub struct Concern {
    pub id: i64,

    // Report information
    pub reporter: Option<String>,
    pub ip: Option<String>,
    pub headers: Option<String>,
    pub document: Option<String>,
    pub comment: Option<String>,

    // Stored as text so rows written under an older status list still load
    pub status: String,

    // Resolution information
    pub resolved: bool,
    pub resolution: Option<String>,
    pub resolver: Option<String>,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Concern {
    pub fn title(&self) -> String {
        format!("Concern #{}", self.id)
    }
}

/// Everything intake writes for a new concern. There is no resolver field;
/// only [`ConcernChanges`] can set one.
#[derive(Debug, Clone)]
pub struct NewConcern {
    pub reporter: Option<String>,
    pub ip: Option<String>,
    pub headers: Option<String>,
    pub document: Option<String>,
    pub comment: Option<String>,
    pub status: ConcernStatus,
}

/// A validated resolution update
#[derive(Debug, Clone)]
pub struct ConcernChanges {
    pub status: ConcernStatus,
    pub resolved: bool,
    pub resolution: Option<String>,
    /// `None` leaves the stored comment untouched
    pub comment: Option<String>,
    /// `None` leaves the stored document untouched
    pub document: Option<String>,
    /// Always the acting identity
    pub resolver: String,
}
