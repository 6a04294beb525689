use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::concerns::models::Concern;

/// Request DTO for reporting a concern.
///
/// Only the comment and the page snapshot come from the reporter; identity,
/// origin and headers are taken from the request itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReportConcernDto {
    #[validate(length(max = 20000, message = "Comment must not exceed 20000 characters"))]
    #[serde(default)]
    pub comment: Option<String>,

    #[validate(length(max = 2000000, message = "Document must not exceed 2000000 characters"))]
    #[serde(default)]
    pub document: Option<String>,
}

/// Response DTO after a concern has been reported
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportConcernResponseDto {
    pub id: i64,
}

/// Request DTO for resolving a concern.
///
/// The resolver is deliberately absent: it is always the acting user, and a
/// `resolver` key in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResolveConcernDto {
    /// Must be one of the configured statuses
    #[validate(length(min = 1, max = 100, message = "Status must be 1-100 characters"))]
    pub status: String,

    /// Absent means not resolved. Form posts may send `on`/`off`.
    #[serde(default, deserialize_with = "deserialize_checkbox")]
    pub resolved: bool,

    /// Absent clears any previous resolution
    #[validate(length(max = 20000, message = "Resolution must not exceed 20000 characters"))]
    #[serde(default)]
    pub resolution: Option<String>,

    /// Absent keeps the reported comment
    #[validate(length(max = 20000, message = "Comment must not exceed 20000 characters"))]
    #[serde(default)]
    pub comment: Option<String>,

    /// Absent keeps the reported document
    #[validate(length(max = 2000000, message = "Document must not exceed 2000000 characters"))]
    #[serde(default)]
    pub document: Option<String>,
}

fn deserialize_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Checkbox {
        Bool(bool),
        Text(String),
    }

    match Checkbox::deserialize(deserializer)? {
        Checkbox::Bool(value) => Ok(value),
        Checkbox::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" | "yes" => Ok(true),
            "" | "off" | "false" | "0" | "no" => Ok(false),
            other => Err(de::Error::custom(format!(
                "invalid value for resolved: '{}'",
                other
            ))),
        },
    }
}

/// Full concern as shown on the detail page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConcernResponseDto {
    pub id: i64,
    pub title: String,
    pub reporter: Option<String>,
    pub ip: Option<String>,
    pub headers: Option<String>,
    pub document: Option<String>,
    pub comment: Option<String>,
    pub status: String,
    pub resolved: bool,
    pub resolution: Option<String>,
    pub resolver: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Concern row in the review list; the large text blobs are left out
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConcernListItemDto {
    pub id: i64,
    pub title: String,
    pub reporter: Option<String>,
    pub comment: Option<String>,
    pub status: String,
    pub resolved: bool,
    pub resolver: Option<String>,
    pub created: DateTime<Utc>,
}

impl From<Concern> for ConcernResponseDto {
    fn from(c: Concern) -> Self {
        Self {
            title: c.title(),
            id: c.id,
            reporter: c.reporter,
            ip: c.ip,
            headers: c.headers,
            document: c.document,
            comment: c.comment,
            status: c.status,
            resolved: c.resolved,
            resolution: c.resolution,
            resolver: c.resolver,
            created: c.created,
            modified: c.modified,
        }
    }
}

impl From<Concern> for ConcernListItemDto {
    fn from(c: Concern) -> Self {
        Self {
            title: c.title(),
            id: c.id,
            reporter: c.reporter,
            comment: c.comment,
            status: c.status,
            resolved: c.resolved,
            resolver: c.resolver,
            created: c.created,
        }
    }
}
