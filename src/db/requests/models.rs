//! Activity request database models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Column value stored in SQLite.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether an admin may assign this status.
    ///
    /// The check depends only on the target. Review outcomes overwrite each
    /// other freely, so an approved request can still be re-marked rejected,
    /// and nothing returns to `Pending`.
    pub fn is_review_outcome(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A stored activity request.
#[derive(Debug, Clone)]
pub struct ActivityRequest {
    pub id: i64,
    pub full_name: String,
    pub group_name: String,
    pub supervisor: String,
    pub activity: String,
    pub file_name: String,
    /// File bytes, base64 encoded.
    pub file_content: String,
    pub file_type: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by a submitter. Status and creation time are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewActivityRequest {
    pub full_name: String,
    pub group_name: String,
    pub supervisor: String,
    pub activity: String,
    pub file_name: String,
    pub file_content: String,
    pub file_type: String,
}

#[cfg(test)]
impl NewActivityRequest {
    pub(crate) fn sample(full_name: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            group_name: "CS-101".to_string(),
            supervisor: "Dr. Petrova".to_string(),
            activity: "Hackathon".to_string(),
            file_name: "certificate.pdf".to_string(),
            file_content: "JVBERi0xLjQ=".to_string(),
            file_type: "application/pdf".to_string(),
        }
    }
}
