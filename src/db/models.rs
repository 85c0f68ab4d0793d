use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            other => Err(RepositoryError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub full_name: String,
    pub email: String,
    pub project_title: String,
    pub project_description: String,
    pub video_link: Option<String>,
    pub presentation_url: String,
    pub paper_url: Option<String>,
    pub logo_url: Option<String>,
    pub status: SubmissionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub project_title: String,
    pub project_description: String,
    pub video_link: Option<String>,
    pub presentation_url: String,
    pub paper_url: Option<String>,
    pub logo_url: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub id: i64,
    pub full_name: String,
    pub project_title: String,
    pub created_at: DateTime<Utc>,
}

impl From<Submission> for CalendarEntry {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id,
            full_name: s.full_name,
            project_title: s.project_title,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SubmissionRow {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub project_title: String,
    pub project_description: String,
    pub video_link: Option<String>,
    pub presentation_url: String,
    pub paper_url: Option<String>,
    pub logo_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = RepositoryError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse()?,
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            project_title: row.project_title,
            project_description: row.project_description,
            video_link: row.video_link,
            presentation_url: row.presentation_url,
            paper_url: row.paper_url,
            logo_url: row.logo_url,
            created_at: row.created_at,
        })
    }
}
