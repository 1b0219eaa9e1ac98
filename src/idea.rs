//! Core data structures for the ideaboard application.
//!
//! This module contains the idea record and the two closed vocabularies it
//! carries: the pipeline status and the priority.
use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use clap::ValueEnum;
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::PlanError;

/// Length of the random part of a generated identifier
const ID_SUFFIX_LEN: usize = 8;

/// Pipeline stage of an idea
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Review,
    Ready,
    Published,
}

impl Status {
    /// All statuses in pipeline order
    pub const ALL: [Status; 4] = [
        Status::Draft,
        Status::Review,
        Status::Ready,
        Status::Published,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Review => "review",
            Status::Ready => "ready",
            Status::Published => "published",
        }
    }

    /// Column heading used by the pipeline and dashboard views
    pub fn label(&self) -> &'static str {
        match self {
            Status::Draft => "Drafts",
            Status::Review => "In review",
            Status::Ready => "Ready",
            Status::Published => "Published",
        }
    }

    /// Exact match against the allow-list, falling back to `Draft`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Status::Draft),
            "review" => Ok(Status::Review),
            "ready" => Ok(Status::Ready),
            "published" => Ok(Status::Published),
            _ => Err(PlanError::InvalidFormat {
                message: format!("Invalid status: {}", s),
            }),
        }
    }
}

/// Priority of an idea
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Exact match against the allow-list, falling back to `Medium`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(PlanError::InvalidFormat {
                message: format!("Invalid priority: {}", s),
            }),
        }
    }
}

/// Represents a single post idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Unique identifier, never changed after creation
    pub id: String,
    /// Idea title
    pub title: String,
    /// Draft text of the post
    pub content: String,
    /// Pipeline stage
    pub status: Status,
    /// Priority
    pub priority: Priority,
    /// Tags for organization
    pub tags: Vec<String>,
    /// When the idea was created (ISO-8601 text)
    pub created_at: String,
    /// Last modification time (ISO-8601 text)
    pub updated_at: String,
}

impl Idea {
    /// Creates a new draft idea with a fresh id and both timestamps set to now
    pub fn new(title: String, content: String, tags: Vec<String>) -> Self {
        let now = timestamp_now();

        Idea {
            id: generate_id(),
            title,
            content,
            status: Status::default(),
            priority: Priority::default(),
            tags,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Refreshes `updated_at` to the current instant
    pub fn touch(&mut self) {
        self.updated_at = timestamp_now();
    }

    /// Creation instant, if `created_at` holds a parseable date
    pub fn created_instant(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.created_at)
    }
}

/// Current instant in the millisecond `YYYY-MM-DDTHH:MM:SS.sssZ` form
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 instant or a bare `YYYY-MM-DD` date (midnight UTC)
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Generates an identifier from the current millisecond timestamp and a random suffix
pub fn generate_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_exact() {
        assert_eq!("review".parse::<Status>().unwrap(), Status::Review);
        assert!("Review".parse::<Status>().is_err());
        assert_eq!(Status::parse_or_default(Some("not-a-real-status")), Status::Draft);
        assert_eq!(Status::parse_or_default(None), Status::Draft);
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::parse_or_default(Some("high")), Priority::High);
        assert_eq!(Priority::parse_or_default(Some("urgent")), Priority::Medium);
        assert_eq!(Priority::parse_or_default(None), Priority::Medium);
    }

    #[test]
    fn new_idea_has_matching_timestamps() {
        let idea = Idea::new("Title".into(), "Body".into(), vec![]);
        assert_eq!(idea.status, Status::Draft);
        assert_eq!(idea.priority, Priority::Medium);
        assert_eq!(idea.created_at, idea.updated_at);
        assert!(idea.created_instant().is_some());
        assert!(idea.created_at.ends_with('Z'));
    }

    #[test]
    fn generated_ids_differ() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.split('-').nth(1).map(str::len), Some(ID_SUFFIX_LEN));
    }

    #[test]
    fn parses_date_only_values() {
        let instant = parse_instant("2024-03-01").unwrap();
        assert_eq!(format_timestamp(instant), "2024-03-01T00:00:00.000Z");
        assert!(parse_instant("yesterday").is_none());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let idea = Idea::new("T".into(), "C".into(), vec!["x".into()]).with_status(Status::Ready);
        let json = serde_json::to_value(&idea).unwrap();
        assert_eq!(json["status"], "ready");
        assert!(json.get("createdAt").is_some());
    }
}
