//! Common types and helpers shared across models.

use serde::{Deserialize, Serialize};

/// Account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Freelancer,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Freelancer => write!(f, "freelancer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "freelancer" => Ok(Self::Freelancer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Self::Freelancer)
    }
}

/// Lifecycle of a job posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown job status: {}", s)),
        }
    }
}

/// Lifecycle of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown application status: {}", s)),
        }
    }
}

/// Billing model for a job budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetType {
    Fixed,
    Hourly,
}

impl std::fmt::Display for BudgetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Hourly => write!(f, "hourly"),
        }
    }
}

impl std::str::FromStr for BudgetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "hourly" => Ok(Self::Hourly),
            _ => Err(format!("Unknown budget type: {}", s)),
        }
    }
}

/// Required experience level for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Intermediate,
    Expert,
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Expert => write!(f, "expert"),
        }
    }
}

impl std::str::FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entry" => Ok(Self::Entry),
            "intermediate" => Ok(Self::Intermediate),
            "expert" => Ok(Self::Expert),
            _ => Err(format!("Unknown experience level: {}", s)),
        }
    }
}

/// Closed set of job categories
pub const CATEGORIES: [&str; 7] = [
    "Web Development",
    "Mobile Development",
    "Design",
    "Writing",
    "Marketing",
    "Data Science",
    "Other",
];

/// Closed set of job durations
pub const DURATIONS: [&str; 6] = [
    "less than 1 week",
    "1-2 weeks",
    "2-4 weeks",
    "1-3 months",
    "3-6 months",
    "more than 6 months",
];

/// Helper to parse a skills JSON array from the database
pub fn parse_skills(json: Option<&str>) -> Vec<String> {
    json.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

/// Helper to serialize skills to JSON for the database
pub fn serialize_skills(skills: &[String]) -> Option<String> {
    if skills.is_empty() {
        None
    } else {
        serde_json::to_string(skills).ok()
    }
}

/// Pagination metadata returned alongside every list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// 1-indexed current page
    pub current: i64,
    /// Total number of pages
    pub total: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    /// Compute metadata for `matching` total rows at `limit` per page.
    pub fn new(page: i64, limit: i64, matching: i64) -> Self {
        let total = (matching as f64 / limit as f64).ceil() as i64;
        Self {
            current: page,
            total,
            has_next: page * limit < matching,
            has_prev: page > 1,
        }
    }
}

/// Envelope for paginated list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in ["client", "freelancer", "admin"] {
            let parsed: Role = role.parse().unwrap();
            assert_eq!(parsed.to_string(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_job_status_round_trip() {
        for status in ["open", "in-progress", "completed", "cancelled"] {
            let parsed: JobStatus = status.parse().unwrap();
            assert_eq!(parsed.to_string(), status);
        }
        assert!("paused".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_page_meta_math() {
        let meta = PageMeta::new(1, 10, 25);
        assert_eq!(meta.total, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let meta = PageMeta::new(3, 10, 25);
        assert!(!meta.has_next);
        assert!(meta.has_prev);

        let meta = PageMeta::new(1, 10, 0);
        assert_eq!(meta.total, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);

        // exact multiple: last page has no next
        let meta = PageMeta::new(2, 10, 20);
        assert_eq!(meta.total, 2);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_skills_round_trip() {
        let skills = vec!["rust".to_string(), "sql".to_string()];
        let json = serialize_skills(&skills).unwrap();
        assert_eq!(parse_skills(Some(&json)), skills);
        assert!(parse_skills(None).is_empty());
        assert!(serialize_skills(&[]).is_none());
    }
}
