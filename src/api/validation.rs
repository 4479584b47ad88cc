//! Input validation for API requests.
//!
//! Validators return `Result<(), String>` so handlers can collect every
//! violated rule into a `ValidationErrorBuilder` before responding.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::{
    ApplicationStatus, BudgetType, ExperienceLevel, JobStatus, Role, CATEGORIES, DURATIONS,
};

lazy_static! {
    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+$"
    ).unwrap();
}

/// Validate an account name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 100 {
        return Err("Name is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate a registration role (admin cannot be self-assigned)
pub fn validate_register_role(role: &str) -> Result<(), String> {
    match role.parse::<Role>() {
        Ok(Role::Client) | Ok(Role::Freelancer) => Ok(()),
        _ => Err("Role must be either client or freelancer".to_string()),
    }
}

/// Validate any account role
pub fn validate_role(role: &str) -> Result<(), String> {
    role.parse::<Role>().map(|_| ()).map_err(|_| {
        "Invalid role. Must be one of: client, freelancer, admin".to_string()
    })
}

/// Validate a job title
pub fn validate_title(title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.len() < 5 {
        return Err("Title must be at least 5 characters".to_string());
    }

    if trimmed.len() > 200 {
        return Err("Title is too long (max 200 characters)".to_string());
    }

    Ok(())
}

/// Validate a job description
pub fn validate_description(description: &str) -> Result<(), String> {
    let trimmed = description.trim();
    if trimmed.len() < 20 {
        return Err("Description must be at least 20 characters".to_string());
    }

    if trimmed.len() > 10_000 {
        return Err("Description is too long (max 10000 characters)".to_string());
    }

    Ok(())
}

/// Validate a job category against the closed set
pub fn validate_category(category: &str) -> Result<(), String> {
    if !CATEGORIES.contains(&category) {
        return Err(format!(
            "Invalid category. Must be one of: {}",
            CATEGORIES.join(", ")
        ));
    }
    Ok(())
}

/// Validate a budget type
pub fn validate_budget_type(budget_type: &str) -> Result<(), String> {
    budget_type
        .parse::<BudgetType>()
        .map(|_| ())
        .map_err(|_| "Budget type must be either fixed or hourly".to_string())
}

/// Validate a budget amount
pub fn validate_budget_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount < 0.0 {
        return Err("Budget amount must be a non-negative number".to_string());
    }
    Ok(())
}

/// Validate an experience level
pub fn validate_experience(experience: &str) -> Result<(), String> {
    experience.parse::<ExperienceLevel>().map(|_| ()).map_err(|_| {
        "Invalid experience level. Must be one of: entry, intermediate, expert".to_string()
    })
}

/// Validate a job duration (optional field)
pub fn validate_duration(duration: &Option<String>) -> Result<(), String> {
    if let Some(d) = duration {
        if d.is_empty() {
            return Ok(()); // Empty string treated as unset
        }

        if !DURATIONS.contains(&d.as_str()) {
            return Err(format!(
                "Invalid duration. Must be one of: {}",
                DURATIONS.join(", ")
            ));
        }
    }

    Ok(())
}

/// Validate a job status
pub fn validate_job_status(status: &str) -> Result<(), String> {
    status.parse::<JobStatus>().map(|_| ()).map_err(|_| {
        "Invalid status. Must be one of: open, in-progress, completed, cancelled".to_string()
    })
}

/// Validate an accept/reject decision
pub fn validate_decision(decision: &str) -> Result<(), String> {
    match decision.parse::<ApplicationStatus>() {
        Ok(ApplicationStatus::Accepted) | Ok(ApplicationStatus::Rejected) => Ok(()),
        _ => Err("Decision must be either accepted or rejected".to_string()),
    }
}

/// Validate an application proposal
pub fn validate_proposal(proposal: &str) -> Result<(), String> {
    let trimmed = proposal.trim();
    if trimmed.len() < 50 {
        return Err("Proposal must be at least 50 characters".to_string());
    }

    if trimmed.len() > 5_000 {
        return Err("Proposal is too long (max 5000 characters)".to_string());
    }

    Ok(())
}

/// Validate a bid amount
pub fn validate_bid_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount < 0.0 {
        return Err("Bid amount must be a non-negative number".to_string());
    }
    Ok(())
}

/// Validate an estimated duration
pub fn validate_estimated_duration(duration: &str) -> Result<(), String> {
    if duration.trim().is_empty() {
        return Err("Estimated duration is required".to_string());
    }

    if duration.len() > 100 {
        return Err("Estimated duration is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("UX Designer Needed").is_ok());
        assert!(validate_title("12345").is_ok());

        assert!(validate_title("").is_err());
        assert!(validate_title("abcd").is_err());
        assert!(validate_title("    abcd    ").is_err()); // trimmed length counts
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("A description of at least twenty characters.").is_ok());
        assert!(validate_description("too short").is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("Design").is_ok());
        assert!(validate_category("Web Development").is_ok());

        assert!(validate_category("design").is_err()); // exact match required
        assert!(validate_category("Cooking").is_err());
    }

    #[test]
    fn test_validate_budget() {
        assert!(validate_budget_type("fixed").is_ok());
        assert!(validate_budget_type("hourly").is_ok());
        assert!(validate_budget_type("weekly").is_err());

        assert!(validate_budget_amount(500.0).is_ok());
        assert!(validate_budget_amount(0.0).is_ok());
        assert!(validate_budget_amount(-1.0).is_err());
        assert!(validate_budget_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_experience() {
        assert!(validate_experience("entry").is_ok());
        assert!(validate_experience("intermediate").is_ok());
        assert!(validate_experience("expert").is_ok());
        assert!(validate_experience("senior").is_err());
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(&None).is_ok());
        assert!(validate_duration(&Some("".to_string())).is_ok());
        assert!(validate_duration(&Some("1-2 weeks".to_string())).is_ok());
        assert!(validate_duration(&Some("forever".to_string())).is_err());
    }

    #[test]
    fn test_validate_proposal() {
        let long_enough = "x".repeat(50);
        assert!(validate_proposal(&long_enough).is_ok());
        assert!(validate_proposal("too short to be a serious proposal").is_err());
    }

    #[test]
    fn test_validate_decision() {
        assert!(validate_decision("accepted").is_ok());
        assert!(validate_decision("rejected").is_ok());
        assert!(validate_decision("pending").is_err());
        assert!(validate_decision("maybe").is_err());
    }

    #[test]
    fn test_validate_register_role() {
        assert!(validate_register_role("client").is_ok());
        assert!(validate_register_role("freelancer").is_ok());
        assert!(validate_register_role("admin").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "job_id").is_ok());
        assert!(validate_uuid("", "job_id").is_err());
        assert!(validate_uuid("not-a-uuid", "job_id").is_err());
    }
}
