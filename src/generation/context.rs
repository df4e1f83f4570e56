//! Input and output types for the task generation pipeline.

use serde::{Deserialize, Serialize};

/// Project priority as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// A service a team member can provide (e.g. "design", "copywriting").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
}

/// A candidate assignee for generated tasks.
///
/// Emails are expected to be unique within one `ProjectContext`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub services: Vec<Service>,
}

/// Free-text description of the company the project belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyContext {
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub marketing_goals: String,
}

/// Everything the pipeline needs to derive tasks for one project.
///
/// Constructed by the caller per invocation and discarded afterwards;
/// the pipeline never mutates or retains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Project deadline, `YYYY-MM-DD`. Also the fallback due date for
    /// generated tasks whose date fails validation.
    pub deadline: String,
    pub priority: Priority,
    pub team_size: u32,
    #[serde(default)]
    pub is_recurring: bool,
    /// Only meaningful when `is_recurring` is set.
    #[serde(default)]
    pub repeat_interval: String,
    #[serde(default)]
    pub company_context: CompanyContext,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
}

impl ProjectContext {
    /// Case-insensitive team member lookup by email.
    pub fn member_id_for_email(&self, email: &str) -> Option<&str> {
        self.team_members
            .iter()
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .map(|m| m.id.as_str())
    }
}

/// A task derived from model output, validated and defaulted.
///
/// Owned by the caller after generation; the pipeline does not persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTask {
    pub title: String,
    pub description: String,
    /// Always a `YYYY-MM-DD` string: either the model's (validated) value
    /// or the project deadline.
    pub due_date: String,
    /// Lower-cased; defaults to "medium".
    pub priority: String,
    /// Id of a team member from the input context, or `None` when the
    /// model's reference could not be resolved.
    pub assignee_id: Option<String>,
    pub required_service: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, email: &str) -> TeamMember {
        TeamMember {
            id: id.to_string(),
            email: email.to_string(),
            services: vec![],
        }
    }

    fn context_with_members(members: Vec<TeamMember>) -> ProjectContext {
        ProjectContext {
            name: "Spring Launch".to_string(),
            description: String::new(),
            category: String::new(),
            deadline: "2025-03-15".to_string(),
            priority: Priority::High,
            team_size: members.len() as u32,
            is_recurring: false,
            repeat_interval: String::new(),
            company_context: CompanyContext::default(),
            team_members: members,
        }
    }

    #[test]
    fn email_lookup_is_case_insensitive() {
        let ctx = context_with_members(vec![member("tm_1", "Alice@Co.com")]);
        assert_eq!(ctx.member_id_for_email("alice@co.com"), Some("tm_1"));
        assert_eq!(ctx.member_id_for_email("ALICE@CO.COM"), Some("tm_1"));
        assert_eq!(ctx.member_id_for_email("bob@co.com"), None);
    }

    #[test]
    fn context_deserializes_with_defaults() {
        let body = r#"{
            "name": "Brand Refresh",
            "deadline": "2025-06-01",
            "priority": "medium",
            "team_size": 2
        }"#;
        let ctx: ProjectContext = serde_json::from_str(body).unwrap();
        assert_eq!(ctx.name, "Brand Refresh");
        assert_eq!(ctx.priority, Priority::Medium);
        assert!(!ctx.is_recurring);
        assert!(ctx.team_members.is_empty());
        assert_eq!(ctx.company_context.industry, "");
    }

    #[test]
    fn generated_task_serializes_null_assignee() {
        let task = GeneratedTask {
            title: "X".to_string(),
            description: String::new(),
            due_date: "2025-04-01".to_string(),
            priority: "medium".to_string(),
            assignee_id: None,
            required_service: String::new(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert!(json["assignee_id"].is_null());
    }
}
