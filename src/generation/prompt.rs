//! Prompt construction for the task generation pipeline.
//!
//! Pure string formatting over a [`ProjectContext`]: no I/O, no failure
//! mode. Absent fields render as empty placeholders rather than errors.

use std::fmt::Write;

use super::context::ProjectContext;

/// Fixed system instruction sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are a marketing project planner for a creative agency. \
You respond only with a JSON array of task objects. \
Never include prose, markdown, or explanations outside the array.";

/// Build the user prompt for one project.
///
/// Deterministically embeds the project, company, and team context, plus
/// the output contract the model must follow.
pub fn build_prompt(ctx: &ProjectContext) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Generate a task breakdown for the following marketing project.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Project:");
    let _ = writeln!(prompt, "- Name: {}", ctx.name);
    let _ = writeln!(prompt, "- Description: {}", ctx.description);
    let _ = writeln!(prompt, "- Category: {}", ctx.category);
    let _ = writeln!(prompt, "- Deadline: {}", ctx.deadline);
    let _ = writeln!(prompt, "- Priority: {}", ctx.priority.as_str());
    let _ = writeln!(prompt, "- Team size: {}", ctx.team_size);
    if ctx.is_recurring {
        let _ = writeln!(prompt, "- Recurring: yes (every {})", ctx.repeat_interval);
    } else {
        let _ = writeln!(prompt, "- Recurring: no");
    }

    let company = &ctx.company_context;
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Company:");
    let _ = writeln!(prompt, "- Industry: {}", company.industry);
    let _ = writeln!(prompt, "- Location: {}", company.location);
    let _ = writeln!(prompt, "- About: {}", company.about);
    let _ = writeln!(prompt, "- Target audience: {}", company.target_audience);
    let _ = writeln!(prompt, "- Marketing goals: {}", company.marketing_goals);

    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Team members (assign tasks by email):");
    for member in &ctx.team_members {
        let services = member
            .services
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(prompt, "- {}: {}", member.email, services);
    }

    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Return a JSON array of task objects with exactly these fields: \
         title, description, due_date (YYYY-MM-DD, on or before the deadline), \
         priority (high, medium, or low), \
         assignee_id (a team member email from the list above, or null), \
         required_service."
    );
    let _ = write!(
        prompt,
        "Return only the JSON array, with no additional prose before or after it."
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::context::{CompanyContext, Priority, Service, TeamMember};

    fn sample_context() -> ProjectContext {
        ProjectContext {
            name: "Spring Launch".to_string(),
            description: "Launch campaign for the spring collection".to_string(),
            category: "social".to_string(),
            deadline: "2025-03-15".to_string(),
            priority: Priority::High,
            team_size: 2,
            is_recurring: true,
            repeat_interval: "month".to_string(),
            company_context: CompanyContext {
                industry: "fashion".to_string(),
                location: "Berlin".to_string(),
                about: "Mid-size fashion label".to_string(),
                target_audience: "18-30".to_string(),
                marketing_goals: "grow social reach".to_string(),
            },
            team_members: vec![
                TeamMember {
                    id: "tm_1".to_string(),
                    email: "alice@co.com".to_string(),
                    services: vec![
                        Service { name: "design".to_string() },
                        Service { name: "branding".to_string() },
                    ],
                },
                TeamMember {
                    id: "tm_2".to_string(),
                    email: "bob@co.com".to_string(),
                    services: vec![],
                },
            ],
        }
    }

    #[test]
    fn prompt_contains_project_and_team_details() {
        let ctx = sample_context();
        let prompt = build_prompt(&ctx);

        assert!(prompt.contains("Spring Launch"));
        assert!(prompt.contains("2025-03-15"));
        assert!(prompt.contains("alice@co.com"));
        assert!(prompt.contains("bob@co.com"));
        assert!(prompt.contains("design, branding"));
        assert!(prompt.contains("Recurring: yes (every month)"));
    }

    #[test]
    fn prompt_embeds_output_contract() {
        let prompt = build_prompt(&sample_context());
        for field in [
            "title",
            "description",
            "due_date",
            "priority",
            "assignee_id",
            "required_service",
        ] {
            assert!(prompt.contains(field), "missing field name: {field}");
        }
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let ctx = sample_context();
        assert_eq!(build_prompt(&ctx), build_prompt(&ctx));
    }

    #[test]
    fn empty_fields_render_as_placeholders() {
        let mut ctx = sample_context();
        ctx.description = String::new();
        ctx.is_recurring = false;
        let prompt = build_prompt(&ctx);
        assert!(prompt.contains("- Description: \n"));
        assert!(prompt.contains("Recurring: no"));
    }
}
