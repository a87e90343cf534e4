#![forbid(unsafe_code)]

//! Clarification prompts relayed verbatim to the end user when a tool
//! call cannot proceed.
//!
//! Priority and project get individualized guidance because those are the
//! two fields the conversational model habitually omits or guesses; every
//! other missing-field combination gets one generic enumerated prompt.

use dbl_core::model::PRIORITY_NAMES;
use dbl_core::resolve::Candidate;
use dbl_core::snapshot::TeamSnapshot;

pub(crate) fn project_listing(snapshot: &TeamSnapshot) -> String {
    if snapshot.projects.is_empty() {
        return "(none yet — create a project first)".to_string();
    }
    snapshot
        .projects
        .iter()
        .map(|p| format!("{} ({})", p.name, p.key))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn state_listing(snapshot: &TeamSnapshot) -> String {
    if snapshot.states.is_empty() {
        return "(none configured)".to_string();
    }
    snapshot
        .states
        .iter()
        .map(|s| s.name.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn member_listing(snapshot: &TeamSnapshot) -> String {
    if snapshot.members.is_empty() {
        return "(no members)".to_string();
    }
    snapshot
        .members
        .iter()
        .map(|m| m.user_name.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn label_listing(snapshot: &TeamSnapshot) -> String {
    if snapshot.labels.is_empty() {
        return "(no labels)".to_string();
    }
    snapshot
        .labels
        .iter()
        .map(|l| l.name.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn priority_guidance() -> String {
    format!(
        "Please specify a priority for the issue. Valid priorities: {}.",
        PRIORITY_NAMES.join(", ")
    )
}

pub(crate) fn project_guidance(snapshot: &TeamSnapshot) -> String {
    format!(
        "Please specify which project the issue belongs to. Available projects: {}.",
        project_listing(snapshot)
    )
}

/// Four-way branch: priority only / project only / both / anything else.
pub(crate) fn issue_create_clarification(
    missing: &[&'static str],
    snapshot: &TeamSnapshot,
) -> String {
    let wants_priority = missing.contains(&"priority");
    let wants_project = missing.contains(&"project");
    let others = missing
        .iter()
        .any(|field| *field != "priority" && *field != "project");

    if others {
        return format!(
            "I need a few more details to create the issue. Missing: {}.",
            missing.join(", ")
        );
    }
    match (wants_priority, wants_project) {
        (true, true) => format!("{} {}", priority_guidance(), project_guidance(snapshot)),
        (true, false) => priority_guidance(),
        (false, true) => project_guidance(snapshot),
        // Callers only reach this with at least one missing field.
        (false, false) => String::new(),
    }
}

pub(crate) fn ambiguous_listing(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{} ({})", c.name, c.id))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn ambiguous_message(kind: &str, value: &str, candidates: &[Candidate]) -> String {
    format!(
        "The {kind} '{value}' matches more than one entry: {}. Please say which one you mean.",
        ambiguous_listing(candidates)
    )
}

pub(crate) fn project_not_found_message(value: &str, snapshot: &TeamSnapshot) -> String {
    format!(
        "The project '{value}' was not found. Available projects: {}.",
        project_listing(snapshot)
    )
}

pub(crate) fn state_not_found_message(value: &str, snapshot: &TeamSnapshot) -> String {
    format!(
        "The workflow state '{value}' was not found. Available states: {}.",
        state_listing(snapshot)
    )
}

pub(crate) fn member_not_found_message(value: &str, snapshot: &TeamSnapshot) -> String {
    format!(
        "The user '{value}' was not found. Team members: {}.",
        member_listing(snapshot)
    )
}

pub(crate) fn label_not_found_message(value: &str, snapshot: &TeamSnapshot) -> String {
    format!(
        "The label '{value}' was not found. Available labels: {}.",
        label_listing(snapshot)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbl_core::model::{ProjectStatus, StateType};
    use dbl_core::snapshot::{ProjectRef, StateRef, TeamSnapshot};

    fn snapshot() -> TeamSnapshot {
        TeamSnapshot {
            projects: vec![
                ProjectRef {
                    id: "prj_0001".to_string(),
                    name: "Web".to_string(),
                    key: "web".to_string(),
                    status: ProjectStatus::Active,
                },
                ProjectRef {
                    id: "prj_0002".to_string(),
                    name: "Mobile".to_string(),
                    key: "mob".to_string(),
                    status: ProjectStatus::Active,
                },
            ],
            states: vec![StateRef {
                id: "wfs_0001".to_string(),
                name: "Todo".to_string(),
                state_type: StateType::Unstarted,
            }],
            labels: Vec::new(),
            members: Vec::new(),
        }
    }

    #[test]
    fn priority_only_gets_priority_guidance() {
        let message = issue_create_clarification(&["priority"], &snapshot());
        assert!(message.contains("Valid priorities"));
        assert!(!message.contains("Available projects"));
    }

    #[test]
    fn project_only_gets_the_project_listing() {
        let message = issue_create_clarification(&["project"], &snapshot());
        assert!(message.contains("Available projects: Web (web), Mobile (mob)"));
        assert!(!message.contains("Valid priorities"));
    }

    #[test]
    fn both_missing_composes_both_texts() {
        let message = issue_create_clarification(&["priority", "project"], &snapshot());
        assert!(message.contains("Valid priorities"));
        assert!(message.contains("Available projects"));
    }

    #[test]
    fn any_other_field_switches_to_the_generic_prompt() {
        let message = issue_create_clarification(&["title", "priority"], &snapshot());
        assert!(message.contains("Missing: title, priority"));
        assert!(!message.contains("Valid priorities"));
    }

    #[test]
    fn not_found_messages_enumerate_alternatives() {
        let message = project_not_found_message("xyz", &snapshot());
        assert_eq!(
            message,
            "The project 'xyz' was not found. Available projects: Web (web), Mobile (mob)."
        );
        let message = state_not_found_message("Later", &snapshot());
        assert!(message.contains("Available states: Todo"));
    }
}
