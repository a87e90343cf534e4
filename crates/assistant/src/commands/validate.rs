#![forbid(unsafe_code)]

//! Required-field validation and reference resolution for mutation
//! commands. Verdicts either carry a fully-resolved request (identifiers
//! only, never raw names) or the clarification the model should relay.

use crate::commands::draft::{
    InviteDraft, IssueBulkUpdateDraft, IssueCreateDraft, IssueUpdateDraft, ProjectCreateDraft,
    ProjectUpdateDraft,
};
use crate::support::{
    ai_error, ai_error_with, ambiguous_message, issue_create_clarification,
    label_not_found_message, member_not_found_message, project_not_found_message,
    state_not_found_message,
};
use dbl_core::model::{
    DEFAULT_PROJECT_COLOR, MEMBER_ROLE_NAMES, MemberRole, PROJECT_STATUS_NAMES, Priority,
    ProjectStatus,
};
use dbl_core::resolve::{AssigneeResolution, Candidate, EntityRef, Resolution};
use dbl_core::snapshot::TeamSnapshot;
use dbl_storage::{InvitationCreateRequest, IssueCreateRequest, IssuePatch, ProjectCreateRequest};
use serde_json::{Value, json};

#[derive(Debug)]
pub(crate) enum Verdict<T> {
    Complete(T),
    Incomplete {
        missing: Vec<&'static str>,
        message: String,
    },
}

pub(crate) fn incomplete_response(missing: &[&'static str], message: &str) -> Value {
    ai_error_with("VALIDATION", message, Some(json!({ "missing": missing })))
}

fn ambiguous_response(kind: &str, value: &str, candidates: &[Candidate]) -> Value {
    let choices = candidates
        .iter()
        .map(|c| json!({ "id": c.id, "name": c.name }))
        .collect::<Vec<_>>();
    ai_error_with(
        "AMBIGUOUS",
        &ambiguous_message(kind, value, candidates),
        Some(json!({ "candidates": choices })),
    )
}

fn resolve_project_id(snapshot: &TeamSnapshot, raw: &str) -> Result<String, Value> {
    match snapshot.resolve_project(&EntityRef::by_name(raw)) {
        Resolution::Resolved(id) => Ok(id),
        Resolution::Ambiguous(candidates) => Err(ambiguous_response("project", raw, &candidates)),
        Resolution::NotFound => Err(ai_error(
            "NOT_FOUND",
            &project_not_found_message(raw, snapshot),
        )),
    }
}

fn resolve_state_id(snapshot: &TeamSnapshot, raw: &str) -> Result<String, Value> {
    match snapshot.resolve_state(&EntityRef::by_name(raw)) {
        Resolution::Resolved(id) => Ok(id),
        Resolution::Ambiguous(candidates) => {
            Err(ambiguous_response("workflow state", raw, &candidates))
        }
        Resolution::NotFound => Err(ai_error(
            "NOT_FOUND",
            &state_not_found_message(raw, snapshot),
        )),
    }
}

fn resolve_assignee_id(snapshot: &TeamSnapshot, raw: &str) -> Result<Option<String>, Value> {
    match snapshot.resolve_assignee(Some(raw)) {
        AssigneeResolution::Unassigned => Ok(None),
        AssigneeResolution::Member(Resolution::Resolved(id)) => Ok(Some(id)),
        AssigneeResolution::Member(Resolution::Ambiguous(candidates)) => {
            Err(ambiguous_response("user", raw, &candidates))
        }
        AssigneeResolution::Member(Resolution::NotFound) => Err(ai_error(
            "NOT_FOUND",
            &member_not_found_message(raw, snapshot),
        )),
    }
}

fn resolve_member_id(snapshot: &TeamSnapshot, raw: &str) -> Result<String, Value> {
    match dbl_core::resolve::resolve(&EntityRef::by_name(raw), &snapshot.members) {
        Resolution::Resolved(id) => Ok(id),
        Resolution::Ambiguous(candidates) => Err(ambiguous_response("user", raw, &candidates)),
        Resolution::NotFound => Err(ai_error(
            "NOT_FOUND",
            &member_not_found_message(raw, snapshot),
        )),
    }
}

fn resolve_label_ids(snapshot: &TeamSnapshot, raw_labels: &[String]) -> Result<Vec<String>, Value> {
    let mut label_ids = Vec::with_capacity(raw_labels.len());
    for raw in raw_labels {
        match snapshot.resolve_label(&EntityRef::by_name(raw)) {
            Resolution::Resolved(id) => label_ids.push(id),
            Resolution::Ambiguous(candidates) => {
                return Err(ambiguous_response("label", raw, &candidates));
            }
            Resolution::NotFound => {
                return Err(ai_error(
                    "NOT_FOUND",
                    &label_not_found_message(raw, snapshot),
                ));
            }
        }
    }
    label_ids.sort();
    label_ids.dedup();
    Ok(label_ids)
}

pub(crate) fn validate_issue_create(
    draft: &IssueCreateDraft,
    snapshot: &TeamSnapshot,
) -> Result<Verdict<IssueCreateRequest>, Value> {
    let mut missing: Vec<&'static str> = Vec::new();
    if draft.title.is_none() {
        missing.push("title");
    }
    if draft.state.is_none() {
        missing.push("workflow state");
    }
    // An absent priority is a validation failure, never defaulted; an
    // unknown spelling earns the same guidance as a missing one.
    let priority = draft.priority.as_deref().and_then(Priority::parse);
    if priority.is_none() {
        missing.push("priority");
    }
    if draft.project.is_none() {
        missing.push("project");
    }

    let (Some(title), Some(state_raw), Some(priority), Some(project_raw)) = (
        draft.title.clone(),
        draft.state.as_deref(),
        priority,
        draft.project.as_deref(),
    ) else {
        let message = issue_create_clarification(&missing, snapshot);
        return Ok(Verdict::Incomplete { missing, message });
    };

    let state_id = resolve_state_id(snapshot, state_raw)?;
    let project_id = resolve_project_id(snapshot, project_raw)?;
    let assignee_id = match draft.assignee.as_ref() {
        None | Some(None) => None,
        Some(Some(raw)) => resolve_assignee_id(snapshot, raw)?,
    };
    let label_ids = match draft.labels.as_ref() {
        None => Vec::new(),
        Some(raw_labels) => resolve_label_ids(snapshot, raw_labels)?,
    };

    Ok(Verdict::Complete(IssueCreateRequest {
        title,
        description: draft.description.clone(),
        state_id,
        priority: priority.as_str().to_string(),
        project_id,
        assignee_id,
        label_ids,
    }))
}

/// Resolves the mutable fields of an update into a store patch. Presence
/// of a locator is the handler's concern; "at least one change" is left
/// to the store, which rejects an empty patch.
pub(crate) fn resolve_issue_changes(
    draft: &IssueUpdateDraft,
    snapshot: &TeamSnapshot,
) -> Result<IssuePatch, Value> {
    let priority = match draft.priority.as_deref() {
        None => None,
        Some(raw) => match Priority::parse(raw) {
            Some(p) => Some(p.as_str().to_string()),
            None => {
                return Err(ai_error(
                    "VALIDATION",
                    &crate::support::priority_guidance(),
                ));
            }
        },
    };
    let state_id = match draft.state.as_deref() {
        None => None,
        Some(raw) => Some(resolve_state_id(snapshot, raw)?),
    };
    let project_id = match draft.project.as_deref() {
        None => None,
        Some(raw) => Some(resolve_project_id(snapshot, raw)?),
    };
    let assignee_id = match draft.assignee.as_ref() {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => Some(resolve_assignee_id(snapshot, raw)?),
    };
    let label_ids = match draft.labels.as_ref() {
        None => None,
        Some(raw_labels) => Some(resolve_label_ids(snapshot, raw_labels)?),
    };

    Ok(IssuePatch {
        title: draft.new_title.clone(),
        description: draft.description.clone().map(Some),
        state_id,
        priority,
        project_id,
        assignee_id,
        label_ids,
    })
}

pub(crate) fn resolve_bulk_changes(
    draft: &IssueBulkUpdateDraft,
    snapshot: &TeamSnapshot,
) -> Result<IssuePatch, Value> {
    let shared = IssueUpdateDraft {
        state: draft.state.clone(),
        priority: draft.priority.clone(),
        project: draft.project.clone(),
        assignee: draft.assignee.clone(),
        ..IssueUpdateDraft::default()
    };
    resolve_issue_changes(&shared, snapshot)
}

pub(crate) fn validate_project_create(
    draft: &ProjectCreateDraft,
) -> Result<Verdict<ProjectCreateRequest>, Value> {
    let mut missing: Vec<&'static str> = Vec::new();
    if draft.name.is_none() {
        missing.push("name");
    }
    if draft.key.is_none() {
        missing.push("key");
    }
    let (Some(name), Some(key_raw)) = (draft.name.clone(), draft.key.as_deref()) else {
        let message = format!(
            "I need a few more details to create the project. Missing: {}.",
            missing.join(", ")
        );
        return Ok(Verdict::Incomplete { missing, message });
    };

    let key = normalize_project_key(key_raw)?;
    let status = match draft.status.as_deref() {
        None => ProjectStatus::DEFAULT,
        Some(raw) => match ProjectStatus::parse(raw) {
            Some(status) => status,
            None => {
                return Err(ai_error(
                    "VALIDATION",
                    &format!(
                        "'{raw}' is not a project status. Valid statuses: {}.",
                        PROJECT_STATUS_NAMES.join(", ")
                    ),
                ));
            }
        },
    };
    // Unlike issue priority, color and status deliberately default.
    let color = draft
        .color
        .clone()
        .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string());

    Ok(Verdict::Complete(ProjectCreateRequest {
        name,
        key,
        color,
        status: status.as_str().to_string(),
    }))
}

pub(crate) fn resolve_project_changes(
    draft: &ProjectUpdateDraft,
) -> Result<dbl_storage::ProjectPatch, Value> {
    let key = match draft.key.as_deref() {
        None => None,
        Some(raw) => Some(normalize_project_key(raw)?),
    };
    let status = match draft.status.as_deref() {
        None => None,
        Some(raw) => match ProjectStatus::parse(raw) {
            Some(status) => Some(status.as_str().to_string()),
            None => {
                return Err(ai_error(
                    "VALIDATION",
                    &format!(
                        "'{raw}' is not a project status. Valid statuses: {}.",
                        PROJECT_STATUS_NAMES.join(", ")
                    ),
                ));
            }
        },
    };

    Ok(dbl_storage::ProjectPatch {
        name: draft.new_name.clone(),
        key,
        color: draft.color.clone(),
        status,
    })
}

pub(crate) fn validate_invite(
    draft: &InviteDraft,
) -> Result<Verdict<InvitationCreateRequest>, Value> {
    let Some(email) = draft.email.clone() else {
        let missing = vec!["email"];
        let message = "Please provide the email address to send the invitation to.".to_string();
        return Ok(Verdict::Incomplete { missing, message });
    };
    if !is_valid_email(&email) {
        return Err(ai_error(
            "VALIDATION",
            &format!("'{email}' does not look like a valid email address."),
        ));
    }

    let role = match draft.role.as_deref() {
        None => MemberRole::DEFAULT,
        Some(raw) => match MemberRole::parse(raw) {
            Some(role) => role,
            None => {
                return Err(ai_error(
                    "VALIDATION",
                    &format!(
                        "'{raw}' is not a member role. Valid roles: {}.",
                        MEMBER_ROLE_NAMES.join(", ")
                    ),
                ));
            }
        },
    };

    Ok(Verdict::Complete(InvitationCreateRequest {
        email,
        role: role.as_str().to_string(),
    }))
}

pub(crate) fn resolve_member(snapshot: &TeamSnapshot, raw: &str) -> Result<String, Value> {
    resolve_member_id(snapshot, raw)
}

fn normalize_project_key(raw: &str) -> Result<String, Value> {
    let key = raw.trim().to_ascii_lowercase();
    let valid = !key.is_empty()
        && key.len() <= 10
        && key.chars().all(|ch| ch.is_ascii_alphanumeric());
    if valid {
        Ok(key)
    } else {
        Err(ai_error(
            "VALIDATION",
            &format!("'{raw}' is not a usable project key. Keys are 1-10 letters or digits."),
        ))
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.len() < 6 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbl_core::model::StateType;
    use dbl_core::snapshot::{MemberRef, ProjectRef, StateRef};

    fn snapshot() -> TeamSnapshot {
        TeamSnapshot {
            projects: vec![ProjectRef {
                id: "prj_0001".to_string(),
                name: "Web".to_string(),
                key: "web".to_string(),
                status: ProjectStatus::Active,
            }],
            states: vec![StateRef {
                id: "wfs_0001".to_string(),
                name: "Todo".to_string(),
                state_type: StateType::Unstarted,
            }],
            labels: Vec::new(),
            members: vec![MemberRef {
                user_id: "usr_1".to_string(),
                user_name: "Alice".to_string(),
            }],
        }
    }

    fn base_draft() -> IssueCreateDraft {
        IssueCreateDraft {
            title: Some("x".to_string()),
            state: Some("Todo".to_string()),
            priority: None,
            project: Some("Web".to_string()),
            ..IssueCreateDraft::default()
        }
    }

    #[test]
    fn missing_priority_alone_mentions_only_priority_guidance() {
        let verdict = validate_issue_create(&base_draft(), &snapshot()).expect("no resolution error");
        let Verdict::Incomplete { missing, message } = verdict else {
            panic!("expected incomplete verdict");
        };
        assert_eq!(missing, vec!["priority"]);
        assert!(message.contains("Valid priorities"));
        assert!(!message.contains("Available projects"));
    }

    #[test]
    fn missing_priority_and_project_mentions_both() {
        let draft = IssueCreateDraft {
            project: None,
            ..base_draft()
        };
        let verdict = validate_issue_create(&draft, &snapshot()).expect("no resolution error");
        let Verdict::Incomplete { missing, message } = verdict else {
            panic!("expected incomplete verdict");
        };
        assert_eq!(missing, vec!["priority", "project"]);
        assert!(message.contains("Valid priorities"));
        assert!(message.contains("Available projects: Web (web)"));
    }

    #[test]
    fn explicit_none_priority_is_complete() {
        let draft = IssueCreateDraft {
            priority: Some("none".to_string()),
            ..base_draft()
        };
        let verdict = validate_issue_create(&draft, &snapshot()).expect("no resolution error");
        let Verdict::Complete(request) = verdict else {
            panic!("expected complete verdict");
        };
        assert_eq!(request.priority, "none");
        assert_eq!(request.state_id, "wfs_0001");
        assert_eq!(request.project_id, "prj_0001");
    }

    #[test]
    fn unknown_priority_spelling_gets_priority_guidance() {
        let draft = IssueCreateDraft {
            priority: Some("critical".to_string()),
            ..base_draft()
        };
        let verdict = validate_issue_create(&draft, &snapshot()).expect("no resolution error");
        let Verdict::Incomplete { missing, message } = verdict else {
            panic!("expected incomplete verdict");
        };
        assert_eq!(missing, vec!["priority"]);
        assert!(message.contains("Valid priorities"));
    }

    #[test]
    fn unresolved_project_surfaces_not_found_with_alternatives() {
        let draft = IssueCreateDraft {
            priority: Some("high".to_string()),
            project: Some("payments".to_string()),
            ..base_draft()
        };
        let err = validate_issue_create(&draft, &snapshot()).expect_err("resolution must fail");
        let message = err["error"]["message"].as_str().unwrap_or_default();
        assert!(message.contains("The project 'payments' was not found"));
        assert!(message.contains("Available projects: Web (web)"));
        assert_eq!(err["error"]["code"], "NOT_FOUND");
    }

    #[test]
    fn assignee_tokens_clear_rather_than_fail() {
        for token in ["unassigned", "null", "undefined"] {
            let draft = IssueCreateDraft {
                priority: Some("low".to_string()),
                assignee: Some(Some(token.to_string())),
                ..base_draft()
            };
            let verdict = validate_issue_create(&draft, &snapshot()).expect("no resolution error");
            let Verdict::Complete(request) = verdict else {
                panic!("expected complete verdict for token {token:?}");
            };
            assert_eq!(request.assignee_id, None);
        }
    }

    #[test]
    fn update_changes_resolve_names_to_ids() {
        let draft = IssueUpdateDraft {
            state: Some("todo".to_string()),
            assignee: Some(Some("alice".to_string())),
            ..IssueUpdateDraft::default()
        };
        let patch = resolve_issue_changes(&draft, &snapshot()).expect("patch");
        assert_eq!(patch.state_id.as_deref(), Some("wfs_0001"));
        assert_eq!(patch.assignee_id, Some(Some("usr_1".to_string())));
        assert!(patch.title.is_none());
    }

    #[test]
    fn project_create_defaults_color_and_status() {
        let draft = ProjectCreateDraft {
            name: Some("Mobile".to_string()),
            key: Some("MOB".to_string()),
            ..ProjectCreateDraft::default()
        };
        let Verdict::Complete(request) = validate_project_create(&draft).expect("ok") else {
            panic!("expected complete verdict");
        };
        assert_eq!(request.key, "mob", "keys normalize to lowercase");
        assert_eq!(request.status, "active");
        assert_eq!(request.color, DEFAULT_PROJECT_COLOR);
    }

    #[test]
    fn invite_defaults_role_and_rejects_bad_email() {
        let draft = InviteDraft {
            email: Some("bob@example.com".to_string()),
            role: None,
        };
        let Verdict::Complete(request) = validate_invite(&draft).expect("ok") else {
            panic!("expected complete verdict");
        };
        assert_eq!(request.role, "developer");

        let bad = InviteDraft {
            email: Some("not-an-email".to_string()),
            role: None,
        };
        assert!(validate_invite(&bad).is_err());

        let missing = InviteDraft::default();
        let Verdict::Incomplete { missing, .. } = validate_invite(&missing).expect("ok") else {
            panic!("expected incomplete verdict");
        };
        assert_eq!(missing, vec!["email"]);
    }
}
