#![forbid(unsafe_code)]

use serde_json::{Value, json};

/// Tool definitions advertised via `tools/list`. Kept in sync with the
/// dispatch table by a unit test.
pub(crate) fn tool_definitions() -> Vec<Value> {
    let mut tools = vec![
        json!({
            "name": "team_context",
            "description": "Read the team's projects, workflow states, labels and members.",
            "inputSchema": {
                "type": "object",
                "properties": { "team": { "type": "string" } },
                "required": []
            }
        }),
        json!({
            "name": "issues_create",
            "description": "Create an issue. Requires title, workflow_state, an explicit priority (none|low|medium|high|urgent) and a project.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "workflow_state": { "type": "string", "description": "State name or id" },
                    "priority": { "type": "string", "enum": ["none", "low", "medium", "high", "urgent"] },
                    "project": { "type": "string", "description": "Project name or id" },
                    "assignee": { "type": "string", "description": "Member name or id; 'unassigned' clears" },
                    "labels": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["title", "workflow_state", "priority", "project"]
            }
        }),
        json!({
            "name": "issues_update",
            "description": "Update one issue, located by issue_id or title.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "issue_id": { "type": "string" },
                    "title": { "type": "string", "description": "Locator when issue_id is unknown" },
                    "new_title": { "type": "string" },
                    "description": { "type": "string" },
                    "workflow_state": { "type": "string" },
                    "priority": { "type": "string", "enum": ["none", "low", "medium", "high", "urgent"] },
                    "project": { "type": "string" },
                    "assignee": { "type": "string" },
                    "labels": { "type": "array", "items": { "type": "string" } }
                },
                "required": []
            }
        }),
        json!({
            "name": "issues_bulk_update",
            "description": "Apply one change set to several issues by id.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "issue_ids": { "type": "array", "items": { "type": "string" } },
                    "workflow_state": { "type": "string" },
                    "priority": { "type": "string", "enum": ["none", "low", "medium", "high", "urgent"] },
                    "project": { "type": "string" },
                    "assignee": { "type": "string" }
                },
                "required": ["issue_ids"]
            }
        }),
        json!({
            "name": "issues_delete",
            "description": "Delete one issue, located by issue_id or title.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "issue_id": { "type": "string" },
                    "title": { "type": "string" }
                },
                "required": []
            }
        }),
        json!({
            "name": "projects_create",
            "description": "Create a project. Requires name and key; color and status default.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "name": { "type": "string" },
                    "key": { "type": "string", "description": "Short unique code, e.g. 'web'" },
                    "color": { "type": "string" },
                    "status": { "type": "string", "enum": ["active", "paused", "completed", "canceled"] }
                },
                "required": ["name", "key"]
            }
        }),
        json!({
            "name": "projects_update",
            "description": "Update one project, located by project_id or name.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "project_id": { "type": "string" },
                    "name": { "type": "string", "description": "Locator when project_id is unknown" },
                    "new_name": { "type": "string" },
                    "key": { "type": "string" },
                    "color": { "type": "string" },
                    "status": { "type": "string", "enum": ["active", "paused", "completed", "canceled"] }
                },
                "required": []
            }
        }),
        json!({
            "name": "projects_delete",
            "description": "Delete one project (and its issues), located by project_id or name.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "project_id": { "type": "string" },
                    "name": { "type": "string" }
                },
                "required": []
            }
        }),
        json!({
            "name": "projects_member_add",
            "description": "Add a team member to a project.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "project": { "type": "string" },
                    "member": { "type": "string" }
                },
                "required": ["project", "member"]
            }
        }),
        json!({
            "name": "projects_member_remove",
            "description": "Remove a team member from a project.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "project": { "type": "string" },
                    "member": { "type": "string" }
                },
                "required": ["project", "member"]
            }
        }),
        json!({
            "name": "members_invite",
            "description": "Invite someone to the team by email. Role defaults to developer.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "email": { "type": "string" },
                    "role": { "type": "string", "enum": ["admin", "developer", "viewer"] }
                },
                "required": ["email"]
            }
        }),
        json!({
            "name": "members_remove",
            "description": "Remove a member from the team; their issues become unassigned.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "member": { "type": "string" }
                },
                "required": ["member"]
            }
        }),
        json!({
            "name": "invitations_revoke",
            "description": "Revoke a pending invitation, located by invitation_id or email.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "team": { "type": "string" },
                    "invitation_id": { "type": "string" },
                    "email": { "type": "string" }
                },
                "required": []
            }
        }),
    ];
    tools.sort_by_key(|tool| {
        tool.get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    });
    tools
}
