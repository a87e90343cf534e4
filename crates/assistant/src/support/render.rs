#![forbid(unsafe_code)]

use crate::support::time::ts_ms_to_rfc3339;
use dbl_storage::{InvitationRow, IssueRow, ProjectRow};
use serde_json::{Value, json};

pub(crate) fn issue_json(row: &IssueRow) -> Value {
    json!({
        "id": row.id,
        "key": row.display_key,
        "number": row.number,
        "title": row.title,
        "description": row.description,
        "workflow_state_id": row.state_id,
        "priority": row.priority,
        "project_id": row.project_id,
        "assignee_id": row.assignee_id,
        "label_ids": row.label_ids,
        "created_at": ts_ms_to_rfc3339(row.created_at_ms),
        "updated_at": ts_ms_to_rfc3339(row.updated_at_ms)
    })
}

pub(crate) fn project_json(row: &ProjectRow) -> Value {
    json!({
        "id": row.id,
        "name": row.name,
        "key": row.key,
        "color": row.color,
        "status": row.status,
        "created_at": ts_ms_to_rfc3339(row.created_at_ms),
        "updated_at": ts_ms_to_rfc3339(row.updated_at_ms)
    })
}

pub(crate) fn invitation_json(row: &InvitationRow) -> Value {
    json!({
        "id": row.id,
        "email": row.email,
        "role": row.role,
        "status": row.status,
        "created_at": ts_ms_to_rfc3339(row.created_at_ms)
    })
}
