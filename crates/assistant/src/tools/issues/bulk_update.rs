#![forbid(unsafe_code)]

use crate::commands::{IssueBulkUpdateDraft, resolve_bulk_changes};
use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    /// One change set applied to several issues. Each issue is updated in
    /// its own transaction; the first store failure stops the batch and
    /// reports which issues already went through.
    pub(crate) fn tool_issues_bulk_update(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let draft = match IssueBulkUpdateDraft::from_args(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let issue_ids = match draft.issue_ids.as_ref() {
            Some(ids) if !ids.is_empty() => ids.clone(),
            _ => return ai_error("INVALID_INPUT", "issue_ids must be a non-empty array"),
        };

        let snapshot = match self.store.team_snapshot(&team) {
            Ok(v) => v,
            Err(err) => return ai_error("STORE_ERROR", &format_store_error(err)),
        };
        let patch = match resolve_bulk_changes(&draft, &snapshot) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        if patch.is_empty() {
            return ai_error("INVALID_INPUT", "no fields to change");
        }

        let mut updated = Vec::with_capacity(issue_ids.len());
        for issue_id in &issue_ids {
            match self.store.update_issue(&team, issue_id, patch.clone()) {
                Ok(row) => updated.push(issue_json(&row)),
                Err(err) => {
                    return ai_error_with(
                        "STORE_ERROR",
                        &format!(
                            "Updating issue '{issue_id}' failed: {}",
                            format_store_error(err)
                        ),
                        Some(json!({ "updated": updated })),
                    );
                }
            }
        }

        ai_ok_with_summary(
            "issues.bulk_update",
            &format!("✅ Updated {} issues", updated.len()),
            json!({ "issues": updated }),
        )
    }
}
