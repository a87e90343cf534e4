#![forbid(unsafe_code)]

use crate::commands::{IssueUpdateDraft, resolve_issue_changes};
use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    pub(crate) fn tool_issues_update(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let draft = match IssueUpdateDraft::from_args(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let issue = match self.locate_issue(&team, draft.issue_id.as_deref(), draft.title.as_deref())
        {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let snapshot = match self.store.team_snapshot(&team) {
            Ok(v) => v,
            Err(err) => return ai_error("STORE_ERROR", &format_store_error(err)),
        };
        let patch = match resolve_issue_changes(&draft, &snapshot) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match self.store.update_issue(&team, &issue.id, patch) {
            Ok(row) => ai_ok_with_summary(
                "issues.update",
                &format!("✅ Updated issue {}: {}", row.display_key, row.title),
                json!({ "issue": issue_json(&row) }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }
}
