#![forbid(unsafe_code)]

use crate::commands::IssueDeleteDraft;
use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    pub(crate) fn tool_issues_delete(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let draft = match IssueDeleteDraft::from_args(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let issue = match self.locate_issue(&team, draft.issue_id.as_deref(), draft.title.as_deref())
        {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match self.store.delete_issue(&team, &issue.id) {
            Ok(()) => ai_ok_with_summary(
                "issues.delete",
                &format!("✅ Deleted issue {}: {}", issue.display_key, issue.title),
                json!({ "issue": issue_json(&issue) }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }
}
