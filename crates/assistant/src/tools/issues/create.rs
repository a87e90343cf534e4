#![forbid(unsafe_code)]

use crate::commands::{IssueCreateDraft, Verdict, incomplete_response, validate_issue_create};
use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    pub(crate) fn tool_issues_create(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let draft = match IssueCreateDraft::from_args(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let snapshot = match self.store.team_snapshot(&team) {
            Ok(v) => v,
            Err(err) => return ai_error("STORE_ERROR", &format_store_error(err)),
        };

        let request = match validate_issue_create(&draft, &snapshot) {
            Ok(Verdict::Complete(request)) => request,
            Ok(Verdict::Incomplete { missing, message }) => {
                return incomplete_response(&missing, &message);
            }
            Err(resp) => return resp,
        };

        match self.store.create_issue(&team, request) {
            Ok(row) => ai_ok_with_summary(
                "issues.create",
                &format!("✅ Created issue {}: {}", row.display_key, row.title),
                json!({ "issue": issue_json(&row) }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }
}
