#![forbid(unsafe_code)]

use crate::commands::{ProjectCreateDraft, Verdict, incomplete_response, validate_project_create};
use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    pub(crate) fn tool_projects_create(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let draft = match ProjectCreateDraft::from_args(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let request = match validate_project_create(&draft) {
            Ok(Verdict::Complete(request)) => request,
            Ok(Verdict::Incomplete { missing, message }) => {
                return incomplete_response(&missing, &message);
            }
            Err(resp) => return resp,
        };

        match self.store.create_project(&team, request) {
            Ok(row) => ai_ok_with_summary(
                "projects.create",
                &format!("✅ Created project {} ({})", row.name, row.key),
                json!({ "project": project_json(&row) }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }
}
