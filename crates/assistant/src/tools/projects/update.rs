#![forbid(unsafe_code)]

use crate::commands::{ProjectUpdateDraft, resolve_project_changes};
use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    pub(crate) fn tool_projects_update(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let draft = match ProjectUpdateDraft::from_args(args_obj) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let project = match self.locate_project(
            &team,
            draft.project_id.as_deref(),
            draft.name.as_deref(),
        ) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let patch = match resolve_project_changes(&draft) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        match self.store.update_project(&team, &project.id, patch) {
            Ok(row) => ai_ok_with_summary(
                "projects.update",
                &format!("✅ Updated project {} ({})", row.name, row.key),
                json!({ "project": project_json(&row) }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }
}
