#![forbid(unsafe_code)]

use crate::commands::ProjectDeleteDraft;
use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    pub(crate) fn tool_projects_delete(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let draft = match ProjectDeleteDraft::from_args(args_obj) {
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

        match self.store.delete_project(&team, &project.id) {
            Ok(()) => ai_ok_with_summary(
                "projects.delete",
                &format!("✅ Deleted project {} ({})", project.name, project.key),
                json!({ "project": project_json(&project) }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }
}
