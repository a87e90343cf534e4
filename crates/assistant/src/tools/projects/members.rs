#![forbid(unsafe_code)]

use crate::commands::resolve_member;
use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    pub(crate) fn tool_projects_member_add(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let project_raw = match require_text(args_obj, "project") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let member_raw = match require_text(args_obj, "member") {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let project = match self.locate_project(&team, None, Some(&project_raw)) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let snapshot = match self.store.team_snapshot(&team) {
            Ok(v) => v,
            Err(err) => return ai_error("STORE_ERROR", &format_store_error(err)),
        };
        let user_id = match resolve_member(&snapshot, &member_raw) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let user_name = snapshot
            .member_by_id(&user_id)
            .map(|m| m.user_name.clone())
            .unwrap_or_else(|| user_id.clone());

        match self.store.project_member_add(&team, &project.id, &user_id) {
            Ok(()) => ai_ok_with_summary(
                "projects.member_add",
                &format!("✅ Added {user_name} to project {}", project.name),
                json!({
                    "project_id": project.id,
                    "user_id": user_id
                }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }

    pub(crate) fn tool_projects_member_remove(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let project_raw = match require_text(args_obj, "project") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let member_raw = match require_text(args_obj, "member") {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let project = match self.locate_project(&team, None, Some(&project_raw)) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let snapshot = match self.store.team_snapshot(&team) {
            Ok(v) => v,
            Err(err) => return ai_error("STORE_ERROR", &format_store_error(err)),
        };
        let user_id = match resolve_member(&snapshot, &member_raw) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let user_name = snapshot
            .member_by_id(&user_id)
            .map(|m| m.user_name.clone())
            .unwrap_or_else(|| user_id.clone());

        match self
            .store
            .project_member_remove(&team, &project.id, &user_id)
        {
            Ok(()) => ai_ok_with_summary(
                "projects.member_remove",
                &format!("✅ Removed {user_name} from project {}", project.name),
                json!({
                    "project_id": project.id,
                    "user_id": user_id
                }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }
}
