#![forbid(unsafe_code)]

use crate::commands::resolve_member;
use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    pub(crate) fn tool_members_remove(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let member_raw = match require_text(args_obj, "member") {
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

        match self.store.remove_member(&team, &user_id) {
            Ok(()) => ai_ok_with_summary(
                "members.remove",
                &format!("✅ Removed member {user_name} from the team"),
                json!({ "user_id": user_id }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }
}
