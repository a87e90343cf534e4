#![forbid(unsafe_code)]

use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    /// Read-only snapshot echo so the conversational model can ground its
    /// own references before proposing a mutation.
    pub(crate) fn tool_team_context(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let snapshot = match self.store.team_snapshot(&team) {
            Ok(v) => v,
            Err(err) => return ai_error("STORE_ERROR", &format_store_error(err)),
        };

        let projects = snapshot
            .projects
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "name": p.name,
                    "key": p.key,
                    "status": p.status.as_str()
                })
            })
            .collect::<Vec<_>>();
        let states = snapshot
            .states
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "type": s.state_type.as_str()
                })
            })
            .collect::<Vec<_>>();
        let labels = snapshot
            .labels
            .iter()
            .map(|l| json!({ "id": l.id, "name": l.name }))
            .collect::<Vec<_>>();
        let members = snapshot
            .members
            .iter()
            .map(|m| json!({ "user_id": m.user_id, "user_name": m.user_name }))
            .collect::<Vec<_>>();

        ai_ok(
            "team.context",
            json!({
                "team": team.as_str(),
                "projects": projects,
                "workflow_states": states,
                "labels": labels,
                "members": members
            }),
        )
    }
}
