#![forbid(unsafe_code)]

use crate::*;
use serde_json::{Value, json};

impl AssistantServer {
    pub(crate) fn tool_invitations_revoke(&mut self, args: Value) -> Value {
        let Some(args_obj) = args.as_object() else {
            return ai_error("INVALID_INPUT", "arguments must be an object");
        };
        let team = match require_team(args_obj, self.default_team.as_deref()) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let invitation_id = match optional_text(args_obj, "invitation_id") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let email = match optional_text(args_obj, "email") {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let invitation_id = match invitation_id {
            Some(id) => id,
            None => {
                let Some(email) = email else {
                    return ai_error_with(
                        "VALIDATION",
                        "Tell me which invitation to revoke: give an invitation_id or the invitee's email.",
                        Some(json!({ "missing": ["invitation_id or email"] })),
                    );
                };
                let mut pending = match self.store.find_pending_invitations_by_email(&team, &email)
                {
                    Ok(rows) => rows,
                    Err(err) => return ai_error("STORE_ERROR", &format_store_error(err)),
                };
                if pending.is_empty() {
                    return ai_error(
                        "NOT_FOUND",
                        &format!("No pending invitation for '{email}'."),
                    );
                }
                if pending.len() > 1 {
                    let matches = pending
                        .iter()
                        .map(|row| row.id.clone())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return ai_error(
                        "MULTI_MATCH",
                        &format!(
                            "Multiple pending invitations for '{email}': {matches}. Please pick one by id."
                        ),
                    );
                }
                pending.remove(0).id
            }
        };

        match self.store.revoke_invitation(&team, &invitation_id) {
            Ok(row) => ai_ok_with_summary(
                "invitations.revoke",
                &format!("✅ Revoked invitation for {}", row.email),
                json!({ "invitation": invitation_json(&row) }),
            ),
            Err(err) => ai_error("STORE_ERROR", &format_store_error(err)),
        }
    }
}
