#![forbid(unsafe_code)]

use crate::AssistantServer;
use serde_json::Value;

macro_rules! define_dispatch {
    ($($tool_name:literal => $method:ident),* $(,)?) => {
        pub(crate) fn dispatch_handler(
            server: &mut AssistantServer,
            name: &str,
            args: Value,
        ) -> Option<Value> {
            let resp = match name {
                $($tool_name => server.$method(args),)*
                _ => return None,
            };
            Some(resp)
        }

        #[cfg(test)]
        pub(crate) fn dispatch_tool_names() -> &'static [&'static str] {
            &[$($tool_name),*]
        }
    };
}

define_dispatch! {
    "team_context" => tool_team_context,
    "issues_create" => tool_issues_create,
    "issues_update" => tool_issues_update,
    "issues_bulk_update" => tool_issues_bulk_update,
    "issues_delete" => tool_issues_delete,
    "projects_create" => tool_projects_create,
    "projects_update" => tool_projects_update,
    "projects_delete" => tool_projects_delete,
    "projects_member_add" => tool_projects_member_add,
    "projects_member_remove" => tool_projects_member_remove,
    "members_invite" => tool_members_invite,
    "members_remove" => tool_members_remove,
    "invitations_revoke" => tool_invitations_revoke,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn definitions_and_dispatch_are_in_sync() {
        let mut defined = BTreeSet::<String>::new();
        for tool in super::super::tool_definitions() {
            let Some(name) = tool.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            defined.insert(name.to_string());
        }

        let mut dispatched = BTreeSet::<String>::new();
        for name in dispatch_tool_names() {
            dispatched.insert((*name).to_string());
        }

        let missing_in_definitions = dispatched.difference(&defined).cloned().collect::<Vec<_>>();
        let missing_in_dispatch = defined.difference(&dispatched).cloned().collect::<Vec<_>>();

        assert!(
            missing_in_definitions.is_empty() && missing_in_dispatch.is_empty(),
            "tool dispatch/definitions mismatch\n  dispatch-only: {missing_in_definitions:?}\n  definitions-only: {missing_in_dispatch:?}"
        );
    }
}
