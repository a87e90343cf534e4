#![forbid(unsafe_code)]

mod bulk_update;
mod create;
mod delete;
mod update;

use crate::*;
use dbl_storage::IssueRow;
use serde_json::{Value, json};

impl AssistantServer {
    /// Locates one issue by id, or by title search with the multi-match
    /// rule: zero hits is not-found, more than one hit lists every match
    /// and asks for an id instead of silently picking the first.
    pub(crate) fn locate_issue(
        &self,
        team: &TeamId,
        issue_id: Option<&str>,
        title: Option<&str>,
    ) -> Result<IssueRow, Value> {
        if let Some(id) = issue_id {
            return match self.store.get_issue(team, id) {
                Ok(Some(row)) => Ok(row),
                Ok(None) => Err(ai_error(
                    "NOT_FOUND",
                    &format!("The issue '{id}' was not found."),
                )),
                Err(err) => Err(ai_error("STORE_ERROR", &format_store_error(err))),
            };
        }

        let Some(title) = title else {
            return Err(ai_error_with(
                "VALIDATION",
                "Tell me which issue to work on: give an issue_id or its title.",
                Some(json!({ "missing": ["issue_id or title"] })),
            ));
        };

        let mut rows = match self.store.find_issues_by_title(team, title) {
            Ok(rows) => rows,
            Err(err) => return Err(ai_error("STORE_ERROR", &format_store_error(err))),
        };
        if rows.is_empty() {
            return Err(ai_error(
                "NOT_FOUND",
                &format!("No issue matches '{title}'."),
            ));
        }
        if rows.len() > 1 {
            let matches = rows
                .iter()
                .map(|row| format!("{} '{}'", row.display_key, row.title))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ai_error_with(
                "MULTI_MATCH",
                &format!("Multiple issues match '{title}': {matches}. Please pick one by id."),
                Some(json!({
                    "matches": rows.iter().map(|row| json!({
                        "id": row.id,
                        "key": row.display_key,
                        "title": row.title
                    })).collect::<Vec<_>>()
                })),
            ));
        }
        Ok(rows.remove(0))
    }
}
