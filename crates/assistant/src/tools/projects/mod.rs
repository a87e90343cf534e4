#![forbid(unsafe_code)]

mod create;
mod delete;
mod members;
mod update;

use crate::*;
use dbl_storage::ProjectRow;
use serde_json::{Value, json};

impl AssistantServer {
    /// Same multi-match rule as issues: ambiguous name searches list every
    /// hit rather than guessing.
    pub(crate) fn locate_project(
        &self,
        team: &TeamId,
        project_id: Option<&str>,
        name: Option<&str>,
    ) -> Result<ProjectRow, Value> {
        if let Some(id) = project_id {
            return match self.store.get_project(team, id) {
                Ok(Some(row)) => Ok(row),
                Ok(None) => Err(ai_error(
                    "NOT_FOUND",
                    &format!("The project '{id}' was not found."),
                )),
                Err(err) => Err(ai_error("STORE_ERROR", &format_store_error(err))),
            };
        }

        let Some(name) = name else {
            return Err(ai_error_with(
                "VALIDATION",
                "Tell me which project to work on: give a project_id or its name.",
                Some(json!({ "missing": ["project_id or name"] })),
            ));
        };

        let mut rows = match self.store.find_projects_by_name(team, name) {
            Ok(rows) => rows,
            Err(err) => return Err(ai_error("STORE_ERROR", &format_store_error(err))),
        };
        if rows.is_empty() {
            return Err(ai_error(
                "NOT_FOUND",
                &format!("No project matches '{name}'."),
            ));
        }
        if rows.len() > 1 {
            let matches = rows
                .iter()
                .map(|row| format!("{} ({})", row.name, row.key))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ai_error_with(
                "MULTI_MATCH",
                &format!("Multiple projects match '{name}': {matches}. Please pick one by id."),
                Some(json!({
                    "matches": rows.iter().map(|row| json!({
                        "id": row.id,
                        "name": row.name,
                        "key": row.key
                    })).collect::<Vec<_>>()
                })),
            ));
        }
        Ok(rows.remove(0))
    }
}
