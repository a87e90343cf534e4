#![forbid(unsafe_code)]

//! Typed drafts over the model's untyped argument bags.
//!
//! Each tool call builds its draft at the boundary; nothing downstream
//! touches the raw JSON map. Every field is independently optional here;
//! completeness is the validator's call.

use crate::support::{assignee_field, optional_text, optional_text_list};
use serde_json::Value;

#[derive(Clone, Debug, Default)]
pub(crate) struct IssueCreateDraft {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) priority: Option<String>,
    pub(crate) project: Option<String>,
    pub(crate) assignee: Option<Option<String>>,
    pub(crate) labels: Option<Vec<String>>,
}

impl IssueCreateDraft {
    pub(crate) fn from_args(args: &serde_json::Map<String, Value>) -> Result<Self, Value> {
        Ok(Self {
            title: optional_text(args, "title")?,
            description: optional_text(args, "description")?,
            state: optional_text(args, "workflow_state")?,
            priority: optional_text(args, "priority")?,
            project: optional_text(args, "project")?,
            assignee: assignee_field(args, "assignee")?,
            labels: optional_text_list(args, "labels")?,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct IssueUpdateDraft {
    pub(crate) issue_id: Option<String>,
    /// Locator only; renames go through `new_title`.
    pub(crate) title: Option<String>,
    pub(crate) new_title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) priority: Option<String>,
    pub(crate) project: Option<String>,
    pub(crate) assignee: Option<Option<String>>,
    pub(crate) labels: Option<Vec<String>>,
}

impl IssueUpdateDraft {
    pub(crate) fn from_args(args: &serde_json::Map<String, Value>) -> Result<Self, Value> {
        Ok(Self {
            issue_id: optional_text(args, "issue_id")?,
            title: optional_text(args, "title")?,
            new_title: optional_text(args, "new_title")?,
            description: optional_text(args, "description")?,
            state: optional_text(args, "workflow_state")?,
            priority: optional_text(args, "priority")?,
            project: optional_text(args, "project")?,
            assignee: assignee_field(args, "assignee")?,
            labels: optional_text_list(args, "labels")?,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct IssueBulkUpdateDraft {
    pub(crate) issue_ids: Option<Vec<String>>,
    pub(crate) state: Option<String>,
    pub(crate) priority: Option<String>,
    pub(crate) project: Option<String>,
    pub(crate) assignee: Option<Option<String>>,
}

impl IssueBulkUpdateDraft {
    pub(crate) fn from_args(args: &serde_json::Map<String, Value>) -> Result<Self, Value> {
        Ok(Self {
            issue_ids: optional_text_list(args, "issue_ids")?,
            state: optional_text(args, "workflow_state")?,
            priority: optional_text(args, "priority")?,
            project: optional_text(args, "project")?,
            assignee: assignee_field(args, "assignee")?,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct IssueDeleteDraft {
    pub(crate) issue_id: Option<String>,
    pub(crate) title: Option<String>,
}

impl IssueDeleteDraft {
    pub(crate) fn from_args(args: &serde_json::Map<String, Value>) -> Result<Self, Value> {
        Ok(Self {
            issue_id: optional_text(args, "issue_id")?,
            title: optional_text(args, "title")?,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ProjectCreateDraft {
    pub(crate) name: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) status: Option<String>,
}

impl ProjectCreateDraft {
    pub(crate) fn from_args(args: &serde_json::Map<String, Value>) -> Result<Self, Value> {
        Ok(Self {
            name: optional_text(args, "name")?,
            key: optional_text(args, "key")?,
            color: optional_text(args, "color")?,
            status: optional_text(args, "status")?,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ProjectUpdateDraft {
    pub(crate) project_id: Option<String>,
    /// Locator only; renames go through `new_name`.
    pub(crate) name: Option<String>,
    pub(crate) new_name: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) status: Option<String>,
}

impl ProjectUpdateDraft {
    pub(crate) fn from_args(args: &serde_json::Map<String, Value>) -> Result<Self, Value> {
        Ok(Self {
            project_id: optional_text(args, "project_id")?,
            name: optional_text(args, "name")?,
            new_name: optional_text(args, "new_name")?,
            key: optional_text(args, "key")?,
            color: optional_text(args, "color")?,
            status: optional_text(args, "status")?,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ProjectDeleteDraft {
    pub(crate) project_id: Option<String>,
    pub(crate) name: Option<String>,
}

impl ProjectDeleteDraft {
    pub(crate) fn from_args(args: &serde_json::Map<String, Value>) -> Result<Self, Value> {
        Ok(Self {
            project_id: optional_text(args, "project_id")?,
            name: optional_text(args, "name")?,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct InviteDraft {
    pub(crate) email: Option<String>,
    pub(crate) role: Option<String>,
}

impl InviteDraft {
    pub(crate) fn from_args(args: &serde_json::Map<String, Value>) -> Result<Self, Value> {
        Ok(Self {
            email: optional_text(args, "email")?,
            role: optional_text(args, "role")?,
        })
    }
}
