#![forbid(unsafe_code)]

/// Field values are already validated and resolved to identifiers by the
/// caller; the store never sees raw display names.
#[derive(Clone, Debug)]
pub struct IssueCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub state_id: String,
    pub priority: String,
    pub project_id: String,
    pub assignee_id: Option<String>,
    pub label_ids: Vec<String>,
}

/// Patch semantics: `None` keeps the current value, `Some(None)` clears a
/// nullable column, `Some(Some(v))` replaces it.
#[derive(Clone, Debug, Default)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub state_id: Option<String>,
    pub priority: Option<String>,
    pub project_id: Option<String>,
    pub assignee_id: Option<Option<String>>,
    pub label_ids: Option<Vec<String>>,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.state_id.is_none()
            && self.priority.is_none()
            && self.project_id.is_none()
            && self.assignee_id.is_none()
            && self.label_ids.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct ProjectCreateRequest {
    pub name: String,
    pub key: String,
    pub color: String,
    pub status: String,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub key: Option<String>,
    pub color: Option<String>,
    pub status: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.key.is_none() && self.color.is_none() && self.status.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct StateCreateRequest {
    pub name: String,
    pub state_type: String,
    pub position: i64,
}

#[derive(Clone, Debug)]
pub struct MemberAddRequest {
    pub user_id: String,
    pub user_name: String,
    pub role: String,
}

#[derive(Clone, Debug)]
pub struct InvitationCreateRequest {
    pub email: String,
    pub role: String,
}
