#![forbid(unsafe_code)]

use crate::model::{ProjectStatus, StateType};
use crate::resolve::{self, AssigneeResolution, EntityRef, NamedRecord, Resolution};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
    pub key: String,
    pub status: ProjectStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateRef {
    pub id: String,
    pub name: String,
    pub state_type: StateType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelRef {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRef {
    pub user_id: String,
    pub user_name: String,
}

impl NamedRecord for ProjectRef {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn record_name(&self) -> &str {
        &self.name
    }
}

impl NamedRecord for StateRef {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn record_name(&self) -> &str {
        &self.name
    }
}

impl NamedRecord for LabelRef {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn record_name(&self) -> &str {
        &self.name
    }
}

impl NamedRecord for MemberRef {
    fn record_id(&self) -> &str {
        &self.user_id
    }
    fn record_name(&self) -> &str {
        &self.user_name
    }
}

/// Point-in-time read-only projection of one team's context.
///
/// Fetched once per conversational turn and treated as immutable for the
/// duration of a resolution pass. Staleness is acceptable: a later pass
/// re-fetches, correctness never depends on this being current.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeamSnapshot {
    pub projects: Vec<ProjectRef>,
    pub states: Vec<StateRef>,
    pub labels: Vec<LabelRef>,
    pub members: Vec<MemberRef>,
}

impl TeamSnapshot {
    pub fn resolve_project(&self, reference: &EntityRef) -> Resolution {
        resolve::resolve(reference, &self.projects)
    }

    /// Workflow-state lookup ignores the state's coarse type on purpose:
    /// "Done" must resolve whether its type is completed or canceled.
    pub fn resolve_state(&self, reference: &EntityRef) -> Resolution {
        resolve::resolve(reference, &self.states)
    }

    pub fn resolve_label(&self, reference: &EntityRef) -> Resolution {
        resolve::resolve(reference, &self.labels)
    }

    pub fn resolve_assignee(&self, reference: Option<&str>) -> AssigneeResolution {
        resolve::resolve_assignee(reference, &self.members)
    }

    pub fn project_by_id(&self, id: &str) -> Option<&ProjectRef> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn state_by_id(&self, id: &str) -> Option<&StateRef> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn member_by_id(&self, user_id: &str) -> Option<&MemberRef> {
        self.members.iter().find(|m| m.user_id == user_id)
    }
}
