#![forbid(unsafe_code)]

//! Name-to-identifier resolution over a team context snapshot.
//!
//! Pure functions: callers pass the snapshot collection, nothing here
//! touches the store. A reference resolves by exact id, then exact
//! case-folded name, then bidirectional substring containment.

use crate::snapshot::MemberRef;

/// Upper bound on candidates surfaced for a clarification prompt.
/// Sorted by name first, so truncation is deterministic.
pub const MAX_AMBIGUOUS_CANDIDATES: usize = 10;

/// Spellings the upstream model emits for "no assignee". These come out
/// of its serializer as literal strings and must clear the assignee
/// rather than run the match algorithm.
pub const UNASSIGNED_TOKENS: &[&str] = &["unassigned", "null", "undefined"];

/// Literal spellings of an absent value. The model serializes missing
/// arguments as JSON null, `"null"`, or `"undefined"` interchangeably.
pub const ABSENT_TOKENS: &[&str] = &["null", "undefined"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityRef {
    ById(String),
    ByName(String),
}

impl EntityRef {
    pub fn by_id(value: impl Into<String>) -> Self {
        EntityRef::ById(value.into())
    }

    pub fn by_name(value: impl Into<String>) -> Self {
        EntityRef::ByName(value.into())
    }

    pub fn text(&self) -> &str {
        match self {
            EntityRef::ById(value) | EntityRef::ByName(value) => value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
}

impl NamedRecord for Candidate {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn record_name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Ambiguous(Vec<Candidate>),
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssigneeResolution {
    /// Explicit "no assignee": JSON null or one of [`UNASSIGNED_TOKENS`].
    Unassigned,
    Member(Resolution),
}

pub trait NamedRecord {
    fn record_id(&self) -> &str;
    fn record_name(&self) -> &str;
}

pub fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn is_absent_token(text: &str) -> bool {
    let folded = fold(text);
    folded.is_empty() || ABSENT_TOKENS.iter().any(|token| *token == folded)
}

pub fn is_unassigned_token(text: &str) -> bool {
    let folded = fold(text);
    folded.is_empty() || UNASSIGNED_TOKENS.iter().any(|token| *token == folded)
}

pub fn resolve<T: NamedRecord>(reference: &EntityRef, records: &[T]) -> Resolution {
    let raw = reference.text().trim();
    if raw.is_empty() {
        return Resolution::NotFound;
    }

    // The model routinely puts ids in name fields, so the id short-circuit
    // applies to both variants.
    if let Some(hit) = records.iter().find(|r| r.record_id() == raw) {
        return Resolution::Resolved(hit.record_id().to_string());
    }

    let needle = fold(raw);

    let exact = records
        .iter()
        .filter(|r| fold(r.record_name()) == needle)
        .collect::<Vec<_>>();
    match exact.len() {
        1 => return Resolution::Resolved(exact[0].record_id().to_string()),
        // Names are unique within a team in practice, but duplicates must
        // still surface as a clarification, never a silent pick.
        n if n > 1 => return ambiguous(exact),
        _ => {}
    }

    let partial = records
        .iter()
        .filter(|r| {
            let name = fold(r.record_name());
            !name.is_empty() && (name.contains(&needle) || needle.contains(&name))
        })
        .collect::<Vec<_>>();
    match partial.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Resolved(partial[0].record_id().to_string()),
        _ => ambiguous(partial),
    }
}

pub fn resolve_assignee(reference: Option<&str>, members: &[MemberRef]) -> AssigneeResolution {
    let Some(text) = reference else {
        return AssigneeResolution::Unassigned;
    };
    if is_unassigned_token(text) {
        return AssigneeResolution::Unassigned;
    }
    AssigneeResolution::Member(resolve(&EntityRef::by_name(text), members))
}

fn ambiguous<T: NamedRecord>(hits: Vec<&T>) -> Resolution {
    let mut candidates = hits
        .iter()
        .map(|r| Candidate {
            id: r.record_id().to_string(),
            name: r.record_name().to_string(),
        })
        .collect::<Vec<_>>();
    candidates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    candidates.truncate(MAX_AMBIGUOUS_CANDIDATES);
    Resolution::Ambiguous(candidates)
}
