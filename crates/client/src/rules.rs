#![forbid(unsafe_code)]

//! Keyword co-occurrence rules for inferring tool activity from rendered
//! chat text, plus the fixed tool-name → resource-category map.
//!
//! The rule table is deliberately frozen: it mirrors the behavior the
//! product shipped with, including the `project` + `removed` pair reading
//! as a project-member removal. New rows are a product decision, not an
//! inference.

use crate::observer::RefreshCategory;

#[derive(Clone, Copy, Debug)]
pub struct KeywordRule {
    /// Category word that must appear in the folded text.
    pub category_keyword: &'static str,
    /// Any one of these action words must co-occur with it.
    pub action_keywords: &'static [&'static str],
    /// Tool names to infer, bulk variants included, so one signal covers
    /// single- and multi-entity operations alike.
    pub tools: &'static [&'static str],
}

/// Success glyph the mutation confirmations lead with; counts as an
/// action keyword.
pub const SUCCESS_GLYPH: &str = "✅";

pub const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        category_keyword: "issue",
        action_keywords: &["created", "updated", "deleted", SUCCESS_GLYPH],
        tools: &[
            "issues_create",
            "issues_update",
            "issues_bulk_update",
            "issues_delete",
        ],
    },
    KeywordRule {
        category_keyword: "project",
        action_keywords: &["created", "updated", "deleted", SUCCESS_GLYPH],
        tools: &["projects_create", "projects_update", "projects_delete"],
    },
    // Preserved quirk: "project" next to "removed" reads as a
    // project-member removal even without stronger evidence.
    KeywordRule {
        category_keyword: "project",
        action_keywords: &["removed"],
        tools: &["projects_member_remove"],
    },
    KeywordRule {
        category_keyword: "member",
        action_keywords: &["invited", "removed", "revoked", SUCCESS_GLYPH],
        tools: &["members_invite", "members_remove"],
    },
    KeywordRule {
        category_keyword: "invitation",
        action_keywords: &["created", "revoked", "deleted", SUCCESS_GLYPH],
        tools: &["members_invite", "invitations_revoke"],
    },
];

/// Scans folded message text for category/action co-occurrence and
/// returns the inferred tool names, deduplicated.
pub fn infer_tools(text: &str) -> Vec<&'static str> {
    let folded = text.to_lowercase();
    let mut inferred = Vec::new();
    for rule in KEYWORD_RULES {
        if !folded.contains(rule.category_keyword) {
            continue;
        }
        if rule
            .action_keywords
            .iter()
            .any(|keyword| folded.contains(keyword))
        {
            inferred.extend_from_slice(rule.tools);
        }
    }
    inferred.sort_unstable();
    inferred.dedup();
    inferred
}

/// Fixed lookup from tool name to the view categories it dirties.
/// Project-membership tools refresh project views; invitation and member
/// tools refresh people views.
pub fn categories_for_tool(name: &str) -> &'static [RefreshCategory] {
    match name {
        "issues_create" | "issues_update" | "issues_bulk_update" | "issues_delete" => {
            &[RefreshCategory::Issues]
        }
        "projects_create" | "projects_update" | "projects_delete" | "projects_member_add"
        | "projects_member_remove" => &[RefreshCategory::Projects],
        "members_invite" | "members_remove" | "invitations_revoke" => &[RefreshCategory::People],
        _ => &[],
    }
}
