#![forbid(unsafe_code)]

//! Client-side session plumbing for the Doable chat view: watches the
//! conversational message stream, infers which resource categories a turn
//! touched, and tells subscribed views to re-fetch. Also owns the
//! session's response cache.

mod cache;
mod observer;
mod rules;

pub use cache::ResponseCache;
pub use observer::{
    ChatMessage, FALLBACK_DELAY_MS, ListenerId, Phase, RefreshCategory, RefreshHub, Role,
    SETTLE_DELAY_MS, SessionObserver,
};
pub use rules::{KEYWORD_RULES, KeywordRule, categories_for_tool, infer_tools};
