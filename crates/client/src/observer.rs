#![forbid(unsafe_code)]

//! Session observer: `Idle → AwaitingResponse → Ready`, with scheduled
//! refresh dispatches drained by a caller-supplied clock.
//!
//! Delays are settle windows, not correctness mechanisms: targeted
//! signals wait a beat so the mutation is visible to the next read, and
//! an assistant-authored final message always schedules a full fallback
//! refresh in case keyword inference missed. A drain after the view is
//! gone simply emits to nobody.

use crate::rules::{categories_for_tool, infer_tools};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};

/// Settle window before targeted refresh signals fire.
pub const SETTLE_DELAY_MS: i64 = 500;
/// Longer window for the unconditional all-categories fallback.
pub const FALLBACK_DELAY_MS: i64 = 2_500;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub text: String,
    /// Tool-invocation names, when the transport surfaces them.
    #[serde(default)]
    pub tool_calls: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RefreshCategory {
    Issues,
    Projects,
    People,
}

impl RefreshCategory {
    pub const ALL: [RefreshCategory; 3] = [
        RefreshCategory::Issues,
        RefreshCategory::Projects,
        RefreshCategory::People,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RefreshCategory::Issues => "issues",
            RefreshCategory::Projects => "projects",
            RefreshCategory::People => "people",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
    Ready,
}

#[derive(Clone, Debug)]
struct PendingDispatch {
    due_at_ms: i64,
    categories: BTreeSet<RefreshCategory>,
}

/// One observer per chat session. The processed-message set only grows
/// and lives as long as the session; it is what makes re-feeding the same
/// transcript a no-op.
pub struct SessionObserver {
    phase: Phase,
    processed: HashSet<String>,
    pending: Vec<PendingDispatch>,
}

impl Default for SessionObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            processed: HashSet::new(),
            pending: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn utterance_sent(&mut self) {
        self.phase = Phase::AwaitingResponse;
    }

    /// Called when the turn's stream closes. Scans every message not seen
    /// before, schedules targeted dispatches for inferred categories, and
    /// schedules the full fallback when the final message is from the
    /// assistant. Never fails: inference misses only lose precision.
    pub fn turn_completed(&mut self, messages: &[ChatMessage], now_ms: i64) {
        self.phase = Phase::Ready;

        for message in messages {
            if self.processed.contains(&message.id) {
                continue;
            }
            self.processed.insert(message.id.clone());

            let mut categories = BTreeSet::new();
            for tool in &message.tool_calls {
                for category in categories_for_tool(tool) {
                    categories.insert(*category);
                }
            }
            for tool in infer_tools(&message.text) {
                for category in categories_for_tool(tool) {
                    categories.insert(*category);
                }
            }

            if !categories.is_empty() {
                self.pending.push(PendingDispatch {
                    due_at_ms: now_ms + SETTLE_DELAY_MS,
                    categories,
                });
            }
        }

        let assistant_closed = messages
            .last()
            .map(|message| message.role == Role::Assistant)
            .unwrap_or(false);
        if assistant_closed {
            // Fires even when targeted dispatches are queued; categories
            // are idempotent to re-signal.
            self.pending.push(PendingDispatch {
                due_at_ms: now_ms + FALLBACK_DELAY_MS,
                categories: RefreshCategory::ALL.into_iter().collect(),
            });
        }
    }

    /// Drains every dispatch due by `now_ms` and returns the category
    /// union, each category at most once.
    pub fn due_signals(&mut self, now_ms: i64) -> Vec<RefreshCategory> {
        let mut due = BTreeSet::new();
        self.pending.retain(|dispatch| {
            if dispatch.due_at_ms <= now_ms {
                for category in &dispatch.categories {
                    due.insert(*category);
                }
                false
            } else {
                true
            }
        });
        due.into_iter().collect()
    }

    pub fn dispatch_due(&mut self, now_ms: i64, hub: &mut RefreshHub) {
        for category in self.due_signals(now_ms) {
            hub.emit(category);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Fire-and-forget fan-out to view refreshers. No queueing: a signal
/// emitted with no listeners is dropped.
pub struct RefreshHub {
    listeners: Vec<(ListenerId, Box<dyn FnMut(RefreshCategory)>)>,
    next_id: u64,
}

impl Default for RefreshHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshHub {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn FnMut(RefreshCategory)>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn emit(&mut self, category: RefreshCategory) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(category);
        }
    }
}
