//! # Assistant Module — The Shopping-List Chat Brain
//!
//! Three layers, each pure and independently testable:
//!
//! ```text
//! user message
//!      │
//!      ▼
//! [dispatcher] ──► intent (missing-items / implicit category / help)
//!      │
//!      ├──► [classifier] category mentioned in the message?
//!      └──► [analyzer]   frequent history items absent from today's list
//!      │
//!      ▼
//! BotReply { text, suggestions }
//! ```
//!
//! The assistant only ever *reads* the [`ListStore`](crate::core::ListStore);
//! adding accepted suggestions to a list is the web layer's job.

/// History-vs-current-list analysis.
pub mod analyzer;

/// Keyword-based category detection.
pub mod classifier;

/// Intent routing and Hebrew reply phrasing.
pub mod dispatcher;

pub use analyzer::{missing_items, MAX_SUGGESTIONS};
pub use classifier::classify;
pub use dispatcher::{added_reply, respond, BotReply, DISMISSED, GREETING};
