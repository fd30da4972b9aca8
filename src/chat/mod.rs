//! Chat injection engine
//!
//! A rule-based assistant: user text is matched against an ordered keyword
//! table, the matching rule supplies a canned reply, and some rules also add
//! a bullet to a section of the stored document.

mod cancel;
mod delay;
mod engine;
mod inject;
mod message;
mod rules;

pub use cancel::CancellationToken;
pub use delay::ResponseDelay;
pub use engine::{ChatEngine, ChatState, PendingTurn, RejectReason, TurnOutcome};
pub use inject::apply_injection;
pub use message::{ChatMessage, MessageLog, Sender};
pub use rules::{
    builtin_rules, Injection, InjectionRule, RuleTable, RuleTableError, FALLBACK_RESPONSE,
    GREETING,
};
