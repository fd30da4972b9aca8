//! Chat engine: one conversation, one outstanding turn at a time
//!
//! A turn moves the conversation from `Idle` to `AwaitingResponse` when the
//! user submits non-blank text, and back to `Idle` once the simulated delay
//! elapses and the reply is logged. If the matched rule carries an
//! injection, the document is updated before the reply appears, so anything
//! re-rendering on the change signal already shows what the reply claims.
//!
//! `reset` clears the log and cancels the in-flight turn. A turn that wakes
//! after a reset is discarded.

use super::cancel::CancellationToken;
use super::delay::ResponseDelay;
use super::message::{ChatMessage, MessageLog};
use super::rules::{builtin_rules, Injection, InjectionRule, RuleTable, GREETING};
use crate::session::SessionStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Conversation state between user submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingResponse,
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was empty or whitespace.
    EmptyInput,
    /// A reply is still pending.
    Busy,
}

/// Result of a full turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The reply was logged. `injection` is what was written to the document.
    Answered {
        reply: ChatMessage,
        injection: Option<Injection>,
    },
    /// Nothing happened; the log is unchanged.
    Rejected(RejectReason),
    /// The conversation was reset while the reply was pending.
    Cancelled,
}

/// An accepted submission whose reply has not been delivered yet.
#[derive(Debug)]
pub struct PendingTurn {
    epoch: u64,
    cancel: CancellationToken,
    rule: InjectionRule,
    delay: Duration,
}

impl PendingTurn {
    /// How long the reply will be held back.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[derive(Debug)]
struct Conversation {
    log: MessageLog,
    state: ChatState,
    /// Bumped on every reset; turns from an older epoch are stale.
    epoch: u64,
    cancel: CancellationToken,
}

impl Conversation {
    fn new() -> Self {
        let mut log = MessageLog::new();
        log.push(ChatMessage::ai(GREETING, false));
        Self {
            log,
            state: ChatState::Idle,
            epoch: 0,
            cancel: CancellationToken::new(),
        }
    }
}

/// Rule-driven assistant bound to a session store.
#[derive(Debug)]
pub struct ChatEngine {
    rules: RuleTable,
    delay: ResponseDelay,
    store: Arc<SessionStore>,
    conversation: Mutex<Conversation>,
}

impl ChatEngine {
    /// Engine with the built-in rules and default delay.
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            rules: builtin_rules(),
            delay: ResponseDelay::default(),
            store,
            conversation: Mutex::new(Conversation::new()),
        }
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_delay(mut self, delay: ResponseDelay) -> Self {
        self.delay = delay;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn state(&self) -> ChatState {
        self.lock().state
    }

    /// Copy of the conversation log.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().log.messages().to_vec()
    }

    /// Submit user text and run the turn to completion.
    pub async fn send(&self, input: &str) -> TurnOutcome {
        match self.submit(input) {
            Ok(turn) => self.complete(turn).await,
            Err(reason) => TurnOutcome::Rejected(reason),
        }
    }

    /// Accept a user message and match it against the rule table.
    ///
    /// Logs the user message and moves to `AwaitingResponse`. Blank input, or
    /// input while a reply is pending, is rejected without touching the log.
    /// The returned turn must be passed to [`complete`](Self::complete);
    /// dropping it leaves the engine busy until [`reset`](Self::reset).
    pub fn submit(&self, input: &str) -> Result<PendingTurn, RejectReason> {
        if input.trim().is_empty() {
            return Err(RejectReason::EmptyInput);
        }

        let mut conv = self.lock();
        if conv.state == ChatState::AwaitingResponse {
            tracing::debug!("submission ignored, reply pending");
            return Err(RejectReason::Busy);
        }

        let position = self.rules.position(input);
        let rule = self.rules.rule_at(position).clone();
        let delay = self.delay.for_response(&rule.response);
        tracing::debug!(
            rule = ?position,
            injects = rule.inject.is_some(),
            ?delay,
            "matched chat input"
        );

        conv.log.push(ChatMessage::user(input));
        conv.state = ChatState::AwaitingResponse;

        Ok(PendingTurn {
            epoch: conv.epoch,
            cancel: conv.cancel.clone(),
            rule,
            delay,
        })
    }

    /// Wait out the simulated delay, then apply the injection and log the reply.
    pub async fn complete(&self, turn: PendingTurn) -> TurnOutcome {
        if !turn.delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(turn.delay) => {}
                _ = turn.cancel.cancelled() => {
                    tracing::debug!("pending reply cancelled");
                    return TurnOutcome::Cancelled;
                }
            }
        }

        let mut conv = self.lock();
        if conv.epoch != turn.epoch || turn.cancel.is_cancelled() {
            tracing::warn!("dropping reply for a conversation that was reset");
            return TurnOutcome::Cancelled;
        }

        // Document first, message second.
        let injection = turn.rule.inject.clone();
        if let Some(injection) = &injection {
            self.store.apply_injection(injection);
        }

        let reply = ChatMessage::ai(turn.rule.response, injection.is_some());
        conv.log.push(reply.clone());
        conv.state = ChatState::Idle;
        tracing::info!(injected = reply.injected, "chat turn answered");

        TurnOutcome::Answered { reply, injection }
    }

    /// Clear the conversation and cancel any pending reply.
    ///
    /// The log restarts with the greeting. The document is left alone.
    pub fn reset(&self) {
        let mut conv = self.lock();
        conv.cancel.cancel();
        let epoch = conv.epoch + 1;
        *conv = Conversation::new();
        conv.epoch = epoch;
        tracing::info!(epoch, "conversation reset");
    }

    fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.conversation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::Sender;
    use crate::document::DocumentState;
    use crate::session::DocumentOrigin;

    const DOC: &str = "## Executive Summary\nA food delivery platform.\n\n## Risks\n- Payment failures\n";

    fn engine() -> ChatEngine {
        let store = Arc::new(SessionStore::new());
        store.replace(DOC, DocumentOrigin::Live);
        ChatEngine::new(store).with_delay(ResponseDelay::immediate())
    }

    #[test]
    fn starts_idle_with_greeting() {
        let engine = engine();
        assert_eq!(engine.state(), ChatState::Idle);
        let messages = engine.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::Ai);
        assert_eq!(messages[0].text, GREETING);
    }

    #[tokio::test]
    async fn blank_input_is_rejected() {
        let engine = engine();
        assert_eq!(
            engine.send("   \n").await,
            TurnOutcome::Rejected(RejectReason::EmptyInput)
        );
        assert_eq!(engine.messages().len(), 1);
        assert_eq!(engine.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn submission_while_awaiting_is_rejected() {
        let engine = engine();
        let turn = engine.submit("tell me a joke").unwrap();
        assert_eq!(engine.state(), ChatState::AwaitingResponse);

        assert_eq!(engine.submit("again").unwrap_err(), RejectReason::Busy);
        assert_eq!(engine.messages().len(), 2);

        engine.complete(turn).await;
        assert_eq!(engine.state(), ChatState::Idle);
        assert!(engine.submit("now it works").is_ok());
    }

    #[tokio::test]
    async fn unmatched_input_uses_fallback_without_injection() {
        let engine = engine();
        let outcome = engine.send("hello").await;

        let TurnOutcome::Answered { reply, injection } = outcome else {
            panic!("expected an answer, got {:?}", outcome);
        };
        assert_eq!(reply.text, engine.rules().fallback().response);
        assert!(!reply.injected);
        assert!(injection.is_none());
        assert_eq!(engine.store().raw().as_deref(), Some(DOC));
    }

    #[tokio::test]
    async fn injection_updates_document() {
        let engine = engine();
        let outcome = engine.send("What risks are we missing?").await;

        let TurnOutcome::Answered { reply, injection } = outcome else {
            panic!("expected an answer");
        };
        assert!(reply.injected);
        assert_eq!(injection.unwrap().section, "Risks");

        let state = engine.store().normalize();
        let DocumentState::Ready(doc) = state else {
            panic!("expected a document");
        };
        assert_eq!(doc.risks.len(), 2);
        assert_eq!(doc.risks[1], "Payment failures");
    }

    #[tokio::test]
    async fn injection_signals_document_change() {
        let engine = engine();
        let mut changes = engine.store().subscribe();

        engine.send("add a success metric").await;

        assert!(changes.try_recv().is_ok());
        assert!(changes.try_recv().is_err());
        assert!(engine.store().raw().unwrap().contains("## Success Metrics\n- "));
        assert!(engine.messages().last().unwrap().injected);
    }

    #[tokio::test]
    async fn no_signal_without_injection() {
        let engine = engine();
        let mut changes = engine.store().subscribe();

        engine.send("explain the timeline").await;
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn log_records_user_then_ai() {
        let engine = engine();
        engine.send("summarize").await;
        engine.send("improve scalability").await;

        let senders: Vec<_> = engine.messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::Ai, Sender::User, Sender::Ai, Sender::User, Sender::Ai]
        );
        let ids: Vec<_> = engine.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_drops_pending_reply() {
        let store = Arc::new(SessionStore::new());
        store.replace(DOC, DocumentOrigin::Live);
        let engine = Arc::new(ChatEngine::new(store));

        let turn = engine.submit("add a risk").unwrap();
        assert!(!turn.delay().is_zero());

        let pending = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.complete(turn).await })
        };
        tokio::task::yield_now().await;
        engine.reset();

        assert_eq!(pending.await.unwrap(), TurnOutcome::Cancelled);
        assert_eq!(engine.messages().len(), 1);
        assert_eq!(engine.state(), ChatState::Idle);
        assert_eq!(engine.store().raw().as_deref(), Some(DOC));
    }

    #[tokio::test]
    async fn stale_turn_after_reset_is_ignored() {
        let engine = engine();
        let turn = engine.submit("add a risk").unwrap();
        engine.reset();

        // A new conversation may start while the stale turn is still held.
        let fresh = engine.submit("hello").unwrap();
        assert_eq!(engine.complete(turn).await, TurnOutcome::Cancelled);
        assert!(matches!(engine.complete(fresh).await, TurnOutcome::Answered { .. }));

        assert_eq!(engine.messages().len(), 3);
        assert_eq!(engine.store().raw().as_deref(), Some(DOC));
    }

    #[tokio::test(start_paused = true)]
    async fn reply_waits_for_delay() {
        let store = Arc::new(SessionStore::new());
        let engine = ChatEngine::new(store).with_delay(
            ResponseDelay::default()
                .with_min(Duration::from_secs(1))
                .with_max(Duration::from_secs(1)),
        );

        let started = tokio::time::Instant::now();
        engine.send("hello").await;
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn immediate_turn_completes_without_a_runtime() {
        let engine = engine();
        let outcome = tokio_test::block_on(engine.send("summarize"));
        assert!(matches!(outcome, TurnOutcome::Answered { injection: None, .. }));
    }
}
