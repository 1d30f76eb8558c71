//! Conversation store: append-only message history plus a single-flight query guard.
//!
//! A submission is split in two so the presentation layer can observe the
//! user message (and the pending flag) while the query is in flight:
//! [`ConversationStore::begin_submit`] appends the user message and hands back
//! a [`PendingQuery`] ticket, [`ConversationStore::complete`] consumes the
//! ticket together with the transport result. [`ConversationStore::submit`]
//! runs both around one [`Client::ask`] call.
//!
//! Every [`ConversationStore::reset`] starts a new generation. A ticket from
//! an older generation completes as [`SubmitOutcome::Stale`] and appends
//! nothing, so an answer never lands in a conversation that did not ask it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{Client, ClientError};
use crate::messages::AskResponse;

/// Shown in place of an answer whenever the query fails, whatever the cause.
pub const FALLBACK_ANSWER: &str = "Sorry, I encountered an error while processing your request. \
Please make sure the backend server is running and try again.";

/// Answers scoring below this are flagged to the user.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One chat message. Never changed after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub matched_question: Option<String>,
    pub confidence_score: Option<f64>,
}

impl Message {
    fn user(text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            text,
            created_at: Utc::now(),
            matched_question: None,
            confidence_score: None,
        }
    }

    fn answer(response: AskResponse) -> Self {
        let matched_question = response
            .matched_question
            .filter(|q| !q.trim().is_empty());
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            text: response.answer,
            created_at: Utc::now(),
            matched_question,
            confidence_score: Some(response.confidence_score.clamp(0.0, 1.0)),
        }
    }

    fn fallback() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            text: FALLBACK_ANSWER.to_string(),
            created_at: Utc::now(),
            matched_question: None,
            confidence_score: Some(0.0),
        }
    }

    pub fn confidence_level(&self) -> Option<ConfidenceLevel> {
        self.confidence_score.map(ConfidenceLevel::from_score)
    }

    /// True for assistant answers the backend was unsure about.
    pub fn is_low_confidence(&self) -> bool {
        self.confidence_score
            .is_some_and(|s| s < LOW_CONFIDENCE_THRESHOLD)
    }
}

/// Coarse bucket for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }
}

/// Ticket for a query in flight. Not `Clone`: each query completes once.
#[derive(Debug)]
pub struct PendingQuery {
    question: String,
    generation: u64,
}

impl PendingQuery {
    pub fn question(&self) -> &str {
        &self.question
    }
}

/// What a submission did to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input or a query already pending; nothing appended.
    Ignored,
    /// User message and backend answer appended.
    Answered,
    /// User message and the fallback answer appended.
    Failed,
    /// The conversation was reset while the query was in flight; result dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    history: Vec<Message>,
    pending: bool,
    generation: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Append the trimmed user message and mark a query pending.
    /// `None` when `text` is blank or another query is still pending.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingQuery> {
        let question = text.trim();
        if question.is_empty() {
            return None;
        }
        if self.pending {
            tracing::debug!("query already pending, ignoring submit");
            return None;
        }
        self.history.push(Message::user(question.to_string()));
        self.pending = true;
        Some(PendingQuery {
            question: question.to_string(),
            generation: self.generation,
        })
    }

    /// Settle a query: append exactly one assistant message and clear `pending`.
    /// Failures become the fallback answer and are not returned.
    pub fn complete(
        &mut self,
        query: PendingQuery,
        result: Result<AskResponse, ClientError>,
    ) -> SubmitOutcome {
        if query.generation != self.generation {
            tracing::debug!(
                question = %query.question,
                "dropping answer for a reset conversation"
            );
            return SubmitOutcome::Stale;
        }
        self.pending = false;
        match result {
            Ok(response) => {
                self.history.push(Message::answer(response));
                SubmitOutcome::Answered
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch response");
                self.history.push(Message::fallback());
                SubmitOutcome::Failed
            }
        }
    }

    /// Submit `text` and wait for the answer. Exactly one request per call, no retry.
    pub async fn submit(&mut self, client: &Client, text: &str) -> SubmitOutcome {
        let Some(query) = self.begin_submit(text) else {
            return SubmitOutcome::Ignored;
        };
        let result = client.ask(query.question()).await;
        self.complete(query, result)
    }

    /// Start a new conversation. Outstanding queries become stale.
    pub fn reset(&mut self) {
        self.history.clear();
        self.pending = false;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn answer(text: &str, matched: Option<&str>, score: f64) -> AskResponse {
        AskResponse {
            answer: text.into(),
            matched_question: matched.map(Into::into),
            confidence_score: score,
        }
    }

    fn server_error() -> ClientError {
        ClientError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }
    }

    #[test]
    fn begin_appends_trimmed_user_message_before_completion() {
        let mut store = ConversationStore::new();
        let query = store.begin_submit("  How do I pay?  ").unwrap();

        assert_eq!(query.question(), "How do I pay?");
        assert!(store.is_pending());
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].role, Role::User);
        assert_eq!(store.history()[0].text, "How do I pay?");
        assert_eq!(store.history()[0].confidence_score, None);
    }

    #[test]
    fn blank_input_is_a_no_op() {
        let mut store = ConversationStore::new();
        assert!(store.begin_submit("").is_none());
        assert!(store.begin_submit("   ").is_none());
        assert!(store.is_empty());
        assert!(!store.is_pending());
    }

    #[test]
    fn submit_while_pending_is_a_no_op() {
        let mut store = ConversationStore::new();
        let _first = store.begin_submit("first").unwrap();
        assert!(store.begin_submit("second").is_none());
        assert_eq!(store.history().len(), 1);
        assert!(store.is_pending());
    }

    #[test]
    fn success_appends_one_assistant_message() {
        let mut store = ConversationStore::new();
        let query = store.begin_submit("How do I pay?").unwrap();
        let outcome = store.complete(
            query,
            Ok(answer("By card.", Some("What payment methods do you accept?"), 0.91)),
        );

        assert_eq!(outcome, SubmitOutcome::Answered);
        assert!(!store.is_pending());
        assert_eq!(store.history().len(), 2);
        let reply = &store.history()[1];
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.text, "By card.");
        assert_eq!(
            reply.matched_question.as_deref(),
            Some("What payment methods do you accept?")
        );
        assert_eq!(reply.confidence_score, Some(0.91));
        assert_eq!(reply.confidence_level(), Some(ConfidenceLevel::High));
    }

    #[test]
    fn failure_appends_fallback_with_zero_confidence() {
        let mut store = ConversationStore::new();
        let query = store.begin_submit("hello").unwrap();
        let outcome = store.complete(query, Err(server_error()));

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert!(!store.is_pending());
        assert_eq!(store.history().len(), 2);
        assert_eq!(store.history()[1].text, FALLBACK_ANSWER);
        assert_eq!(store.history()[1].confidence_score, Some(0.0));
        assert!(store.history()[1].is_low_confidence());
    }

    #[test]
    fn empty_matched_question_is_dropped() {
        let mut store = ConversationStore::new();
        let query = store.begin_submit("???").unwrap();
        store.complete(query, Ok(answer("Please rephrase.", Some(""), 0.1)));
        assert_eq!(store.history()[1].matched_question, None);
    }

    #[test]
    fn score_is_clamped_to_unit_interval() {
        let mut store = ConversationStore::new();
        let query = store.begin_submit("q").unwrap();
        store.complete(query, Ok(answer("a", None, 1.0000002)));
        assert_eq!(store.history()[1].confidence_score, Some(1.0));
    }

    #[test]
    fn history_grows_by_two_per_cycle() {
        let mut store = ConversationStore::new();
        for i in 0..3 {
            let query = store.begin_submit(&format!("question {i}")).unwrap();
            store.complete(query, Ok(answer("a", None, 0.5)));
            assert_eq!(store.history().len(), 2 * (i + 1));
        }
        let roles: Vec<Role> = store.history().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
    }

    #[test]
    fn reset_clears_history_and_pending() {
        let mut store = ConversationStore::new();
        let query = store.begin_submit("q").unwrap();
        store.complete(query, Ok(answer("a", None, 0.5)));
        let _in_flight = store.begin_submit("another").unwrap();

        store.reset();
        assert!(store.is_empty());
        assert!(!store.is_pending());
    }

    #[test]
    fn answer_for_reset_conversation_is_dropped() {
        let mut store = ConversationStore::new();
        let stale = store.begin_submit("old question").unwrap();
        store.reset();

        let fresh = store.begin_submit("new question").unwrap();
        assert_eq!(
            store.complete(stale, Ok(answer("old answer", None, 0.9))),
            SubmitOutcome::Stale
        );
        assert!(store.is_pending(), "stale completion must not clear the fresh query");
        assert_eq!(store.history().len(), 1);

        store.complete(fresh, Ok(answer("new answer", None, 0.9)));
        let texts: Vec<&str> = store.history().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["new question", "new answer"]);
    }

    #[test]
    fn confidence_buckets() {
        assert_eq!(ConfidenceLevel::from_score(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.79), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.5), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.49), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.0).label(), "Low");
    }

    #[test]
    fn ids_are_unique() {
        let mut store = ConversationStore::new();
        let query = store.begin_submit("q").unwrap();
        store.complete(query, Ok(answer("a", None, 0.5)));
        assert_ne!(store.history()[0].id, store.history()[1].id);
    }
}
