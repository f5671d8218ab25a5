//! Page-session state of the travel chat.
//!
//! Nothing here is persisted; a session lives as long as the process (or the
//! TUI) that created it.

use crate::error::StreamError;
use crate::stream::FinalResult;
use serde::{Deserialize, Serialize};

/// Prompt sent with agent `pdf_generator` to export the conversation.
pub const EXPORT_PROMPT: &str = "Summarize all of the conversation above and generate a PDF.";

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub is_user: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: true,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: false,
        }
    }
}

/// Transcript plus the current plan.
///
/// The transcript only grows, two entries per completed turn: the user's
/// message, then the assistant's reply.
#[derive(Debug, Default)]
pub struct TravelSession {
    history: Vec<ChatMessage>,
    current_plan: Option<String>,
    trip_info: Option<String>,
    planning: bool,
}

impl TravelSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn current_plan(&self) -> Option<&str> {
        self.current_plan.as_deref()
    }

    /// Information the planner collected alongside the current plan.
    pub fn trip_info(&self) -> Option<&str> {
        self.trip_info.as_deref()
    }

    pub fn is_planning(&self) -> bool {
        self.planning
    }

    /// Mark a plan request as in flight. Only one may run at a time.
    pub fn begin_planning(&mut self) -> Result<(), StreamError> {
        if self.planning {
            return Err(StreamError::Rejected(
                "a travel plan is already being generated".to_string(),
            ));
        }
        self.planning = true;
        Ok(())
    }

    /// Close a plan request. A clean result becomes the current plan and a
    /// transcript turn.
    pub fn end_planning(&mut self, request_summary: &str, result: Option<&FinalResult>) {
        self.planning = false;
        if let Some(result) = result {
            if self.record_turn(request_summary, result) {
                self.current_plan = Some(result.accumulated_text.clone());
                self.trip_info = result.info_result.clone();
            }
        }
    }

    /// Append a user/assistant pair for a finished stream. Streams that ended
    /// with an in-band error are not recorded.
    pub fn record_turn(&mut self, user: &str, result: &FinalResult) -> bool {
        if result.is_error() {
            tracing::debug!("not recording failed turn");
            return false;
        }
        self.history.push(ChatMessage::user(user));
        self.history.push(ChatMessage::assistant(result.accumulated_text.as_str()));
        true
    }

    pub fn can_export(&self) -> bool {
        !self.history.is_empty()
    }

    /// Plain-text transcript, one block per message.
    pub fn transcript_text(&self) -> String {
        let mut out = String::new();
        for msg in &self.history {
            let who = if msg.is_user { "User" } else { "Assistant" };
            out.push_str(who);
            out.push_str(": ");
            out.push_str(&msg.content);
            out.push_str("\n\n");
        }
        out
    }

    /// Drop the transcript and plan.
    pub fn clear(&mut self) {
        self.history.clear();
        self.current_plan = None;
        self.trip_info = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(text: &str) -> FinalResult {
        FinalResult {
            accumulated_text: text.to_string(),
            done: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_turns_append_in_pairs() {
        let mut s = TravelSession::new();
        assert!(!s.can_export());

        assert!(s.record_turn("Best food in Chengdu?", &ok("Hotpot.")));
        assert!(s.record_turn("And tea?", &ok("Heming teahouse.")));

        let h = s.history();
        assert_eq!(h.len(), 4);
        assert_eq!(h[0], ChatMessage::user("Best food in Chengdu?"));
        assert_eq!(h[1], ChatMessage::assistant("Hotpot."));
        assert!(h[2].is_user);
        assert!(!h[3].is_user);
        assert!(s.can_export());
    }

    #[test]
    fn test_failed_turn_not_recorded() {
        let mut s = TravelSession::new();
        let failed = FinalResult {
            accumulated_text: "partial".into(),
            error: Some("quota exceeded".into()),
            ..Default::default()
        };
        assert!(!s.record_turn("hi", &failed));
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_planning_flag() {
        let mut s = TravelSession::new();
        s.begin_planning().unwrap();
        assert!(s.is_planning());
        assert!(matches!(s.begin_planning(), Err(StreamError::Rejected(_))));

        let mut plan = ok("Day 1: Bund");
        plan.info_result = Some("2 adults, history".into());
        s.end_planning("trip request", Some(&plan));
        assert!(!s.is_planning());
        assert_eq!(s.current_plan(), Some("Day 1: Bund"));
        assert_eq!(s.trip_info(), Some("2 adults, history"));
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn test_transport_failure_leaves_no_plan() {
        let mut s = TravelSession::new();
        s.begin_planning().unwrap();
        s.end_planning("trip request", None);
        assert!(!s.is_planning());
        assert!(s.current_plan().is_none());
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_transcript_text() {
        let mut s = TravelSession::new();
        s.record_turn("Q", &ok("A"));
        assert_eq!(s.transcript_text(), "User: Q\n\nAssistant: A\n\n");

        s.clear();
        assert!(s.transcript_text().is_empty());
    }
}
