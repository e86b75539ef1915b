use log::{debug, error};
use regex::Regex;

use super::{Assistant, ChatMessage, SendPayload};
use crate::{MindlineError, Result};

/// First message of every session
pub const GREETING: &str = "Hi! I'm MindLine. What would you like to talk about today? \
     (I can suggest exercises or resources.)";

/// Answer given, without asking the assistant, to messages outside the chat's topic
pub const OFF_TOPIC_REPLY: &str = "Let's try to keep to mental health and self-care topics. \
     Would you like me to guide you through a short exercise?";

const ON_TOPIC_PATTERN: &str = r"(?i)(salud|health|mental|ansiedad|anxi|estr[eé]s|stress|depresi[oó]n|depress|autocuidado|self[- ]?care|apoyo|support|respiraci[oó]n|breath|seguridad|safety|crisis)";

/// An anonymous support chat transcript driven by an [`Assistant`]
pub struct ChatSession<A> {
    assistant: A,
    messages: Vec<ChatMessage>,
    on_topic: Regex,
    pending: bool,
    last_error: Option<String>,
}

impl<A: Assistant> ChatSession<A> {
    pub fn new(assistant: A) -> Result<Self> {
        let on_topic = Regex::new(ON_TOPIC_PATTERN).map_err(|e| MindlineError::ApplicationError {
            message: format!("Invalid topic pattern: {}", e),
        })?;

        Ok(Self {
            assistant,
            messages: vec![ChatMessage::assistant(GREETING)],
            on_topic,
            pending: false,
            last_error: None,
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while waiting on the assistant
    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_on_topic(&self, text: &str) -> bool {
        self.on_topic.is_match(text)
    }

    /// Sends a user message and appends the reply to the transcript.
    ///
    /// # Returns
    ///
    /// The reply, or `None` for blank input (which is ignored). Off-topic messages get
    /// a fixed redirect without contacting the assistant. Assistant failures are
    /// returned and remembered in [`ChatSession::last_error`]; the user message stays
    /// in the transcript.
    pub async fn send(&mut self, text: &str) -> Result<Option<ChatMessage>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.last_error = None;
        self.messages.push(ChatMessage::user(text));

        if !self.is_on_topic(text) {
            debug!("Off-topic message, redirecting");
            let reply = ChatMessage::assistant(OFF_TOPIC_REPLY);
            self.messages.push(reply.clone());
            return Ok(Some(reply));
        }

        let payload = SendPayload::from_transcript(&self.messages);
        self.pending = true;
        let response = self.assistant.send(&payload).await;
        self.pending = false;

        match response {
            Ok(response) => {
                self.messages.push(response.message.clone());
                Ok(Some(response.message))
            }
            Err(e) => {
                error!("Assistant request failed: {}", e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::chat::{ChatResponse, Role};

    /// Records payloads and answers with a fixed text, or fails when `fail` is set
    #[derive(Default)]
    struct Scripted {
        seen: RefCell<Vec<SendPayload>>,
        fail: bool,
    }

    impl Assistant for &Scripted {
        async fn send(&self, payload: &SendPayload) -> Result<ChatResponse> {
            self.seen.borrow_mut().push(payload.clone());
            if self.fail {
                return Err(MindlineError::AssistantError {
                    message: "Network error".to_string(),
                });
            }
            Ok(ChatResponse {
                id: "r1".to_string(),
                message: ChatMessage::assistant("scripted"),
            })
        }
    }

    #[tokio::test]
    async fn starts_with_a_greeting() {
        let scripted = Scripted::default();
        let session = ChatSession::new(&scripted).unwrap();

        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Assistant);
        assert_eq!(session.messages()[0].content, GREETING);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let scripted = Scripted::default();
        let mut session = ChatSession::new(&scripted).unwrap();

        assert!(session.send("   ").await.unwrap().is_none());
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn off_topic_input_is_redirected_locally() {
        let scripted = Scripted::default();
        let mut session = ChatSession::new(&scripted).unwrap();

        let reply = session.send("who won the match?").await.unwrap().unwrap();

        assert_eq!(reply.content, OFF_TOPIC_REPLY);
        assert_eq!(session.messages().len(), 3);
        assert!(scripted.seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn on_topic_input_sends_the_whole_transcript() {
        let scripted = Scripted::default();
        let mut session = ChatSession::new(&scripted).unwrap();

        let reply = session.send("I feel a lot of stress").await.unwrap().unwrap();

        assert_eq!(reply.content, "scripted");
        assert_eq!(session.messages().len(), 3);
        assert!(!session.pending());

        let seen = scripted.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].messages.len(), 2);
        assert_eq!(seen[0].messages[0].content, GREETING);
        assert_eq!(seen[0].last_content(), "I feel a lot of stress");
    }

    #[tokio::test]
    async fn assistant_failure_is_returned_and_remembered() {
        let scripted = Scripted {
            fail: true,
            ..Default::default()
        };
        let mut session = ChatSession::new(&scripted).unwrap();

        assert!(session.send("mental health tips").await.is_err());
        assert_eq!(session.last_error(), Some("Assistant error: Network error"));
        assert_eq!(session.messages().len(), 2);
        assert!(!session.pending());
    }

    #[tokio::test]
    async fn topic_filter_understands_spanish_and_english() {
        let scripted = Scripted::default();
        let session = ChatSession::new(&scripted).unwrap();

        assert!(session.is_on_topic("Necesito apoyo"));
        assert!(session.is_on_topic("tips for SELF-CARE"));
        assert!(!session.is_on_topic("what's the weather"));
    }
}
