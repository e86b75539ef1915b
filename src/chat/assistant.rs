//! The assistant seam of the support chat and its canned implementation.
use std::time::Duration;

use log::debug;
use rand::seq::SliceRandom;
use regex::Regex;
use uuid::Uuid;

use super::{ChatMessage, ChatResponse, SendPayload};
use crate::{MindlineError, Result};

/// Reply used when the user mentions breathing, anxiety, stress or depression
pub const BREATHING_REPLY: &str = "Let's try 4-7-8 breathing: inhale for 4 seconds, hold for 7, \
     exhale for 8. Repeat 4 times. How do you feel?";

/// Replies picked at random for everything else
pub const CANNED_REPLIES: [&str; 3] = [
    "Thank you for sharing that. Would you like to try a 4-7-8 breathing exercise?",
    "I can suggest some resources and a safety plan. Where would you like to start?",
    "Asking for help is okay. Is there someone you trust you could talk to today?",
];

const BREATHING_PATTERN: &str = r"(?i)breath|respir|anxi|ansied|stress|estr[eé]s|depres";

/// Something that answers a chat transcript.
#[allow(async_fn_in_trait)]
pub trait Assistant {
    async fn send(&self, payload: &SendPayload) -> Result<ChatResponse>;
}

/// Local stand-in for a real chat backend
pub struct MockAssistant {
    latency: Duration,
    breathing: Regex,
}

impl MockAssistant {
    pub fn new(latency: Duration) -> Result<Self> {
        let breathing = Regex::new(BREATHING_PATTERN).map_err(|e| MindlineError::ApplicationError {
            message: format!("Invalid assistant pattern: {}", e),
        })?;
        Ok(Self { latency, breathing })
    }

    /// Picks the reply text for a message without waiting
    pub fn reply_for(&self, last: &str) -> &'static str {
        if self.breathing.is_match(last) {
            return BREATHING_REPLY;
        }
        CANNED_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CANNED_REPLIES[0])
    }
}

impl Assistant for MockAssistant {
    async fn send(&self, payload: &SendPayload) -> Result<ChatResponse> {
        let text = self.reply_for(payload.last_content());
        debug!(
            "Mock assistant answering {} messages after {:?}",
            payload.messages.len(),
            self.latency
        );

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(ChatResponse {
            id: Uuid::new_v4().to_string(),
            message: ChatMessage::assistant(text),
        })
    }
}
