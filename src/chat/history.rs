//! Saved chat conversations.
//!
//! The history is a bounded list kept newest first and persisted as a whole, the
//! same load-all / mutate / rewrite-all pattern the note store uses.
use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use super::{ChatMessage, Role};
use crate::{escape_html, JsonSlot};

/// A transcript saved at the end of a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    /// When the conversation was saved
    pub date: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    /// First user message, used as a title in listings
    pub fn summary(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

pub struct ConversationHistory {
    slot: JsonSlot,
    /// Newest first
    conversations: Vec<Conversation>,
    max_entries: usize,
    page_size: usize,
}

impl ConversationHistory {
    /// Opens the history stored in `slot`; unreadable data yields an empty history
    pub fn open(slot: JsonSlot, max_entries: usize, page_size: usize) -> Self {
        let conversations = match slot.read::<Conversation>() {
            Ok(Some(conversations)) => conversations,
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(
                    "Error loading conversations from {}: {}",
                    slot.path().display(),
                    e
                );
                Vec::new()
            }
        };
        debug!("Loaded {} saved conversations", conversations.len());

        Self {
            slot,
            conversations,
            max_entries,
            page_size: page_size.max(1),
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Saves `messages` as the newest conversation.
    ///
    /// Nothing is saved for an empty transcript or one identical (by role, content
    /// and timestamp of every message) to the most recently saved conversation.
    /// The oldest entries are dropped beyond the configured maximum.
    pub fn save_if_needed(&mut self, messages: &[ChatMessage]) -> Option<&Conversation> {
        if messages.is_empty() {
            return None;
        }
        if self
            .conversations
            .first()
            .is_some_and(|latest| same_conversation(&latest.messages, messages))
        {
            debug!("Transcript matches the latest saved conversation, skipping");
            return None;
        }

        let now = Utc::now();
        let conversation = Conversation {
            id: self.next_id(now),
            date: now,
            messages: messages.to_vec(),
        };
        info!("Saving conversation {}", conversation.id);

        self.conversations.insert(0, conversation);
        self.conversations.truncate(self.max_entries);
        self.persist();
        self.conversations.first()
    }

    /// Removes the conversation with `id`, returning whether it existed
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            return false;
        }
        info!("Deleted conversation {}", id);
        self.persist();
        true
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages, never less than one
    pub fn total_pages(&self) -> usize {
        self.conversations.len().div_ceil(self.page_size).max(1)
    }

    /// Conversations on the zero-based `page`; empty past the end
    pub fn page(&self, page: usize) -> &[Conversation] {
        let start = page.saturating_mul(self.page_size).min(self.conversations.len());
        let end = start.saturating_add(self.page_size).min(self.conversations.len());
        &self.conversations[start..end]
    }

    /// Moves `page` back into range, e.g. after deleting the last item of the last page
    pub fn clamp_page(&self, page: usize) -> usize {
        page.min(self.total_pages() - 1)
    }

    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut millis = now.timestamp_millis();
        loop {
            let id = format!("conv-{}", millis);
            if self.get(&id).is_none() {
                return id;
            }
            millis += 1;
        }
    }

    fn persist(&self) {
        if let Err(e) = self.slot.write(&self.conversations) {
            warn!(
                "Error saving conversations to {}: {}",
                self.slot.path().display(),
                e
            );
        }
    }
}

fn same_conversation(a: &[ChatMessage], b: &[ChatMessage]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.role == y.role && x.content == y.content && x.created_at == y.created_at
        })
}

/// Renders a transcript as a standalone, printable HTML page
pub fn render_transcript_html(messages: &[ChatMessage]) -> String {
    let mut html = String::from(
        "<!doctype html><html><head><meta charset=\"utf-8\"/>\n<title>MindLine chat</title>\n\
         <style>body{font-family:Arial,Helvetica,sans-serif;margin:24px;color:#111}\
         .msg{margin:0 0 12px}\
         .bubble{display:inline-block;max-width:72%;padding:10px 12px;border-radius:14px;background:#f2f2f2}\
         .me .bubble{background:#5B3E46;color:#fff}\
         .time{font-size:10px;opacity:.6;margin-top:4px}</style></head><body>\n\
         <h2>Conversation</h2>\n",
    );

    for message in messages {
        let class = if message.role == Role::User { "msg me" } else { "msg" };
        let time = message
            .created_at_utc()
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let _ = write!(
            html,
            "<div class=\"{}\"><div class=\"bubble\">{}</div><div class=\"time\">{}</div></div>\n",
            class,
            escape_html(&message.content),
            time
        );
    }

    html.push_str("</body></html>\n");
    html
}
