//! Linear transcript built from user input and agent progress.
//!
//! Agent events are folded onto the message of their `call_id`, so one
//! invocation stays one row however many updates it streams. Matching only
//! looks at the current turn, the messages after the latest user message.

use serde::Serialize;
use spark_core::{AgentName, AgentProgressEvent, AgentStatus, ToolCall};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageMeta {
    pub agent: AgentName,
    pub call_id: String,
    pub event: String,
    pub status: AgentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub progress_updates: Vec<String>,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<MessageMeta>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
    next_id: u64,
    turn_start: usize,
}

impl ChatHistory {
    /// Replays `events` onto an empty transcript.
    pub fn from_log<'a>(events: impl IntoIterator<Item = &'a AgentProgressEvent>) -> Self {
        let mut history = Self::default();
        for event in events {
            history.apply_progress(event);
        }
        history
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("msg-{}", self.next_id)
    }

    fn push(&mut self, text: String, is_user: bool, meta: Option<MessageMeta>) -> &ChatMessage {
        let id = self.next_id();
        self.messages.push(ChatMessage {
            id,
            text,
            is_user,
            meta,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Appends the user's message and opens a new turn.
    pub fn push_user(&mut self, text: &str) -> &ChatMessage {
        self.turn_start = self.messages.len();
        self.push(text.to_string(), true, None)
    }

    /// A plain assistant message with no agent attached.
    pub fn push_system(&mut self, text: &str) -> &ChatMessage {
        self.push(text.to_string(), false, None)
    }

    pub fn push_error(&mut self, message: &str) -> &ChatMessage {
        self.push_system(&format!("Error: {message}"))
    }

    /// Folds one agent event into the transcript.
    pub fn apply_progress(&mut self, event: &AgentProgressEvent) {
        let existing = self.messages[self.turn_start..].iter_mut().find(|m| {
            !m.is_user
                && m.meta
                    .as_ref()
                    .is_some_and(|meta| meta.call_id == event.call_id)
        });

        match existing {
            Some(message) => {
                if let Some(meta) = message.meta.as_mut() {
                    merge_meta(meta, event);
                    message.text = display_text(meta);
                }
            }
            None => {
                let mut meta = MessageMeta {
                    agent: event.agent.clone(),
                    call_id: event.call_id.clone(),
                    event: String::new(),
                    status: event.lifecycle(),
                    output: None,
                    progress_updates: Vec::new(),
                    tool_calls: Vec::new(),
                };
                merge_meta(&mut meta, event);
                let text = display_text(&meta);
                self.push(text, false, Some(meta));
            }
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.turn_start = 0;
    }
}

fn merge_meta(meta: &mut MessageMeta, event: &AgentProgressEvent) {
    let step = event.lifecycle();
    meta.status = meta.status.max(step);

    let label = event.event.trim();
    if !label.is_empty() {
        meta.event = label.to_string();
        if step == AgentStatus::Progress && !meta.progress_updates.iter().any(|u| u == label) {
            meta.progress_updates.push(label.to_string());
        }
    }
    if let Some(output) = event.output.as_ref().filter(|o| !o.trim().is_empty()) {
        meta.output = Some(output.clone());
    }
    for call in &event.tool_calls {
        match meta.tool_calls.iter_mut().find(|c| c.key() == call.key()) {
            Some(slot) => *slot = call.clone(),
            None => meta.tool_calls.push(call.clone()),
        }
    }
}

fn display_text(meta: &MessageMeta) -> String {
    match &meta.output {
        Some(output) => output.clone(),
        None if !meta.event.is_empty() => meta.event.clone(),
        None => format!("{} is working", meta.agent.display_name()),
    }
}
