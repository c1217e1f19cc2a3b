//! Incremental decoder for the plan event stream.
//!
//! The decoder is pure: bytes in, [`TransportEvent`]s out. It understands the
//! typed frames (`agent_progress`, `plan_complete`, `error`) and the older
//! backend frames (`session`, `chunk`, `trace`, `done`), which it folds into
//! the same events while accumulating a [`PlanResult`].

use std::collections::HashMap;

use serde::Deserialize;
use spark_app_core::TransportEvent;
use spark_config::MAX_LABEL_CHARS;
use spark_core::{AgentName, AgentProgressEvent, AgentStatus, PlanResult};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Frame {
    AgentProgress {
        data: AgentProgressEvent,
    },
    PlanComplete {
        data: PlanResult,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    Session {
        session_id: String,
    },
    Chunk {
        #[serde(default)]
        text: String,
        #[serde(default)]
        session_id: Option<String>,
    },
    Trace {
        #[serde(default)]
        data: TraceData,
        #[serde(default)]
        session_id: Option<String>,
    },
    Done,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
struct TraceData {
    #[serde(default)]
    agent: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    calling_collaborator: Option<String>,
    #[serde(default)]
    input_text: Option<String>,
    #[serde(default)]
    collaborator_response: Option<CollaboratorResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct CollaboratorResponse {
    #[serde(default)]
    agent: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    result: PlanResult,
    open_calls: HashMap<AgentName, String>,
    call_counts: HashMap<AgentName, usize>,
    finished: bool,
}

impl StreamDecoder {
    pub fn new(goal: &str) -> Self {
        Self {
            result: PlanResult {
                goal: goal.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// True once a terminal frame has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Session id announced by the stream so far.
    pub fn session_id(&self) -> &str {
        &self.result.session_id
    }

    /// Feeds raw body bytes and returns the events of every complete frame.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<TransportEvent> {
        self.buffer
            .extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let text = String::from_utf8_lossy(&frame[..end]);
            if let Some(payload) = frame_payload(&text) {
                events.extend(self.decode_frame(&payload));
            }
        }
        events
    }

    /// Flushes a trailing frame that was not followed by a blank line.
    pub fn finish(&mut self) -> Vec<TransportEvent> {
        let rest = std::mem::take(&mut self.buffer);
        let text = String::from_utf8_lossy(&rest);
        match frame_payload(&text) {
            Some(payload) => self.decode_frame(&payload),
            None => Vec::new(),
        }
    }

    /// Decodes one JSON payload (the joined `data:` lines of a frame).
    pub fn decode_frame(&mut self, payload: &str) -> Vec<TransportEvent> {
        if self.finished {
            debug!("Ignoring frame after end of stream");
            return Vec::new();
        }

        let frame: Frame = match serde_json::from_str(payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping undecodable frame: {e}");
                return Vec::new();
            }
        };

        match frame {
            Frame::AgentProgress { data } => {
                self.result.trace.push(data.clone());
                vec![TransportEvent::AgentProgress(data)]
            }
            Frame::PlanComplete { mut data } => {
                self.finished = true;
                if data.session_id.is_empty() {
                    data.session_id = self.result.session_id.clone();
                }
                vec![TransportEvent::PlanComplete(data)]
            }
            Frame::Error { message } => {
                self.finished = true;
                let message = if message.trim().is_empty() {
                    "Unknown server error".to_string()
                } else {
                    message
                };
                vec![TransportEvent::Error { message }]
            }
            Frame::Session { session_id } => {
                self.remember_session(Some(session_id));
                Vec::new()
            }
            Frame::Chunk { text, session_id } => {
                self.remember_session(session_id);
                self.result.final_plan.push_str(&text);
                Vec::new()
            }
            Frame::Trace { data, session_id } => {
                self.remember_session(session_id);
                self.translate_trace(data)
            }
            Frame::Done => {
                self.finished = true;
                let mut result = std::mem::take(&mut self.result);
                result.final_plan = result.final_plan.trim().to_string();
                vec![TransportEvent::PlanComplete(result)]
            }
            Frame::Unknown => {
                debug!("Ignoring frame of unknown type");
                Vec::new()
            }
        }
    }

    fn remember_session(&mut self, session_id: Option<String>) {
        if let Some(id) = session_id.filter(|id| !id.is_empty()) {
            if self.result.session_id.is_empty() {
                self.result.session_id = id;
            }
        }
    }

    fn translate_trace(&mut self, data: TraceData) -> Vec<TransportEvent> {
        let source = AgentName::from_label(data.agent.as_deref().unwrap_or("Supervisor"));
        let mut out = Vec::new();

        if let Some(reasoning) = data.reasoning.as_deref().filter(|r| !r.trim().is_empty()) {
            let call_id = self.current_call(&source);
            out.push(AgentProgressEvent::new(
                source.clone(),
                call_id,
                AgentStatus::Progress,
                truncate_label(reasoning),
            ));
        }

        if let Some(name) = data.calling_collaborator.as_deref() {
            let agent = AgentName::from_label(name);
            let call_id = self.open_call(&agent);
            let label = match data.input_text.as_deref().filter(|t| !t.trim().is_empty()) {
                Some(input) => truncate_label(&format!("Started: {input}")),
                None => "Started".to_string(),
            };
            out.push(AgentProgressEvent::new(
                agent,
                call_id,
                AgentStatus::Started,
                label,
            ));
        }

        if let Some(response) = data.collaborator_response {
            let agent = response
                .agent
                .as_deref()
                .map(AgentName::from_label)
                .unwrap_or_else(|| source.clone());
            let call_id = self
                .open_calls
                .remove(&agent)
                .unwrap_or_else(|| self.next_call_id(&agent));
            let output = response.output.unwrap_or_default();
            self.store_blob(&agent, &output);

            let mut ev = AgentProgressEvent::new(
                agent,
                call_id,
                AgentStatus::Completed,
                "Completed",
            );
            ev.completed = Some(true);
            if !output.is_empty() {
                ev = ev.with_output(output);
            }
            out.push(ev);
        }

        self.result.trace.extend(out.iter().cloned());
        out.into_iter().map(TransportEvent::AgentProgress).collect()
    }

    fn current_call(&mut self, agent: &AgentName) -> String {
        match self.open_calls.get(agent) {
            Some(id) => id.clone(),
            None => self.open_call(agent),
        }
    }

    fn open_call(&mut self, agent: &AgentName) -> String {
        let id = self.next_call_id(agent);
        self.open_calls.insert(agent.clone(), id.clone());
        id
    }

    fn next_call_id(&mut self, agent: &AgentName) -> String {
        let n = self.call_counts.entry(agent.clone()).or_insert(0);
        *n += 1;
        format!("{}-{}", agent.slug(), n)
    }

    fn store_blob(&mut self, agent: &AgentName, output: &str) {
        if output.trim().is_empty() {
            return;
        }
        let slot = match agent {
            AgentName::JobMarket => &mut self.result.job_market,
            AgentName::CourseCatalog => &mut self.result.course_plan,
            AgentName::ProjectAdvisor => &mut self.result.project_recommendations,
            _ => return,
        };
        *slot = Some(output.to_string());
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Joins the `data:` lines of one frame. Comments and other fields are dropped.
fn frame_payload(frame: &str) -> Option<String> {
    let lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    let payload = lines.join("\n");
    if payload.trim().is_empty() {
        None
    } else {
        Some(payload)
    }
}

fn truncate_label(text: &str) -> String {
    let first_line = text.trim().lines().next().unwrap_or_default().trim();
    if first_line.chars().count() <= MAX_LABEL_CHARS {
        return first_line.to_string();
    }
    let cut: String = first_line.chars().take(MAX_LABEL_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}
