//! Run-level progress state and its pure reducer.
//!
//! Each call moves `started -> progress* -> completed` and never back. The
//! run as a whole moves `idle -> running -> completed | error`; once
//! terminal, further agent events are dropped.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use spark_config::{clamp_percent, SPECIALIST_AGENT_COUNT};
use spark_core::{AgentName, AgentProgressEvent, AgentStatus, ToolCall};
use tracing::debug;
use uuid::Uuid;

pub type RunId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    Running,
    Completed,
    Error,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::Error)
    }
}

/// Latest known detail of one agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallProgress {
    pub agent: AgentName,
    pub status: AgentStatus,
    pub label: String,
    pub output: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Connected,
    Agent(AgentProgressEvent),
    PlanComplete,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub run_id: Option<RunId>,
    pub phase: RunPhase,
    pub connected: bool,
    pub running_agents: BTreeSet<AgentName>,
    pub calls: BTreeMap<String, CallProgress>,
    pub progress_log: Vec<AgentProgressEvent>,
    pub error: Option<String>,
}

impl RunState {
    pub fn idle() -> Self {
        Self {
            run_id: None,
            phase: RunPhase::Idle,
            connected: false,
            running_agents: BTreeSet::new(),
            calls: BTreeMap::new(),
            progress_log: Vec::new(),
            error: None,
        }
    }

    /// Fresh state for a newly started plan.
    pub fn starting(run_id: RunId) -> Self {
        Self {
            run_id: Some(run_id),
            phase: RunPhase::Running,
            ..Self::idle()
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::idle()
    }
}

pub fn reduce_run(mut state: RunState, ev: RunEvent) -> RunState {
    match ev {
        RunEvent::Connected => {
            state.connected = true;
        }

        RunEvent::Agent(event) => {
            if state.is_terminal() {
                debug!(call_id = %event.call_id, "dropping agent event after run finished");
                return state;
            }
            apply_agent_event(&mut state, event);
        }

        RunEvent::PlanComplete => {
            if state.phase == RunPhase::Error {
                return state;
            }
            state.phase = RunPhase::Completed;
            state.running_agents.clear();
        }

        RunEvent::Failed(message) => {
            if state.is_terminal() {
                return state;
            }
            state.phase = RunPhase::Error;
            state.running_agents.clear();
            state.error = Some(message);
        }
    }
    state
}

fn apply_agent_event(state: &mut RunState, event: AgentProgressEvent) {
    let step = event.lifecycle();

    let call = state
        .calls
        .entry(event.call_id.clone())
        .or_insert_with(|| CallProgress {
            agent: event.agent.clone(),
            status: step,
            label: String::new(),
            output: None,
            tool_calls: Vec::new(),
        });
    call.status = call.status.max(step);
    if !event.event.trim().is_empty() {
        call.label = event.event.clone();
    }
    if event.output.is_some() {
        call.output = event.output.clone();
    }
    if !event.tool_calls.is_empty() {
        call.tool_calls = event.tool_calls.clone();
    }
    let call_finished = call.status == AgentStatus::Completed;

    if step == AgentStatus::Completed {
        state.running_agents.remove(&event.agent);
    } else if !call_finished {
        state.running_agents.insert(event.agent.clone());
    }

    if state.phase == RunPhase::Idle {
        state.phase = RunPhase::Running;
    }
    state.progress_log.push(event);
}

/// Label words counted as a finished step by [`progress_percent`].
const COMPLETION_WORDS: [&str; 2] = ["completed", "generated"];

fn is_completion_signal(label: &str) -> bool {
    let lowered = label.to_lowercase();
    COMPLETION_WORDS.iter().any(|w| lowered.contains(w))
}

/// Display-only estimate: completion-worded labels over twice the
/// specialist count. Matches on the label text, not on the status, so it
/// may over- or under-count.
pub fn progress_percent(state: &RunState) -> u8 {
    let signals = state
        .progress_log
        .iter()
        .filter(|e| is_completion_signal(&e.event))
        .count();
    let denominator = (SPECIALIST_AGENT_COUNT * 2) as f32;
    clamp_percent(signals as f32 * 100.0 / denominator)
}
