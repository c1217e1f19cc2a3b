use serde::Serialize;

use crate::chat::ChatHistory;
use crate::domain::{AppState, BootState};
use crate::progress::{progress_percent, RunPhase, RunState};
use spark_core::formats::{parse_course_plan, parse_job_market, parse_projects};
use spark_core::stats::{extract, StatItem, Summarize};
use spark_core::{AgentStatus, CoursePlan, JobMarketInsights, PlanResult, ProjectRecommendations};

// --- Run ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunVm {
    pub phase: RunPhase,
    pub percent: u8,
    pub running_agents: Vec<String>,
    pub status_label: String,
    pub error: Option<String>,
    pub can_start: bool,
    pub can_clear: bool,
}

fn status_label(run: &RunState) -> String {
    match run.phase {
        RunPhase::Idle => "Ready".into(),
        RunPhase::Running if !run.connected && run.progress_log.is_empty() => {
            "Connecting".into()
        }
        RunPhase::Running => match run.running_agents.len() {
            0 => "Planning".into(),
            1 => "1 agent working".into(),
            n => format!("{n} agents working"),
        },
        RunPhase::Completed => "Plan complete".into(),
        RunPhase::Error => "Failed".into(),
    }
}

pub fn run_vm(state: &AppState) -> RunVm {
    let run = &state.run;
    RunVm {
        phase: run.phase,
        percent: progress_percent(run),
        running_agents: run
            .running_agents
            .iter()
            .map(|a| a.display_name().to_string())
            .collect(),
        status_label: status_label(run),
        error: run.error.clone().or_else(|| state.user_error.clone()),
        can_start: state.boot == BootState::Ready && !run.is_running(),
        can_clear: !state.chat.is_empty() || run.phase != RunPhase::Idle,
    }
}

// --- Results ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPanelVm<R> {
    pub record: R,
    pub stats: Vec<StatItem>,
}

impl<R: Summarize> RecordPanelVm<R> {
    fn new(record: R) -> Self {
        let stats = extract(&record);
        Self { record, stats }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultsVm {
    pub job_market: Option<RecordPanelVm<JobMarketInsights>>,
    pub course_plan: Option<RecordPanelVm<CoursePlan>>,
    pub projects: Option<RecordPanelVm<ProjectRecommendations>>,
}

impl ResultsVm {
    pub fn is_empty(&self) -> bool {
        self.job_market.is_none() && self.course_plan.is_none() && self.projects.is_none()
    }
}

/// Parses whichever result blobs are present. Missing or unusable blobs
/// leave their panel empty.
pub fn results_vm(result: &PlanResult) -> ResultsVm {
    let blob = |b: &Option<String>| b.as_deref().unwrap_or("").to_owned();
    ResultsVm {
        job_market: parse_job_market(&blob(&result.job_market)).map(RecordPanelVm::new),
        course_plan: parse_course_plan(&blob(&result.course_plan)).map(RecordPanelVm::new),
        projects: parse_projects(&blob(&result.project_recommendations)).map(RecordPanelVm::new),
    }
}

// --- Chat ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRowVm {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub agent_label: Option<String>,
    pub status_badge: Option<&'static str>,
    pub progress_updates: Vec<String>,
    pub tool_calls: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatVm {
    pub rows: Vec<ChatRowVm>,
}

fn status_badge(status: AgentStatus) -> &'static str {
    match status {
        AgentStatus::Started => "started",
        AgentStatus::Progress => "working",
        AgentStatus::Completed => "done",
    }
}

pub fn chat_vm(history: &ChatHistory) -> ChatVm {
    ChatVm {
        rows: history
            .messages()
            .iter()
            .map(|m| ChatRowVm {
                id: m.id.clone(),
                text: m.text.clone(),
                is_user: m.is_user,
                agent_label: m
                    .meta
                    .as_ref()
                    .map(|meta| meta.agent.display_name().to_string()),
                status_badge: m.meta.as_ref().map(|meta| status_badge(meta.status)),
                progress_updates: m
                    .meta
                    .as_ref()
                    .map(|meta| meta.progress_updates.clone())
                    .unwrap_or_default(),
                tool_calls: m.meta.as_ref().map_or(0, |meta| meta.tool_calls.len()),
            })
            .collect(),
    }
}
