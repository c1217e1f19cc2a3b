use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod career;
pub mod formats;
pub mod stats;

pub use career::*;

/// A named backend worker taking part in a planning run.
///
/// The wire carries free-form labels ("job_market", "JobMarketAgent",
/// "Collaborator: course-catalog-agent"); they are folded onto the known
/// specialists by keyword and anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentName {
    JobMarket,
    CourseCatalog,
    ProjectAdvisor,
    CareerPlanner,
    Other(String),
}

impl AgentName {
    pub const SPECIALISTS: [AgentName; 4] = [
        AgentName::JobMarket,
        AgentName::CourseCatalog,
        AgentName::ProjectAdvisor,
        AgentName::CareerPlanner,
    ];

    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        let lowered = trimmed.to_lowercase();
        let lowered = lowered
            .strip_prefix("collaborator:")
            .unwrap_or(&lowered)
            .trim();

        if lowered.contains("job") || lowered.contains("market") {
            AgentName::JobMarket
        } else if lowered.contains("course") || lowered.contains("catalog") {
            AgentName::CourseCatalog
        } else if lowered.contains("project") {
            AgentName::ProjectAdvisor
        } else if lowered.contains("planner")
            || lowered.contains("career")
            || lowered.contains("supervisor")
        {
            AgentName::CareerPlanner
        } else {
            AgentName::Other(trimmed.to_string())
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            AgentName::JobMarket => "job_market",
            AgentName::CourseCatalog => "course_catalog",
            AgentName::ProjectAdvisor => "project_advisor",
            AgentName::CareerPlanner => "career_planner",
            AgentName::Other(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            AgentName::JobMarket => "Job Market Analyst",
            AgentName::CourseCatalog => "Course Catalog Specialist",
            AgentName::ProjectAdvisor => "Project Advisor",
            AgentName::CareerPlanner => "Career Planner",
            AgentName::Other(name) => name,
        }
    }
}

impl From<String> for AgentName {
    fn from(value: String) -> Self {
        AgentName::from_label(&value)
    }
}

impl From<AgentName> for String {
    fn from(value: AgentName) -> Self {
        value.slug().to_string()
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Per-call lifecycle. Ordered so that `max` never moves a call backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Started,
    Progress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    Calling,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    pub status: ToolCallStatus,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
}

impl ToolCall {
    /// Identity used when merging repeated reports of the same call.
    pub fn key(&self) -> (&str, Option<&str>) {
        (self.name.as_str(), self.function.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProgressEvent {
    pub agent: AgentName,
    pub call_id: String,
    #[serde(default)]
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AgentStatus>,
    #[serde(
        default,
        rename = "toolCalls",
        alias = "tool_calls",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tool_calls: Vec<ToolCall>,
}

impl AgentProgressEvent {
    pub fn new(
        agent: AgentName,
        call_id: impl Into<String>,
        status: AgentStatus,
        event: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            call_id: call_id.into(),
            event: event.into(),
            output: None,
            timestamp: Utc::now(),
            completed: None,
            status: Some(status),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    /// Effective lifecycle step. The terminal flag wins over the status field
    /// and an event carrying neither counts as progress.
    pub fn lifecycle(&self) -> AgentStatus {
        if self.completed == Some(true) {
            return AgentStatus::Completed;
        }
        self.status.unwrap_or(AgentStatus::Progress)
    }
}

/// Accepts RFC 3339 strings and unix seconds or milliseconds.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n.as_f64().and_then(|raw| {
            let millis = if raw > 1e11 { raw } else { raw * 1000.0 };
            Utc.timestamp_millis_opt(millis as i64).single()
        }),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(Utc::now))
}

/// Payload of a `start_plan` request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanRequest {
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_context: BTreeMap<String, String>,
}

/// Terminal snapshot of one planning run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanResult {
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub trace: Vec<AgentProgressEvent>,
    #[serde(default)]
    pub final_plan: String,
    #[serde(default)]
    pub job_market: Option<String>,
    #[serde(default)]
    pub course_plan: Option<String>,
    #[serde(default)]
    pub project_recommendations: Option<String>,
}
