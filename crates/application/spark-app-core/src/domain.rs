use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatHistory;
use crate::progress::RunState;
use spark_core::{PlanRequest, PlanResult};

/// What the student tells the planner about themselves. Sent along with
/// every plan request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentProfile {
    pub name: String,
    pub major: String,
    pub student_year: String,
    pub graduation_year: String,
    pub courses_taken: Vec<String>,
    pub time_commitment: String,
    pub skills: Vec<String>,
    pub career_goal: String,
    pub bio: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StudentProfile {
    /// Non-empty fields keyed the way the backend reads them.
    pub fn extra_context(&self) -> BTreeMap<String, String> {
        let lists = [
            ("courses_taken", &self.courses_taken),
            ("skills", &self.skills),
        ];
        let scalars = [
            ("user_name", &self.name),
            ("user_major", &self.major),
            ("student_year", &self.student_year),
            ("graduation_year", &self.graduation_year),
            ("time_commitment", &self.time_commitment),
            ("career_goal", &self.career_goal),
            ("bio", &self.bio),
        ];

        let mut out = BTreeMap::new();
        for (key, value) in scalars {
            let value = value.trim();
            if !value.is_empty() {
                out.insert(key.to_string(), value.to_string());
            }
        }
        for (key, values) in lists {
            let joined = values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if !joined.is_empty() {
                out.insert(key.to_string(), joined);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.extra_context().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

fn default_server_url() -> String {
    spark_config::DEFAULT_SERVER_URL.to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub boot: BootState,
    pub connection: ConnectionState,

    pub profile: StudentProfile,
    pub settings: AppSettings,

    /// Kept across plans so follow-up questions continue the conversation.
    pub session_id: Option<String>,
    pub last_request: Option<PlanRequest>,

    pub run: RunState,
    pub result: Option<PlanResult>,
    pub chat: ChatHistory,

    pub user_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            boot: BootState::Loading,
            connection: ConnectionState::Disconnected,
            profile: StudentProfile::default(),
            settings: AppSettings::default(),
            session_id: None,
            last_request: None,
            run: RunState::idle(),
            result: None,
            chat: ChatHistory::default(),
            user_error: None,
        }
    }
}

impl AppState {
    /// Request for `goal` carrying the stored profile and session.
    pub fn plan_request(&self, goal: &str) -> PlanRequest {
        PlanRequest {
            goal: goal.trim().to_string(),
            session_id: self.session_id.clone(),
            extra_context: self.profile.extra_context(),
        }
    }
}
