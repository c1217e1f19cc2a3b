//! Typed projections of the three agent result blobs.
//!
//! Every value here is schema-valid by construction: required strings are
//! non-empty and enums only hold known variants. Coercion from loose input
//! lives in [`crate::formats`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Unknown or missing values fall back to `Intermediate`.
    pub fn coerce(raw: &str) -> Self {
        Self::recognize(raw).unwrap_or_default()
    }

    pub fn recognize(raw: &str) -> Option<Self> {
        let lowered = raw.to_lowercase();
        if lowered.contains("beginner") {
            Some(Difficulty::Beginner)
        } else if lowered.contains("intermediate") {
            Some(Difficulty::Intermediate)
        } else if lowered.contains("advanced") {
            Some(Difficulty::Advanced)
        } else {
            None
        }
    }
}

/// Demand or importance rating. Defaults to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    #[default]
    Medium,
    Low,
}

impl Level {
    pub fn coerce(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered.contains("high") {
            Level::High
        } else if lowered.contains("low") {
            Level::Low
        } else {
            Level::Medium
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    pub fn coerce(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered.contains("up") || lowered.contains("rising") {
            Trend::Up
        } else if lowered.contains("down") || lowered.contains("declin") {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn recognize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Tutoring,
    Workshop,
    Lab,
    Club,
    Certification,
    #[default]
    Other,
}

impl ResourceKind {
    pub fn recognize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "tutoring" => Some(ResourceKind::Tutoring),
            "workshop" => Some(ResourceKind::Workshop),
            "lab" => Some(ResourceKind::Lab),
            "club" => Some(ResourceKind::Club),
            "certification" => Some(ResourceKind::Certification),
            "other" => Some(ResourceKind::Other),
            _ => None,
        }
    }
}

// --- Projects ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_relevance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProjectRecommendations {
    pub projects: Vec<Project>,
}

// --- Courses ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    pub difficulty: Difficulty,
    pub prerequisites: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterPlan {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrerequisiteLink {
    pub course: String,
    pub required_for: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillArea {
    pub name: String,
    pub importance: Level,
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcademicResource {
    pub kind: ResourceKind,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CoursePlan {
    pub courses: Vec<Course>,
    pub semesters: Vec<SemesterPlan>,
    pub prerequisites: Vec<PrerequisiteLink>,
    pub skill_areas: Vec<SkillArea>,
    pub resources: Vec<AcademicResource>,
}

impl CoursePlan {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
            && self.semesters.is_empty()
            && self.prerequisites.is_empty()
            && self.skill_areas.is_empty()
            && self.resources.is_empty()
    }
}

// --- Job market ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotRole {
    pub title: String,
    pub openings: u32,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InDemandSkill {
    pub name: String,
    pub demand: Level,
    pub listings: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEmployer {
    pub name: String,
    pub openings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketTrend {
    pub sentiment: Sentiment,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct JobMarketInsights {
    pub jobs: Vec<JobListing>,
    pub hot_roles: Vec<HotRole>,
    pub skills: Vec<InDemandSkill>,
    pub employers: Vec<TopEmployer>,
    pub trends: Vec<MarketTrend>,
}

impl JobMarketInsights {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
            && self.hot_roles.is_empty()
            && self.skills.is_empty()
            && self.employers.is_empty()
            && self.trends.is_empty()
    }
}
