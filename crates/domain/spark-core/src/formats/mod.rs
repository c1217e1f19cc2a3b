//! Dual-format parsing of agent result blobs.
//!
//! Each blob is tried as JSON first. Only an object holding the expected
//! top-level array counts as a match; anything else falls through to the
//! `=== SECTION ===` text scanner. Neither path ever fails: unusable input
//! yields `None`, which callers treat as "no data yet".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub mod coerce;
mod course;
mod job_market;
mod project;
pub mod sections;
mod validate;

pub use course::CourseFormat;
pub use job_market::JobMarketFormat;
pub use project::ProjectFormat;
pub use sections::Section;
pub use validate::{validate, FormatReport};

use crate::{CoursePlan, JobMarketInsights, ProjectRecommendations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    JobMarket,
    Course,
    Project,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::JobMarket => "job market",
            RecordKind::Course => "course plan",
            RecordKind::Project => "project recommendations",
        }
    }
}

/// One record kind's two decoding strategies.
pub trait DomainFormat {
    type Record;
    const KIND: RecordKind;

    /// `None` when the object lacks the expected top-level array.
    fn from_json(root: &coerce::Object) -> Option<Self::Record>;

    /// `None` when the primary section is absent.
    fn from_sections(sections: &[Section<'_>]) -> Option<Self::Record>;

    fn is_empty(record: &Self::Record) -> bool;
}

pub fn parse<F: DomainFormat>(raw: &str) -> Option<F::Record> {
    let text = strip_code_fence(raw.trim_start_matches('\u{feff}').trim());
    if text.is_empty() {
        return None;
    }

    let record = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(root)) => match F::from_json(&root) {
            Some(record) => Some(record),
            None => {
                debug!(kind = ?F::KIND, "JSON lacks expected shape, trying text sections");
                from_text::<F>(text)
            }
        },
        Ok(_) => {
            debug!(kind = ?F::KIND, "JSON is not an object, trying text sections");
            from_text::<F>(text)
        }
        Err(_) => from_text::<F>(text),
    };

    record.filter(|r| !F::is_empty(r))
}

fn from_text<F: DomainFormat>(text: &str) -> Option<F::Record> {
    let sections = sections::split_sections(text);
    if sections.is_empty() {
        debug!(kind = ?F::KIND, "no section headers found");
        return None;
    }
    F::from_sections(&sections)
}

/// Unwraps a fenced block such as a ```` ```json ```` reply.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.trim_end().strip_suffix("```") else {
        return text;
    };
    match body.split_once('\n') {
        Some((_lang, inner)) => inner.trim(),
        None => body.trim(),
    }
}

pub fn parse_projects(raw: &str) -> Option<ProjectRecommendations> {
    parse::<ProjectFormat>(raw)
}

pub fn parse_course_plan(raw: &str) -> Option<CoursePlan> {
    parse::<CourseFormat>(raw)
}

pub fn parse_job_market(raw: &str) -> Option<JobMarketInsights> {
    parse::<JobMarketFormat>(raw)
}
