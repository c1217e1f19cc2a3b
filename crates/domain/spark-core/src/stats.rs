//! Summary metrics shown above each result panel.
//!
//! Stats are recomputed from the record every time and a zero count is
//! omitted rather than shown as "0".

use crate::{
    CoursePlan, Difficulty, JobMarketInsights, ProjectRecommendations, Sentiment, Trend,
};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatIcon {
    Folder,
    Code,
    Rocket,
    Tag,
    Book,
    Award,
    Calendar,
    Layers,
    Briefcase,
    TrendingUp,
    Zap,
    Building,
    BarChart,
}

impl StatIcon {
    pub fn key(&self) -> &'static str {
        match self {
            StatIcon::Folder => "folder",
            StatIcon::Code => "code",
            StatIcon::Rocket => "rocket",
            StatIcon::Tag => "tag",
            StatIcon::Book => "book",
            StatIcon::Award => "award",
            StatIcon::Calendar => "calendar",
            StatIcon::Layers => "layers",
            StatIcon::Briefcase => "briefcase",
            StatIcon::TrendingUp => "trending_up",
            StatIcon::Zap => "zap",
            StatIcon::Building => "building",
            StatIcon::BarChart => "bar_chart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatTrend {
    Up,
    Down,
    Neutral,
}

impl StatTrend {
    fn from_balance(up: usize, down: usize) -> Self {
        match up.cmp(&down) {
            std::cmp::Ordering::Greater => StatTrend::Up,
            std::cmp::Ordering::Less => StatTrend::Down,
            std::cmp::Ordering::Equal => StatTrend::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatItem {
    pub label: String,
    pub value: String,
    pub icon: StatIcon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<StatTrend>,
}

pub trait Summarize {
    fn stats(&self) -> Vec<StatItem>;
}

pub fn extract<R: Summarize + ?Sized>(record: &R) -> Vec<StatItem> {
    record.stats()
}

fn push_count(
    out: &mut Vec<StatItem>,
    label: &str,
    n: usize,
    icon: StatIcon,
    trend: Option<StatTrend>,
) {
    if n == 0 {
        return;
    }
    out.push(StatItem {
        label: label.to_string(),
        value: n.to_string(),
        icon,
        trend,
    });
}

/// Case-insensitive distinct count.
fn distinct<'a>(values: impl IntoIterator<Item = &'a String>) -> usize {
    values
        .into_iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

impl Summarize for ProjectRecommendations {
    fn stats(&self) -> Vec<StatItem> {
        let mut out = Vec::new();
        push_count(&mut out, "Projects", self.projects.len(), StatIcon::Folder, None);
        push_count(
            &mut out,
            "Unique Skills",
            distinct(self.projects.iter().flat_map(|p| &p.skills)),
            StatIcon::Code,
            None,
        );
        push_count(
            &mut out,
            "Advanced Projects",
            self.projects
                .iter()
                .filter(|p| p.difficulty == Difficulty::Advanced)
                .count(),
            StatIcon::Rocket,
            None,
        );
        push_count(
            &mut out,
            "Categories",
            distinct(self.projects.iter().filter_map(|p| p.category.as_ref())),
            StatIcon::Tag,
            None,
        );
        out
    }
}

impl Summarize for CoursePlan {
    fn stats(&self) -> Vec<StatItem> {
        let mut out = Vec::new();
        push_count(&mut out, "Courses", self.courses.len(), StatIcon::Book, None);

        let credits: u64 = self.courses.iter().filter_map(|c| c.credits).map(u64::from).sum();
        if credits > 0 {
            out.push(StatItem {
                label: "Total Credits".to_string(),
                value: credits.to_string(),
                icon: StatIcon::Award,
                trend: None,
            });
        }

        push_count(
            &mut out,
            "Semesters",
            self.semesters.len(),
            StatIcon::Calendar,
            None,
        );
        push_count(
            &mut out,
            "Skill Areas",
            self.skill_areas.len(),
            StatIcon::Layers,
            None,
        );
        push_count(
            &mut out,
            "Resources",
            self.resources.len(),
            StatIcon::Building,
            None,
        );
        out
    }
}

impl Summarize for JobMarketInsights {
    fn stats(&self) -> Vec<StatItem> {
        let mut out = Vec::new();
        push_count(
            &mut out,
            "Job Listings",
            self.jobs.len(),
            StatIcon::Briefcase,
            None,
        );

        let rising = self.hot_roles.iter().filter(|r| r.trend == Trend::Up).count();
        let falling = self.hot_roles.iter().filter(|r| r.trend == Trend::Down).count();
        push_count(
            &mut out,
            "Hot Roles",
            self.hot_roles.len(),
            StatIcon::TrendingUp,
            Some(StatTrend::from_balance(rising, falling)),
        );

        push_count(
            &mut out,
            "In-Demand Skills",
            distinct(self.skills.iter().map(|s| &s.name)),
            StatIcon::Zap,
            None,
        );
        push_count(
            &mut out,
            "Top Employers",
            self.employers.len(),
            StatIcon::Building,
            None,
        );

        let positive = self
            .trends
            .iter()
            .filter(|t| t.sentiment == Sentiment::Positive)
            .count();
        let negative = self
            .trends
            .iter()
            .filter(|t| t.sentiment == Sentiment::Negative)
            .count();
        push_count(
            &mut out,
            "Market Trends",
            self.trends.len(),
            StatIcon::BarChart,
            Some(StatTrend::from_balance(positive, negative)),
        );
        out
    }
}
