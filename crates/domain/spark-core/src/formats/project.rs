use super::coerce::{self, Object};
use super::sections::{collect_items, find_section, split_list, FieldSpec, RawItem, Section};
use super::{DomainFormat, RecordKind};
use crate::{Difficulty, Project, ProjectRecommendations};
use serde_json::Value;
use spark_config::{PLACEHOLDER_DESCRIPTION, PLACEHOLDER_TITLE};

pub(crate) const SECTION: &str = "PROJECT";
pub(crate) const NOUN: &str = "Project";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProjectField {
    Title,
    Description,
    Skills,
    Difficulty,
    EstimatedTime,
    Category,
    CareerRelevance,
}

pub(crate) const FIELDS: &[FieldSpec<ProjectField>] = &[
    FieldSpec {
        key: ProjectField::Title,
        label: "Title",
        names: &["title", "name"],
        multiline: false,
    },
    FieldSpec {
        key: ProjectField::Description,
        label: "Description",
        names: &["description", "summary", "problem"],
        multiline: true,
    },
    FieldSpec {
        key: ProjectField::Skills,
        label: "Skills",
        names: &["skills", "tech stack", "technologies"],
        multiline: false,
    },
    FieldSpec {
        key: ProjectField::Difficulty,
        label: "Difficulty",
        names: &["difficulty", "level"],
        multiline: false,
    },
    FieldSpec {
        key: ProjectField::EstimatedTime,
        label: "Estimated Time",
        names: &["estimated time", "duration", "timeline"],
        multiline: false,
    },
    FieldSpec {
        key: ProjectField::Category,
        label: "Category",
        names: &["category"],
        multiline: false,
    },
    FieldSpec {
        key: ProjectField::CareerRelevance,
        label: "Career Relevance",
        names: &["career relevance", "relevance"],
        multiline: true,
    },
];

pub struct ProjectFormat;

impl DomainFormat for ProjectFormat {
    type Record = ProjectRecommendations;
    const KIND: RecordKind = RecordKind::Project;

    fn from_json(root: &Object) -> Option<ProjectRecommendations> {
        let items = coerce::array(root, &["projects"])?;
        Some(ProjectRecommendations {
            projects: items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| project_from_json(index, item))
                .collect(),
        })
    }

    fn from_sections(sections: &[Section<'_>]) -> Option<ProjectRecommendations> {
        let section = find_section(sections, SECTION)?;
        let projects = collect_items(&section.lines, NOUN, FIELDS)
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| project_from_text(index, raw))
            .collect();
        Some(ProjectRecommendations { projects })
    }

    fn is_empty(record: &ProjectRecommendations) -> bool {
        record.projects.is_empty()
    }
}

fn project_from_json(index: usize, item: &Value) -> Option<Project> {
    let obj = item.as_object()?;
    Some(Project {
        id: coerce::id_or(obj, "project", index),
        title: coerce::text_or(obj, &["title", "name"], PLACEHOLDER_TITLE),
        description: coerce::text_or(obj, &["description", "summary"], PLACEHOLDER_DESCRIPTION),
        skills: coerce::string_list(obj, &["skills", "tech_stack", "techStack"]),
        difficulty: coerce::text(obj, &["difficulty", "level"])
            .map(|d| Difficulty::coerce(&d))
            .unwrap_or_default(),
        estimated_time: coerce::text(obj, &["estimated_time", "estimatedTime", "duration"]),
        category: coerce::text(obj, &["category"]),
        career_relevance: coerce::text(obj, &["career_relevance", "careerRelevance"]),
    })
}

/// Kept only with both a title and a description.
fn project_from_text(index: usize, raw: &RawItem<ProjectField>) -> Option<Project> {
    let title = raw
        .owned(ProjectField::Title)
        .or_else(|| raw.inline_title.clone())?;
    let description = raw.owned(ProjectField::Description)?;

    Some(Project {
        id: format!("project-{index}"),
        title,
        description,
        skills: raw
            .get(ProjectField::Skills)
            .map(split_list)
            .unwrap_or_default(),
        difficulty: raw
            .get(ProjectField::Difficulty)
            .map(Difficulty::coerce)
            .unwrap_or_default(),
        estimated_time: raw.owned(ProjectField::EstimatedTime),
        category: raw.owned(ProjectField::Category),
        career_relevance: raw.owned(ProjectField::CareerRelevance),
    })
}
