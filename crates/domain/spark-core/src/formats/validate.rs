//! Advisory checks of agent output against the text convention.
//!
//! Missing sections are errors; everything else is a warning. The parsers
//! accept far more than this reports as clean.

use super::sections::{
    collect_items, find_section, split_sections, tagged, FieldSpec, RawItem, Section,
};
use super::{course, job_market, project, RecordKind};
use crate::{Difficulty, ResourceKind, Sentiment};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormatReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FormatReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_valid() {
            if self.warnings.is_empty() {
                "Format is valid".to_string()
            } else {
                format!("Format is valid (with {} warnings)", self.warnings.len())
            }
        } else {
            format!(
                "Format is invalid: {} errors, {} warnings",
                self.errors.len(),
                self.warnings.len()
            )
        }
    }

    fn require<'s, 'a>(
        &mut self,
        sections: &'s [Section<'a>],
        base: &str,
        display: &str,
    ) -> Option<&'s Section<'a>> {
        let found = find_section(sections, base);
        if found.is_none() {
            self.errors
                .push(format!("Missing required section: === {display} ==="));
        }
        found
    }

    fn check_items<K: Copy + PartialEq>(
        &mut self,
        section: &Section<'_>,
        noun: &str,
        fields: &[FieldSpec<K>],
        required: &[K],
    ) -> Vec<RawItem<K>> {
        let items = collect_items(&section.lines, noun, fields);
        if items.is_empty() {
            self.warnings
                .push(format!("No {} entries found", noun.to_lowercase()));
        }
        for item in &items {
            for key in required {
                if !item.has(*key) {
                    let label = fields
                        .iter()
                        .find(|f| f.key == *key)
                        .map(|f| f.label)
                        .unwrap_or("?");
                    self.warnings.push(format!(
                        "{noun} #{} missing field: {label}",
                        item.number
                    ));
                }
            }
        }
        items
    }

    fn check_difficulty(&mut self, noun: &str, number: u32, value: Option<&str>) {
        if let Some(v) = value {
            if Difficulty::recognize(v).is_none() {
                self.warnings.push(format!(
                    "{noun} #{number} has invalid difficulty level (must be beginner/intermediate/advanced)"
                ));
            }
        }
    }

    fn check_lines<T>(
        &mut self,
        section: Option<&Section<'_>>,
        what: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) {
        if let Some(section) = section {
            if !section.lines.iter().any(|l| parse(*l).is_some()) {
                self.warnings
                    .push(format!("No properly formatted {what} found"));
            }
        }
    }
}

pub fn validate(kind: RecordKind, text: &str) -> FormatReport {
    let sections = split_sections(text);
    let mut report = FormatReport::default();
    match kind {
        RecordKind::JobMarket => validate_job_market(&sections, &mut report),
        RecordKind::Course => validate_course(&sections, &mut report),
        RecordKind::Project => validate_project(&sections, &mut report),
    }
    report
}

fn validate_job_market(sections: &[Section<'_>], report: &mut FormatReport) {
    use job_market::JobField;

    let listings = report.require(sections, job_market::LISTINGS, "JOB LISTINGS");
    let hot_roles = report.require(sections, job_market::HOT_ROLES, "HOT ROLES");
    let skills = report.require(sections, job_market::SKILLS, "IN-DEMAND SKILLS");
    let employers = report.require(sections, job_market::EMPLOYERS, "TOP EMPLOYERS");
    let trends = report.require(sections, job_market::TRENDS, "MARKET TRENDS");

    if let Some(section) = listings {
        report.check_items(
            section,
            job_market::NOUN,
            job_market::FIELDS,
            &[
                JobField::Title,
                JobField::Company,
                JobField::Location,
                JobField::Type,
                JobField::Skills,
            ],
        );
    }
    report.check_lines(hot_roles, "hot roles", job_market::hot_role_line);
    report.check_lines(skills, "skills", job_market::skill_line);
    report.check_lines(employers, "employers", job_market::employer_line);
    report.check_lines(trends, "market trends", |l| {
        tagged(l).and_then(|(tag, _)| Sentiment::recognize(tag))
    });
}

fn validate_course(sections: &[Section<'_>], report: &mut FormatReport) {
    use course::CourseField;

    let catalog = report.require(sections, course::CATALOG, "COURSE CATALOG");
    let semesters = report.require(sections, course::SEMESTERS, "SEMESTER PLAN");
    let prerequisites = report.require(sections, course::PREREQUISITES, "PREREQUISITES");
    let skill_areas = report.require(sections, course::SKILL_AREAS, "SKILL AREAS");
    let resources = report.require(sections, course::RESOURCES, "ACADEMIC RESOURCES");

    if let Some(section) = catalog {
        let items = report.check_items(
            section,
            course::NOUN,
            course::FIELDS,
            &[
                CourseField::Code,
                CourseField::Name,
                CourseField::Credits,
                CourseField::Difficulty,
            ],
        );
        for item in &items {
            report.check_difficulty(
                course::NOUN,
                item.number,
                item.get(CourseField::Difficulty),
            );
        }
    }
    report.check_lines(semesters, "semester plans", course::semester_line);
    report.check_lines(prerequisites, "prerequisites", course::prerequisite_line);
    report.check_lines(skill_areas, "skill areas", course::skill_area_line);
    report.check_lines(resources, "academic resources", |l| {
        tagged(l).and_then(|(tag, _)| ResourceKind::recognize(tag))
    });
}

fn validate_project(sections: &[Section<'_>], report: &mut FormatReport) {
    use project::ProjectField;

    let Some(section) = report.require(sections, project::SECTION, "PROJECT RECOMMENDATIONS")
    else {
        return;
    };
    let items = report.check_items(
        section,
        project::NOUN,
        project::FIELDS,
        &[
            ProjectField::Title,
            ProjectField::Description,
            ProjectField::Skills,
            ProjectField::Difficulty,
        ],
    );
    for item in &items {
        report.check_difficulty(
            project::NOUN,
            item.number,
            item.get(ProjectField::Difficulty),
        );
    }
}
