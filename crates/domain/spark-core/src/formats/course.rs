use super::coerce::{self, Object};
use super::sections::{
    bullet, collect_items, find_section, leading_number, split_list, split_parenthetical,
    tagged_blocks, FieldSpec, RawItem, Section,
};
use super::{DomainFormat, RecordKind};
use crate::{
    AcademicResource, Course, CoursePlan, Difficulty, Level, PrerequisiteLink, ResourceKind,
    SemesterPlan, SkillArea,
};
use serde_json::Value;
use spark_config::PLACEHOLDER_TITLE;

pub(crate) const CATALOG: &str = "COURSE";
pub(crate) const SEMESTERS: &str = "SEMESTER PLAN";
pub(crate) const PREREQUISITES: &str = "PREREQUISITES";
pub(crate) const SKILL_AREAS: &str = "SKILL AREAS";
pub(crate) const RESOURCES: &str = "ACADEMIC RESOURCES";
pub(crate) const NOUN: &str = "Course";

const NO_PREREQUISITES: &[&str] = &["none", "n/a", "-"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CourseField {
    Code,
    Name,
    Credits,
    Difficulty,
    Prerequisites,
    Semester,
    Professor,
    Skills,
    Description,
}

pub(crate) const FIELDS: &[FieldSpec<CourseField>] = &[
    FieldSpec {
        key: CourseField::Code,
        label: "Code",
        names: &["code", "course code"],
        multiline: false,
    },
    FieldSpec {
        key: CourseField::Name,
        label: "Name",
        names: &["name", "title", "course name"],
        multiline: false,
    },
    FieldSpec {
        key: CourseField::Credits,
        label: "Credits",
        names: &["credits", "credit hours"],
        multiline: false,
    },
    FieldSpec {
        key: CourseField::Difficulty,
        label: "Difficulty",
        names: &["difficulty", "level"],
        multiline: false,
    },
    FieldSpec {
        key: CourseField::Prerequisites,
        label: "Prerequisites",
        names: &["prerequisites", "prereqs"],
        multiline: false,
    },
    FieldSpec {
        key: CourseField::Semester,
        label: "Semester",
        names: &["semester", "term"],
        multiline: false,
    },
    FieldSpec {
        key: CourseField::Professor,
        label: "Professor",
        names: &["professor", "instructor"],
        multiline: false,
    },
    FieldSpec {
        key: CourseField::Skills,
        label: "Skills",
        names: &["skills"],
        multiline: false,
    },
    FieldSpec {
        key: CourseField::Description,
        label: "Description",
        names: &["description"],
        multiline: true,
    },
];

pub struct CourseFormat;

impl DomainFormat for CourseFormat {
    type Record = CoursePlan;
    const KIND: RecordKind = RecordKind::Course;

    fn from_json(root: &Object) -> Option<CoursePlan> {
        let courses = coerce::array(root, &["courses"])?;
        Some(CoursePlan {
            courses: courses
                .iter()
                .enumerate()
                .filter_map(|(index, item)| course_from_json(index, item))
                .collect(),
            semesters: coerce::items(root, &["semesters", "semester_plan", "semesterPlan"])
                .iter()
                .filter_map(semester_from_json)
                .collect(),
            prerequisites: coerce::items(root, &["prerequisites"])
                .iter()
                .filter_map(prerequisite_from_json)
                .collect(),
            skill_areas: coerce::items(root, &["skill_areas", "skillAreas"])
                .iter()
                .filter_map(skill_area_from_json)
                .collect(),
            resources: coerce::items(root, &["resources", "academic_resources", "academicResources"])
                .iter()
                .filter_map(resource_from_json)
                .collect(),
        })
    }

    fn from_sections(sections: &[Section<'_>]) -> Option<CoursePlan> {
        let catalog = find_section(sections, CATALOG);
        let semesters = find_section(sections, SEMESTERS);
        let prerequisites = find_section(sections, PREREQUISITES);
        let skill_areas = find_section(sections, SKILL_AREAS);
        let resources = find_section(sections, RESOURCES);

        if catalog.is_none()
            && semesters.is_none()
            && prerequisites.is_none()
            && skill_areas.is_none()
            && resources.is_none()
        {
            return None;
        }

        Some(CoursePlan {
            courses: catalog
                .map(|s| {
                    collect_items(&s.lines, NOUN, FIELDS)
                        .iter()
                        .enumerate()
                        .filter_map(|(index, raw)| course_from_text(index, raw))
                        .collect()
                })
                .unwrap_or_default(),
            semesters: lines_of(semesters).filter_map(semester_line).collect(),
            prerequisites: lines_of(prerequisites)
                .filter_map(prerequisite_line)
                .collect(),
            skill_areas: lines_of(skill_areas).filter_map(skill_area_line).collect(),
            resources: resources
                .map(|s| {
                    tagged_blocks(&s.lines)
                        .into_iter()
                        .filter(|b| !b.title.is_empty())
                        .map(|b| AcademicResource {
                            kind: ResourceKind::recognize(&b.tag).unwrap_or_default(),
                            name: b.title,
                            description: b.description,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    fn is_empty(record: &CoursePlan) -> bool {
        record.is_empty()
    }
}

fn lines_of<'s, 'a>(section: Option<&'s Section<'a>>) -> impl Iterator<Item = &'a str> + 's {
    section.into_iter().flat_map(|s| s.lines.iter().copied())
}

fn course_from_json(index: usize, item: &Value) -> Option<Course> {
    let obj = item.as_object()?;
    Some(Course {
        id: coerce::id_or(obj, "course", index),
        code: coerce::text_or(obj, &["code", "course_code", "courseCode"], "TBD"),
        name: coerce::text_or(obj, &["name", "title"], PLACEHOLDER_TITLE),
        credits: coerce::count(obj, &["credits"]),
        difficulty: coerce::text(obj, &["difficulty", "level"])
            .map(|d| Difficulty::coerce(&d))
            .unwrap_or_default(),
        prerequisites: coerce::string_list(obj, &["prerequisites", "prereqs"]),
        semester: coerce::text(obj, &["semester", "term"]),
        professor: coerce::text(obj, &["professor", "instructor"]),
        skills: coerce::string_list(obj, &["skills"]),
        description: coerce::text(obj, &["description"]),
    })
}

fn semester_from_json(item: &Value) -> Option<SemesterPlan> {
    let obj = item.as_object()?;
    Some(SemesterPlan {
        name: coerce::text(obj, &["name", "semester", "term"])?,
        credits: coerce::count(obj, &["credits"]),
        courses: coerce::string_list(obj, &["courses"]),
    })
}

fn prerequisite_from_json(item: &Value) -> Option<PrerequisiteLink> {
    let obj = item.as_object()?;
    Some(PrerequisiteLink {
        course: coerce::text(obj, &["course", "code"])?,
        required_for: coerce::string_list(obj, &["required_for", "requiredFor"]),
    })
}

fn skill_area_from_json(item: &Value) -> Option<SkillArea> {
    let obj = item.as_object()?;
    Some(SkillArea {
        name: coerce::text(obj, &["name", "area"])?,
        importance: coerce::text(obj, &["importance", "level"])
            .map(|i| Level::coerce(&i))
            .unwrap_or_default(),
        courses: coerce::string_list(obj, &["courses"]),
    })
}

fn resource_from_json(item: &Value) -> Option<AcademicResource> {
    let obj = item.as_object()?;
    Some(AcademicResource {
        kind: coerce::text(obj, &["kind", "type"])
            .and_then(|k| ResourceKind::recognize(&k))
            .unwrap_or_default(),
        name: coerce::text(obj, &["name", "title"])?,
        description: coerce::text(obj, &["description"]).unwrap_or_default(),
    })
}

/// Kept only with both a code and a name.
fn course_from_text(index: usize, raw: &RawItem<CourseField>) -> Option<Course> {
    let code = raw.owned(CourseField::Code)?;
    let name = raw
        .owned(CourseField::Name)
        .or_else(|| raw.inline_title.clone())?;

    let prerequisites = match raw.get(CourseField::Prerequisites) {
        Some(v) if NO_PREREQUISITES.contains(&v.to_lowercase().as_str()) => Vec::new(),
        Some(v) => split_list(v),
        None => Vec::new(),
    };

    Some(Course {
        id: format!("course-{index}"),
        code,
        name,
        credits: raw.get(CourseField::Credits).and_then(leading_number),
        difficulty: raw
            .get(CourseField::Difficulty)
            .map(Difficulty::coerce)
            .unwrap_or_default(),
        prerequisites,
        semester: raw.owned(CourseField::Semester),
        professor: raw.owned(CourseField::Professor),
        skills: raw
            .get(CourseField::Skills)
            .map(split_list)
            .unwrap_or_default(),
        description: raw.owned(CourseField::Description),
    })
}

/// `- Fall 2025 (12 credits): CS 1337, CS 2305`
pub(crate) fn semester_line(line: &str) -> Option<SemesterPlan> {
    let body = bullet(line)?;
    let (head, courses) = body.split_once(':')?;
    let (name, inner) = split_parenthetical(head);
    if name.is_empty() {
        return None;
    }
    Some(SemesterPlan {
        name: name.to_string(),
        credits: inner.and_then(leading_number),
        courses: split_list(courses),
    })
}

/// `- CS 1337 (required for: CS 2336, CS 3345)`
pub(crate) fn prerequisite_line(line: &str) -> Option<PrerequisiteLink> {
    let body = bullet(line)?;
    let (course, inner) = split_parenthetical(body);
    let inner = inner?;
    let (label, targets) = inner.split_once(':')?;
    if !label.trim().eq_ignore_ascii_case("required for") || course.is_empty() {
        return None;
    }
    Some(PrerequisiteLink {
        course: course.to_string(),
        required_for: split_list(targets),
    })
}

/// `- Programming (high importance): CS 1337, CS 2336`
pub(crate) fn skill_area_line(line: &str) -> Option<SkillArea> {
    let body = bullet(line)?;
    let (head, courses) = body.split_once(':')?;
    let (name, inner) = split_parenthetical(head);
    let inner = inner?;
    if name.is_empty() || !inner.to_lowercase().contains("importance") {
        return None;
    }
    Some(SkillArea {
        name: name.to_string(),
        importance: Level::coerce(inner),
        courses: split_list(courses),
    })
}
