use super::coerce::{self, Object};
use super::sections::{
    bullet, collect_items, find_section, leading_number, split_list, split_parenthetical,
    tagged_blocks, FieldSpec, RawItem, Section,
};
use super::{DomainFormat, RecordKind};
use crate::{
    HotRole, InDemandSkill, JobListing, JobMarketInsights, Level, MarketTrend, Sentiment,
    TopEmployer, Trend,
};
use serde_json::Value;
use spark_config::PLACEHOLDER_TITLE;

pub(crate) const LISTINGS: &str = "JOB";
pub(crate) const HOT_ROLES: &str = "HOT ROLES";
pub(crate) const SKILLS: &str = "IN-DEMAND SKILLS";
pub(crate) const EMPLOYERS: &str = "TOP EMPLOYERS";
pub(crate) const TRENDS: &str = "MARKET TRENDS";
pub(crate) const NOUN: &str = "Job";

const UNKNOWN_COMPANY: &str = "Unknown employer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobField {
    Title,
    Company,
    Location,
    Salary,
    Type,
    Skills,
    Posted,
    Description,
}

pub(crate) const FIELDS: &[FieldSpec<JobField>] = &[
    FieldSpec {
        key: JobField::Title,
        label: "Title",
        names: &["title", "role", "position"],
        multiline: false,
    },
    FieldSpec {
        key: JobField::Company,
        label: "Company",
        names: &["company", "employer"],
        multiline: false,
    },
    FieldSpec {
        key: JobField::Location,
        label: "Location",
        names: &["location"],
        multiline: false,
    },
    FieldSpec {
        key: JobField::Salary,
        label: "Salary",
        names: &["salary", "pay"],
        multiline: false,
    },
    FieldSpec {
        key: JobField::Type,
        label: "Type",
        names: &["type", "job type", "employment type"],
        multiline: false,
    },
    FieldSpec {
        key: JobField::Skills,
        label: "Skills",
        names: &["skills", "requirements"],
        multiline: false,
    },
    FieldSpec {
        key: JobField::Posted,
        label: "Posted",
        names: &["posted", "date posted"],
        multiline: false,
    },
    FieldSpec {
        key: JobField::Description,
        label: "Description",
        names: &["description"],
        multiline: true,
    },
];

pub struct JobMarketFormat;

impl DomainFormat for JobMarketFormat {
    type Record = JobMarketInsights;
    const KIND: RecordKind = RecordKind::JobMarket;

    fn from_json(root: &Object) -> Option<JobMarketInsights> {
        let jobs = coerce::array(root, &["jobs", "job_listings", "jobListings", "listings"])?;
        Some(JobMarketInsights {
            jobs: jobs
                .iter()
                .enumerate()
                .filter_map(|(index, item)| job_from_json(index, item))
                .collect(),
            hot_roles: coerce::items(root, &["hot_roles", "hotRoles"])
                .iter()
                .filter_map(hot_role_from_json)
                .collect(),
            skills: coerce::items(root, &["skills", "in_demand_skills", "inDemandSkills"])
                .iter()
                .filter_map(skill_from_json)
                .collect(),
            employers: coerce::items(root, &["employers", "top_employers", "topEmployers"])
                .iter()
                .filter_map(employer_from_json)
                .collect(),
            trends: coerce::items(root, &["trends", "market_trends", "marketTrends"])
                .iter()
                .filter_map(trend_from_json)
                .collect(),
        })
    }

    fn from_sections(sections: &[Section<'_>]) -> Option<JobMarketInsights> {
        let listings = find_section(sections, LISTINGS);
        let hot_roles = find_section(sections, HOT_ROLES);
        let skills = find_section(sections, SKILLS);
        let employers = find_section(sections, EMPLOYERS);
        let trends = find_section(sections, TRENDS);

        if listings.is_none()
            && hot_roles.is_none()
            && skills.is_none()
            && employers.is_none()
            && trends.is_none()
        {
            return None;
        }

        Some(JobMarketInsights {
            jobs: listings
                .map(|s| {
                    collect_items(&s.lines, NOUN, FIELDS)
                        .iter()
                        .enumerate()
                        .filter_map(|(index, raw)| job_from_text(index, raw))
                        .collect()
                })
                .unwrap_or_default(),
            hot_roles: lines_of(hot_roles).filter_map(hot_role_line).collect(),
            skills: lines_of(skills).filter_map(skill_line).collect(),
            employers: lines_of(employers).filter_map(employer_line).collect(),
            trends: trends
                .map(|s| {
                    tagged_blocks(&s.lines)
                        .into_iter()
                        .filter(|b| !b.title.is_empty())
                        .filter_map(|b| {
                            Some(MarketTrend {
                                sentiment: Sentiment::recognize(&b.tag)?,
                                title: b.title,
                                description: b.description,
                            })
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    fn is_empty(record: &JobMarketInsights) -> bool {
        record.is_empty()
    }
}

fn lines_of<'s, 'a>(section: Option<&'s Section<'a>>) -> impl Iterator<Item = &'a str> + 's {
    section.into_iter().flat_map(|s| s.lines.iter().copied())
}

fn job_from_json(index: usize, item: &Value) -> Option<JobListing> {
    let obj = item.as_object()?;
    Some(JobListing {
        id: coerce::id_or(obj, "job", index),
        title: coerce::text_or(obj, &["title", "role"], PLACEHOLDER_TITLE),
        company: coerce::text_or(obj, &["company", "employer"], UNKNOWN_COMPANY),
        location: coerce::text(obj, &["location"]),
        salary: coerce::text(obj, &["salary"]),
        job_type: coerce::text(obj, &["type", "job_type", "jobType"]),
        skills: coerce::string_list(obj, &["skills"]),
        posted: coerce::text(obj, &["posted", "posted_date", "postedDate"]),
        description: coerce::text(obj, &["description"]),
    })
}

fn hot_role_from_json(item: &Value) -> Option<HotRole> {
    let obj = item.as_object()?;
    Some(HotRole {
        title: coerce::text(obj, &["title", "role", "name"])?,
        openings: coerce::count(obj, &["openings", "count"]).unwrap_or(0),
        trend: coerce::text(obj, &["trend"])
            .map(|t| Trend::coerce(&t))
            .unwrap_or_default(),
    })
}

fn skill_from_json(item: &Value) -> Option<InDemandSkill> {
    let obj = item.as_object()?;
    Some(InDemandSkill {
        name: coerce::text(obj, &["name", "skill"])?,
        demand: coerce::text(obj, &["demand", "level"])
            .map(|d| Level::coerce(&d))
            .unwrap_or_default(),
        listings: coerce::count(obj, &["listings", "count"]).unwrap_or(0),
    })
}

fn employer_from_json(item: &Value) -> Option<TopEmployer> {
    let obj = item.as_object()?;
    Some(TopEmployer {
        name: coerce::text(obj, &["name", "company", "employer"])?,
        openings: coerce::count(obj, &["openings", "count"]).unwrap_or(0),
        location: coerce::text(obj, &["location"]),
    })
}

fn trend_from_json(item: &Value) -> Option<MarketTrend> {
    let obj = item.as_object()?;
    Some(MarketTrend {
        sentiment: coerce::text(obj, &["sentiment", "type", "impact"])
            .and_then(|s| Sentiment::recognize(&s))
            .unwrap_or_default(),
        title: coerce::text(obj, &["title", "name"])?,
        description: coerce::text(obj, &["description"]).unwrap_or_default(),
    })
}

/// Kept only with both a title and a company.
fn job_from_text(index: usize, raw: &RawItem<JobField>) -> Option<JobListing> {
    let title = raw
        .owned(JobField::Title)
        .or_else(|| raw.inline_title.clone())?;
    let company = raw.owned(JobField::Company)?;

    Some(JobListing {
        id: format!("job-{index}"),
        title,
        company,
        location: raw.owned(JobField::Location),
        salary: raw.owned(JobField::Salary),
        job_type: raw.owned(JobField::Type),
        skills: raw
            .get(JobField::Skills)
            .map(split_list)
            .unwrap_or_default(),
        posted: raw.owned(JobField::Posted),
        description: raw.owned(JobField::Description),
    })
}

/// `- Software Engineer (150 openings) [trending up]`; the trend tag is
/// optional, the openings count is not.
pub(crate) fn hot_role_line(line: &str) -> Option<HotRole> {
    let body = bullet(line)?;
    let (rest, trend) = match body.strip_suffix(']').and_then(|b| b.rsplit_once('[')) {
        Some((rest, tag)) => (rest.trim(), Trend::coerce(tag)),
        None => (body, Trend::Stable),
    };
    let (title, inner) = split_parenthetical(rest);
    let inner = inner?;
    if title.is_empty() || !inner.to_lowercase().contains("opening") {
        return None;
    }
    Some(HotRole {
        title: title.to_string(),
        openings: leading_number(inner)?,
        trend,
    })
}

/// `- React (high demand, 200 listings)`
pub(crate) fn skill_line(line: &str) -> Option<InDemandSkill> {
    let body = bullet(line)?;
    let (name, inner) = split_parenthetical(body);
    let inner = inner?;
    if name.is_empty() || !inner.to_lowercase().contains("demand") {
        return None;
    }
    Some(InDemandSkill {
        name: name.to_string(),
        demand: Level::coerce(inner),
        listings: leading_number(inner).unwrap_or(0),
    })
}

/// `- Tech Corp (25 openings, Dallas TX)` or `- Innovation Labs (18 openings)`
pub(crate) fn employer_line(line: &str) -> Option<TopEmployer> {
    let body = bullet(line)?;
    let (name, inner) = split_parenthetical(body);
    let inner = inner?;
    // The count may carry thousands separators, so the location starts at the
    // first comma after the "openings" word.
    let word = inner.to_ascii_lowercase().find("opening")?;
    let (count, location) = match inner[word..].find(',') {
        Some(at) => (&inner[..word + at], Some(inner[word + at + 1..].trim())),
        None => (inner, None),
    };
    if name.is_empty() {
        return None;
    }
    Some(TopEmployer {
        name: name.to_string(),
        openings: leading_number(count)?,
        location: location.filter(|l| !l.is_empty()).map(str::to_string),
    })
}
