pub mod commands;
pub mod profiles;

use clap::ValueEnum;
use spark_core::formats::RecordKind;

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CliRecordKind {
    #[value(alias = "jobs")]
    JobMarket,
    #[value(alias = "courses")]
    Course,
    #[value(alias = "projects")]
    Project,
}

impl From<CliRecordKind> for RecordKind {
    fn from(k: CliRecordKind) -> Self {
        match k {
            CliRecordKind::JobMarket => RecordKind::JobMarket,
            CliRecordKind::Course => RecordKind::Course,
            CliRecordKind::Project => RecordKind::Project,
        }
    }
}
