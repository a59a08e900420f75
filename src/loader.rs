use crate::error::LoadError;
use crate::types::{Person, SourceRecord};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_records: usize,
    pub employees: usize,
    pub externals: usize,
    pub unknown_variant: usize,
    pub inactive: usize,
}

pub fn load_records(path: &Path) -> Result<(Vec<SourceRecord>, LoadReport), LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&raw).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let report = inspect(&records);
    info!(
        path = %path.display(),
        total = report.total_records,
        employees = report.employees,
        externals = report.externals,
        "loaded source records"
    );
    Ok((records, report))
}

pub fn parse_records(raw: &str) -> Result<Vec<SourceRecord>, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn inspect(records: &[SourceRecord]) -> LoadReport {
    let mut report = LoadReport {
        total_records: records.len(),
        ..LoadReport::default()
    };
    for (idx, record) in records.iter().enumerate() {
        let Some(person) = record.person() else {
            debug!(index = idx, "record has neither employees nor externals");
            report.unknown_variant += 1;
            continue;
        };
        match person {
            Person::Employee(_) => report.employees += 1,
            Person::External(_) => report.externals += 1,
        }
        if !person.is_active() {
            report.inactive += 1;
        }
    }
    report
}
