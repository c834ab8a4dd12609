use serde::{Deserialize, Serialize};

/// One county's attainment figures from the upstream education dataset.
///
/// Field names follow the upstream JSON; only `bachelorsOrHigher` needs a
/// rename. `fips` is numeric in the payload (1001, not "01001").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub fips: u32,
    pub state: String,
    pub area_name: String,
    #[serde(rename = "bachelorsOrHigher")]
    pub bachelors_or_higher: f64,
}

/// Linear lookup of the record for a county id. Each call site scans on its
/// own; there is no index. First match wins if the dataset ever carried
/// duplicate ids.
pub fn find_record(records: &[EducationRecord], fips: u32) -> Option<&EducationRecord> {
    records.iter().find(|r| r.fips == fips)
}
