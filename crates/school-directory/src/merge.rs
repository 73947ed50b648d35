//! Join SAT results onto schools by school code.
//!
//! Rules:
//! - codes are compared after trimming; blank codes never join
//! - when the SAT list repeats a code, the last row for it wins
//! - output order is the school input order, matched or not

use std::collections::{HashMap, HashSet};

use schools_common::{SatRecord, School};

/// Counts describing one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub schools: usize,
    pub matched: usize,
    /// Schools with a code that no SAT row carries
    pub unmatched_schools: usize,
    pub schools_without_code: usize,
    pub sat_records_without_code: usize,
    /// Distinct SAT codes no school claimed
    pub unused_sat_records: usize,
    /// SAT rows overridden by a later row with the same code
    pub duplicate_sat_codes: usize,
}

/// Attach SAT results to schools. See [`merge_with_report`].
pub fn merge(schools: Vec<School>, sat_records: &[SatRecord]) -> Vec<School> {
    merge_with_report(schools, sat_records).0
}

/// Attach SAT results to schools and count what happened.
///
/// Each school's SAT slot is set to the matching record, or cleared when
/// there is none, so the result depends only on the two inputs.
pub fn merge_with_report(
    schools: Vec<School>,
    sat_records: &[SatRecord],
) -> (Vec<School>, MergeReport) {
    let mut report = MergeReport {
        schools: schools.len(),
        ..MergeReport::default()
    };

    let mut lookup: HashMap<&str, &SatRecord> = HashMap::with_capacity(sat_records.len());
    for record in sat_records {
        match record.code() {
            Some(code) => {
                if lookup.insert(code, record).is_some() {
                    report.duplicate_sat_codes += 1;
                }
            }
            None => report.sat_records_without_code += 1,
        }
    }

    let mut used: HashSet<&str> = HashSet::with_capacity(lookup.len());
    let mut merged = Vec::with_capacity(schools.len());

    for school in schools {
        let found = school
            .code()
            .and_then(|code| lookup.get_key_value(code))
            .map(|(code, record)| (*code, *record));

        let scores = match found {
            Some((code, record)) => {
                used.insert(code);
                report.matched += 1;
                Some(record.clone())
            }
            None => {
                if school.code().is_some() {
                    report.unmatched_schools += 1;
                } else {
                    report.schools_without_code += 1;
                }
                None
            }
        };

        merged.push(school.with_sat_scores(scores));
    }

    report.unused_sat_records = lookup.len() - used.len();
    (merged, report)
}
