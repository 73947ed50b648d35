//! Common open-data payloads for tests.
//!
//! Shapes follow the live NYC feeds: flat objects, every value a string,
//! columns omitted when the publisher has nothing for them.

/// URL paths the mock server serves the two datasets under.
pub mod paths {
    pub const SCHOOLS: &str = "/resource/s3k6-pzi2.json";
    pub const SAT_SCORES: &str = "/resource/f9bf-2cp4.json";
}

/// Four schools, in the order the feed returned them (not sorted).
///
/// `31R080` has no SAT row, and the last entry has no `dbn` at all.
pub const SCHOOLS_JSON: &str = r#"[
  {
    "dbn": "02M260",
    "school_name": "Clinton School Writers & Artists, M.S. 260",
    "borough": "MANHATTAN",
    "primary_address_line_1": "10 East 15th Street",
    "city": "Manhattan",
    "state_code": "NY",
    "zip": "10003",
    "phone_number": "212-524-4360",
    "total_students": "376"
  },
  {
    "dbn": "21K728",
    "school_name": "Liberation Diploma Plus High School",
    "borough": "BROOKLYN",
    "primary_address_line_1": "2865 West 19th Street",
    "city": "Brooklyn",
    "state_code": "NY",
    "zip": "11224"
  },
  {
    "dbn": "31R080",
    "school_name": "The Michael J. Petrides School",
    "primary_address_line_1": "715 Ocean Terrace",
    "city": "Staten Island",
    "state_code": "NY",
    "zip": "10301"
  },
  {
    "school_name": "Unlisted Academy",
    "city": "Bronx",
    "state_code": "NY"
  }
]"#;

/// SAT rows for two of the schools in [`SCHOOLS_JSON`], one with suppressed
/// values, plus a row for a school that is not in the directory.
pub const SAT_JSON: &str = r#"[
  {
    "dbn": "21K728",
    "school_name": "LIBERATION DIPLOMA PLUS",
    "num_of_sat_test_takers": "s",
    "sat_critical_reading_avg_score": "s",
    "sat_math_avg_score": "s",
    "sat_writing_avg_score": "s"
  },
  {
    "dbn": "02M260",
    "school_name": "CLINTON SCHOOL WRITERS & ARTISTS",
    "num_of_sat_test_takers": "29",
    "sat_critical_reading_avg_score": "355",
    "sat_math_avg_score": "404",
    "sat_writing_avg_score": "363"
  },
  {
    "dbn": "01M448",
    "school_name": "UNIVERSITY NEIGHBORHOOD HIGH SCHOOL",
    "num_of_sat_test_takers": "91",
    "sat_critical_reading_avg_score": "383",
    "sat_math_avg_score": "423",
    "sat_writing_avg_score": "366"
  }
]"#;

/// Names used by the search examples.
pub const SEARCH_NAMES: [&str; 3] = ["PS 101", "Bronx HS", "ps 22"];
