//! Plain-text rendering of school rows and the detail view.

use std::fmt::Write;

use schools_common::{SatRecord, School, Score};

/// Numbered rows, at most `limit`, followed by a count line.
pub fn listing(schools: &[School], limit: usize) -> String {
    let mut out = String::new();
    for (index, school) in schools.iter().take(limit).enumerate() {
        let _ = writeln!(out, "{}", row(index, school));
    }
    if schools.len() > limit {
        let _ = writeln!(out, "... {} more", schools.len() - limit);
    }
    let _ = writeln!(out, "{} school(s)", schools.len());
    out
}

/// `"  3. Name  [addr, city, state zip]"`
pub fn row(index: usize, school: &School) -> String {
    format!(
        "{:>4}. {}  [{}]",
        index,
        school.name.as_deref().unwrap_or("(unnamed)"),
        school.display_address()
    )
}

pub fn detail(school: &School) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", school.name.as_deref().unwrap_or("(unnamed)"));
    field(&mut out, "Code", school.dbn.as_deref());
    field(&mut out, "Borough", school.borough.as_deref());
    field(&mut out, "Neighborhood", school.neighborhood.as_deref());
    let _ = writeln!(out, "  {:<14}{}", "Address", school.display_address());
    field(&mut out, "Phone", school.phone_number.as_deref());
    field(&mut out, "Email", school.school_email.as_deref());
    field(&mut out, "Website", school.website.as_deref());
    field(&mut out, "Students", school.total_students.as_deref());

    match school.sat_scores() {
        Some(sat) => sat_block(&mut out, sat),
        None => {
            let _ = writeln!(out, "  SAT results not available");
        }
    }

    if let Some(overview) = school.overview_paragraph.as_deref() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}", overview);
    }
    out
}

fn sat_block(out: &mut String, sat: &SatRecord) {
    let _ = writeln!(out, "  SAT results");
    let _ = writeln!(out, "    {:<16}{}", "Test takers", score_text(sat.test_takers()));
    let _ = writeln!(out, "    {:<16}{}", "Reading", score_text(sat.critical_reading()));
    let _ = writeln!(out, "    {:<16}{}", "Math", score_text(sat.math()));
    let _ = writeln!(out, "    {:<16}{}", "Writing", score_text(sat.writing()));
    if let Some(total) = sat.combined_average() {
        let _ = writeln!(out, "    {:<16}{}", "Combined", total);
    }
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = writeln!(out, "  {:<14}{}", label, value);
    }
}

fn score_text(score: Option<Score>) -> String {
    match score {
        Some(Score::Reported(value)) => value.to_string(),
        Some(Score::Suppressed) => "suppressed".to_string(),
        Some(Score::Unparsed(raw)) => raw,
        None => "-".to_string(),
    }
}
