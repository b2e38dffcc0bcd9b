//! The `academage batch` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use academage_core::report::{BatchReport, Roster};

use crate::config::load_config_from;

pub fn execute(
    roster_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let registry = config.registry()?;
    let output = output.unwrap_or(config.output_dir);

    let roster = Roster::load(&roster_path)?;
    eprintln!(
        "Assessing {} student(s) from {}",
        roster.students.len(),
        roster_path.display()
    );

    let report = BatchReport::run(&registry, &roster);

    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
    let json_path = output.join(format!("report-{timestamp}.json"));
    report.save_json(&json_path)?;
    eprintln!("Results saved to: {}", json_path.display());

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => print_summary(&report),
    }

    Ok(())
}

fn print_summary(report: &BatchReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "Student",
        "Test",
        "Raw",
        "Academic age",
        "Chronological age",
        "Difference",
        "Status",
    ]);

    for entry in &report.entries {
        match (&entry.outcome, &entry.error) {
            (Some(o), _) => table.add_row(vec![
                Cell::new(&entry.student_id),
                Cell::new(&o.test_id),
                Cell::new(o.raw_score),
                Cell::new(&o.academic_age_text),
                Cell::new(&o.chronological_age_text),
                Cell::new(&o.difference),
                Cell::new(o.status),
            ]),
            (None, error) => table.add_row(vec![
                Cell::new(&entry.student_id),
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
                Cell::new(""),
                Cell::new(format!("error: {}", error.as_deref().unwrap_or("unknown"))),
            ]),
        };
    }

    let s = &report.summary;
    println!("{table}");
    println!(
        "Assessed {}/{} students: {} deficit, {} no deficit, {} undetermined",
        s.overall.assessed, s.total, s.overall.deficit, s.overall.no_deficit, s.overall.undetermined
    );
    if s.failed > 0 {
        println!("{} student(s) could not be assessed", s.failed);
    }
}
