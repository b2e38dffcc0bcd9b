//! The `academage assess` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use academage_core::assessment::{assess, AssessmentRequest};

use crate::config::load_config_from;

/// Parse a `NAME=SCORE` component argument.
pub fn parse_component(s: &str) -> Result<(String, i64), String> {
    let (name, score) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=SCORE, got '{s}'"))?;
    let score = score
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not an integer score", score.trim()))?;
    Ok((name.trim().to_string(), score))
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    test: String,
    score: i64,
    dob: NaiveDate,
    test_date: NaiveDate,
    components: Vec<(String, i64)>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let registry = config.registry()?;

    let request = AssessmentRequest {
        test,
        raw_score: score,
        date_of_birth: dob,
        test_date,
        components: components.into_iter().collect(),
    };
    let outcome = assess(&registry, &request)?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        _ => {
            println!("Test:              {} ({})", outcome.test_name, outcome.test_id);
            println!("Raw score:         {}", outcome.raw_score);
            println!(
                "Academic age:      {} ({})",
                outcome.academic_age_text, outcome.academic_age_display
            );
            println!(
                "Chronological age: {} ({})",
                outcome.chronological_age_text, outcome.chronological_age_display
            );
            println!("Difference:        {}", outcome.difference);
            println!("Status:            {}", outcome.status);
            if !outcome.components.is_empty() {
                println!("\nComponents:");
                for c in &outcome.components {
                    println!("  {:<22} raw {:>3} -> {}", c.component.name(), c.raw, c.standardized);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_component_arg() {
        assert_eq!(
            parse_component("Memory=12").unwrap(),
            ("Memory".to_string(), 12)
        );
        assert_eq!(
            parse_component("Visual Perception = 30").unwrap(),
            ("Visual Perception".to_string(), 30)
        );
        assert!(parse_component("Memory").is_err());
        assert!(parse_component("Memory=lots").is_err());
    }
}
