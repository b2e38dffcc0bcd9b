//! The `academage compare` command.

use anyhow::Result;

use academage_core::comparator::Comparison;
use academage_core::encoding::to_years_months;

pub fn execute(academic: String, chronological: String, format: String) -> Result<()> {
    let comparison = Comparison::from_strings(&academic, &chronological);
    let difference = comparison.difference_string();

    match format.as_str() {
        "json" => {
            let json = serde_json::json!({
                "academic_age": academic,
                "chronological_age": chronological,
                "difference": difference,
                "deficit": comparison.status.as_flag(),
                "status": comparison.status,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            println!(
                "Academic age:      {academic} ({})",
                to_years_months(&academic)
            );
            println!(
                "Chronological age: {chronological} ({})",
                to_years_months(&chronological)
            );
            println!("Difference:        {difference}");
            println!("Status:            {}", comparison.status);
        }
    }

    Ok(())
}
