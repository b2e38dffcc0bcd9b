//! The `academage convert` command.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::load_config_from;

pub fn execute(test: String, score: i64, display: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let registry = config.registry()?;

    let age = registry.convert(&test, score)?;
    let text = registry.convert_text(&test, score)?;

    if display {
        println!("{text} ({})", age.years_months());
    } else {
        println!("{text}");
    }

    Ok(())
}
