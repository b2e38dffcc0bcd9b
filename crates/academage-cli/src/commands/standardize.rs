//! The `academage standardize` command.

use anyhow::Result;

use academage_core::standardization::{Component, UNDETERMINED};

pub fn execute(component: String, score: i64) -> Result<()> {
    let component: Component = component.parse()?;
    let standardized = component.standardize(score);

    if standardized == UNDETERMINED {
        println!("{standardized} (raw score {score} is outside every {component} band)");
    } else {
        println!("{standardized}");
    }

    Ok(())
}
