//! The `academage age` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;

use academage_core::chronological::chronological_age;
use academage_core::model::AgeEncoding;

use crate::config::load_config_from;

pub fn execute(
    dob: NaiveDate,
    test_date: NaiveDate,
    encoding: Option<AgeEncoding>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let encoding = match encoding {
        Some(encoding) => encoding,
        None => load_config_from(config_path.as_deref())?.default_encoding,
    };

    let age = chronological_age(dob, test_date, encoding)?;
    println!("{age} ({})", age.years_months());

    Ok(())
}
