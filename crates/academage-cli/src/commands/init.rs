//! The `academage init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("academage.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("norms")?;
    write_if_missing(Path::new("norms/example-reading.toml"), EXAMPLE_NORMS)?;

    write_if_missing(Path::new("roster.toml"), EXAMPLE_ROSTER)?;

    println!("\nNext steps:");
    println!("  1. Run: academage validate --norms norms");
    println!("  2. Run: academage list-tests");
    println!("  3. Run: academage batch --roster roster.toml");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# academage configuration

# Encoding for `academage age` when --encoding is not given: "months" or "tenths".
default_encoding = "months"

# Extra norm tables, layered over the built-in ones.
norms_dir = "norms"

output_dir = "./academage-results"
"#;

const EXAMPLE_NORMS: &str = r#"[test]
id = "example-reading"
name = "Example Reading Check"
family = "reading"
encoding = "months"
max_raw = 12
description = "A short screener to show the norm file format"

[norms]
2 = "5.06"
3 = "5.08"
4 = "5.10"
5 = "6.0"
6 = "6.03"
7 = "6.06"
8 = "6.09"
9 = "7.0"
10 = "7.04"
"#;

const EXAMPLE_ROSTER: &str = r#"name = "Example class"

[[students]]
id = "s001"
name = "First Student"
date_of_birth = "2018-05-15"
test_date = "2025-05-10"
test = "numeracy-a"
raw_score = 14

[students.components]
"Visual Perception" = 18
Memory = 9

[[students]]
id = "s002"
name = "Second Student"
date_of_birth = "2018-01-20"
test_date = "2025-05-10"
test = "example-reading"
raw_score = 9
"#;
