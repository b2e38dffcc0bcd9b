//! TOML norm file parser.
//!
//! Loads norm tables from TOML files and directories, and validates them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Age, AgeEncoding, SubjectFamily};
use crate::norms::{NormTable, TestDefinition};

/// Intermediate TOML structure for parsing norm files.
#[derive(Debug, Deserialize)]
struct TomlNormFile {
    test: TomlTestHeader,
    #[serde(default)]
    norms: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TomlTestHeader {
    id: String,
    name: String,
    family: String,
    encoding: String,
    max_raw: u32,
    #[serde(default)]
    description: String,
}

/// Parse a single norm file into a `NormTable`.
pub fn parse_norm_file(path: &Path) -> Result<NormTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read norm file: {}", path.display()))?;

    parse_norm_file_str(&content, path)
}

/// Parse a TOML string into a `NormTable` (useful for testing).
pub fn parse_norm_file_str(content: &str, source_path: &Path) -> Result<NormTable> {
    let parsed: TomlNormFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let family: SubjectFamily = parsed
        .test
        .family
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;
    let encoding: AgeEncoding = parsed
        .test
        .encoding
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let mut rows = BTreeMap::new();
    for (key, text) in &parsed.norms {
        let raw: u32 = key.trim().parse().with_context(|| {
            format!(
                "{}: raw score key '{key}' is not a non-negative integer",
                parsed.test.id
            )
        })?;
        let age = Age::parse_as(text, encoding).with_context(|| {
            format!(
                "{}: '{text}' at raw score {raw} is not a valid {encoding} age",
                parsed.test.id
            )
        })?;
        if rows.insert(raw, (age, text.clone())).is_some() {
            anyhow::bail!(
                "{}: raw score {raw} appears more than once (key '{key}')",
                parsed.test.id
            );
        }
    }

    let definition = TestDefinition {
        id: parsed.test.id,
        name: parsed.test.name,
        family,
        encoding,
        max_raw: parsed.test.max_raw,
        description: parsed.test.description,
    };

    Ok(NormTable::from_published(definition, rows)?)
}

/// Recursively list the `.toml` files under a directory, in path order.
pub fn find_norm_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(find_norm_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Recursively load all `.toml` norm files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_norm_directory(dir: &Path) -> Result<Vec<NormTable>> {
    let mut tables = Vec::new();
    for path in find_norm_files(dir)? {
        match parse_norm_file(&path) {
            Ok(table) => tables.push(table),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }
    Ok(tables)
}

/// A warning from norm table validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The test ID.
    pub test_id: String,
    /// The raw score the warning concerns (if applicable).
    pub raw: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate a norm table for gaps, regressions and an inconsistent domain.
pub fn validate_norm_table(table: &NormTable) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let id = table.id();
    let warn = |raw: Option<u32>, message: String| ValidationWarning {
        test_id: id.to_string(),
        raw,
        message,
    };

    let keys: Vec<u32> = table.entries().keys().copied().collect();

    // Every raw score between the bounds needs its own entry
    for pair in keys.windows(2) {
        if pair[1] != pair[0] + 1 {
            warnings.push(warn(
                Some(pair[0] + 1),
                format!("no entries for raw scores {}..={}", pair[0] + 1, pair[1] - 1),
            ));
        }
    }

    // Ages must not go down as the score goes up
    let ages: Vec<(&u32, &Age)> = table.entries().iter().collect();
    for pair in ages.windows(2) {
        let ((_, lower), (raw, higher)) = (pair[0], pair[1]);
        if higher.total_months() < lower.total_months() {
            warnings.push(warn(
                Some(*raw),
                format!("age {higher} is lower than the previous entry {lower}"),
            ));
        }
    }

    let (_, max_key) = table.key_range();
    if max_key > table.definition().max_raw {
        warnings.push(warn(
            Some(max_key),
            format!(
                "max_raw {} is below the highest tabulated score {max_key}",
                table.definition().max_raw
            ),
        ));
    }

    if table.definition().name.trim().is_empty() {
        warnings.push(warn(None, "test name is empty".into()));
    }

    warnings
}
