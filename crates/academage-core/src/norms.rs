//! Raw score to academic age norm tables.
//!
//! Each test owns one literal table keyed by raw score. The built-in tables
//! are embedded TOML files, parsed once into a process-wide registry.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{NormError, Result};
use crate::model::{AcademicAge, Age, AgeEncoding, SubjectFamily, INVALID_SCORE};
use crate::parser;

/// Identity and shape of a named test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Stable identifier (e.g. "numeracy-a").
    pub id: String,
    /// Name as printed on the test booklet.
    pub name: String,
    pub family: SubjectFamily,
    /// Encoding of every age in this test's table.
    pub encoding: AgeEncoding,
    /// Highest score the instrument can produce.
    pub max_raw: u32,
    #[serde(default)]
    pub description: String,
}

/// A test definition together with its literal norm entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormTable {
    definition: TestDefinition,
    entries: BTreeMap<u32, Age>,
    /// Each entry as printed in the published table.
    published: BTreeMap<u32, String>,
}

/// Where a raw score falls relative to the tabulated keys.
enum Placement {
    Exact,
    Below,
    Above,
}

impl NormTable {
    /// Build a table. Every age must already be in the test's encoding.
    pub fn new(definition: TestDefinition, entries: BTreeMap<u32, Age>) -> Result<Self> {
        let rows = entries
            .into_iter()
            .map(|(raw, age)| (raw, (age, age.to_string())))
            .collect();
        Self::from_published(definition, rows)
    }

    /// Build a table from entries paired with their printed text.
    ///
    /// The printed text is kept for output when reading it back yields the
    /// same age (`"6.0"` in a months table); otherwise the canonical
    /// rendering is used (`"6.5"` in a months table becomes `"6.05"`).
    pub fn from_published(
        definition: TestDefinition,
        rows: BTreeMap<u32, (Age, String)>,
    ) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut published = BTreeMap::new();
        for (raw, (age, text)) in rows {
            let text = text.trim();
            let label = match text.parse::<Age>() {
                Ok(read) if read.total_months() == age.total_months() => text.to_string(),
                _ => age.to_string(),
            };
            entries.insert(raw, age);
            published.insert(raw, label);
        }

        if entries.is_empty() {
            return Err(NormError::MalformedTable {
                test: definition.id,
                message: "table has no entries".into(),
            });
        }
        if let Some((raw, age)) = entries
            .iter()
            .find(|(_, age)| age.encoding != definition.encoding)
        {
            return Err(NormError::MalformedTable {
                test: definition.id.clone(),
                message: format!(
                    "entry {raw} is {} but the test emits {}",
                    age.encoding, definition.encoding
                ),
            });
        }
        Ok(Self {
            definition,
            entries,
            published,
        })
    }

    pub fn definition(&self) -> &TestDefinition {
        &self.definition
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn entries(&self) -> &BTreeMap<u32, Age> {
        &self.entries
    }

    /// Lowest and highest tabulated raw scores.
    pub fn key_range(&self) -> (u32, u32) {
        let first = self.entries.keys().next().copied().unwrap_or_default();
        let last = self.entries.keys().next_back().copied().unwrap_or_default();
        (first, last)
    }

    /// The printed text of the entry for `raw`, if tabulated.
    pub fn published_text(&self, raw: u32) -> Option<&str> {
        self.published.get(&raw).map(String::as_str)
    }

    /// The key whose entry answers `raw`, or `None` for an impossible score.
    fn locate(&self, raw: i64) -> Option<(Placement, u32)> {
        let raw = u32::try_from(raw)
            .ok()
            .filter(|raw| *raw <= self.definition.max_raw)?;
        let (min_key, max_key) = self.key_range();
        if raw < min_key {
            Some((Placement::Below, min_key))
        } else if raw > max_key {
            Some((Placement::Above, max_key))
        } else {
            // A gap in a custom table falls back to the entry below it.
            self.entries
                .range(..=raw)
                .next_back()
                .map(|(key, _)| (Placement::Exact, *key))
        }
    }

    /// Convert a raw score to an academic age.
    ///
    /// Scores the instrument cannot produce are `InvalidScore`. Scores below
    /// or above the tabulated keys return the boundary age as a sentinel.
    pub fn lookup(&self, raw: i64) -> AcademicAge {
        let found = self.locate(raw).and_then(|(placement, key)| {
            let age = *self.entries.get(&key)?;
            Some(match placement {
                Placement::Exact => AcademicAge::Exact(age),
                Placement::Below => AcademicAge::Below(age),
                Placement::Above => AcademicAge::Above(age),
            })
        });
        found.unwrap_or(AcademicAge::InvalidScore)
    }

    /// [`lookup`](Self::lookup) rendered with the table's printed text.
    pub fn lookup_text(&self, raw: i64) -> String {
        let found = self.locate(raw).and_then(|(placement, key)| {
            let text = self.published_text(key)?;
            Some(match placement {
                Placement::Exact => text.to_string(),
                Placement::Below => format!("< {text}"),
                Placement::Above => format!("> {text}"),
            })
        });
        found.unwrap_or_else(|| INVALID_SCORE.to_string())
    }
}

const BUILTIN_NORMS: &[(&str, &str)] = &[
    ("numeracy-a.toml", include_str!("../norms/numeracy-a.toml")),
    ("numeracy-b.toml", include_str!("../norms/numeracy-b.toml")),
    (
        "mental-arithmetic.toml",
        include_str!("../norms/mental-arithmetic.toml"),
    ),
    ("bnst-a.toml", include_str!("../norms/bnst-a.toml")),
    ("bnst-b.toml", include_str!("../norms/bnst-b.toml")),
    ("vernon-a.toml", include_str!("../norms/vernon-a.toml")),
    ("vernon-b.toml", include_str!("../norms/vernon-b.toml")),
    ("spar-reading-a.toml", include_str!("../norms/spar-reading-a.toml")),
    ("spar-reading-b.toml", include_str!("../norms/spar-reading-b.toml")),
    ("salford-a.toml", include_str!("../norms/salford-a.toml")),
    ("salford-b.toml", include_str!("../norms/salford-b.toml")),
    (
        "graded-word-reading.toml",
        include_str!("../norms/graded-word-reading.toml"),
    ),
    (
        "spar-spelling-a.toml",
        include_str!("../norms/spar-spelling-a.toml"),
    ),
    (
        "spar-spelling-b.toml",
        include_str!("../norms/spar-spelling-b.toml"),
    ),
    ("graded-spelling.toml", include_str!("../norms/graded-spelling.toml")),
];

static BUILTIN: LazyLock<NormRegistry> = LazyLock::new(|| {
    let tables = BUILTIN_NORMS
        .iter()
        .map(|(file, content)| parser::parse_norm_file_str(content, Path::new(file)))
        .collect::<anyhow::Result<Vec<_>>>()
        .expect("built-in norm tables must parse");
    let registry = NormRegistry::from_tables(tables).expect("built-in test ids must be unique");
    tracing::debug!(tests = registry.len(), "loaded built-in norm tables");
    registry
});

/// All norm tables known to the engine, keyed by test id.
#[derive(Debug, Clone, Default)]
pub struct NormRegistry {
    tables: BTreeMap<String, NormTable>,
}

impl NormRegistry {
    /// The tables shipped with the engine.
    pub fn builtin() -> &'static NormRegistry {
        &BUILTIN
    }

    /// Build a registry, rejecting duplicate ids.
    pub fn from_tables(tables: impl IntoIterator<Item = NormTable>) -> Result<Self> {
        let mut registry = Self::default();
        for table in tables {
            let id = table.id().to_string();
            if registry.tables.insert(id.clone(), table).is_some() {
                return Err(NormError::DuplicateTest(id));
            }
        }
        Ok(registry)
    }

    /// The built-in tables plus every norm file under `dir`.
    ///
    /// A file whose id matches a built-in test replaces it. Two files in
    /// `dir` with the same id are an error.
    pub fn with_directory(dir: &Path) -> anyhow::Result<Self> {
        let local = Self::from_tables(parser::load_norm_directory(dir)?)?;
        let mut registry = Self::builtin().clone();
        for (id, table) in local.tables {
            if registry.tables.insert(id.clone(), table).is_some() {
                tracing::warn!("norm table '{}' overrides the built-in table", id);
            }
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables in id order.
    pub fn tables(&self) -> impl Iterator<Item = &NormTable> {
        self.tables.values()
    }

    /// Find a test by id or by display name, ignoring case.
    pub fn get(&self, test: &str) -> Result<&NormTable> {
        let needle = test.trim();
        self.tables
            .get(needle)
            .or_else(|| {
                self.tables.values().find(|t| {
                    t.definition.id.eq_ignore_ascii_case(needle)
                        || t.definition.name.eq_ignore_ascii_case(needle)
                })
            })
            .ok_or_else(|| NormError::UnknownTest(test.to_string()))
    }

    /// Convert a raw score for the named test.
    pub fn convert(&self, test: &str, raw: i64) -> Result<AcademicAge> {
        let table = self.get(test)?;
        let age = table.lookup(raw);
        tracing::debug!(test = table.id(), raw, %age, "converted raw score");
        Ok(age)
    }

    /// Convert a raw score to the academic age string as printed in the
    /// named test's table.
    pub fn convert_text(&self, test: &str, raw: i64) -> Result<String> {
        Ok(self.get(test)?.lookup_text(raw))
    }
}

/// Convert a raw score to the academic age string for a built-in test.
pub fn convert_to_academic_age(test: &str, raw: i64) -> Result<String> {
    NormRegistry::builtin().convert_text(test, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::validate_norm_table;

    fn registry() -> &'static NormRegistry {
        NormRegistry::builtin()
    }

    #[test]
    fn builtin_covers_all_families() {
        assert!(registry().len() >= 15);
        for family in [
            SubjectFamily::Numeracy,
            SubjectFamily::Reading,
            SubjectFamily::Spelling,
        ] {
            assert!(registry()
                .tables()
                .any(|t| t.definition().family == family));
        }
    }

    #[test]
    fn builtin_tables_pass_validation() {
        for table in registry().tables() {
            let warnings = validate_norm_table(table);
            assert!(warnings.is_empty(), "{}: {:?}", table.id(), warnings);
        }
    }

    #[test]
    fn every_keyed_score_has_an_exact_age() {
        for table in registry().tables() {
            let (lo, hi) = table.key_range();
            for raw in lo..=hi {
                assert!(
                    matches!(table.lookup(raw.into()), AcademicAge::Exact(_)),
                    "{} raw {raw}",
                    table.id()
                );
            }
        }
    }

    #[test]
    fn ages_never_decrease_with_score() {
        for table in registry().tables() {
            let (lo, hi) = table.key_range();
            let mut previous = 0;
            for raw in lo..=hi {
                let age = table.lookup(raw.into()).exact().unwrap();
                assert!(age.total_months() >= previous, "{} raw {raw}", table.id());
                previous = age.total_months();
            }
        }
    }

    #[test]
    fn encodings_follow_family_policy() {
        for table in registry().tables() {
            let def = table.definition();
            let expected = match def.family {
                SubjectFamily::Numeracy
                    if def.id.starts_with("bnst") || def.id.starts_with("vernon") =>
                {
                    AgeEncoding::Months
                }
                SubjectFamily::Numeracy => AgeEncoding::Tenths,
                SubjectFamily::Reading if def.id.starts_with("spar") => AgeEncoding::Tenths,
                SubjectFamily::Reading | SubjectFamily::Spelling => AgeEncoding::Months,
            };
            assert_eq!(def.encoding, expected, "{}", def.id);
        }
    }

    #[test]
    fn numeracy_fourteen_is_six_years() {
        assert_eq!(convert_to_academic_age("numeracy-a", 14).unwrap(), "6.0");
    }

    #[test]
    fn spelling_below_table_is_sentinel() {
        assert_eq!(convert_to_academic_age("spar-spelling-a", 2).unwrap(), "< 6.0");
    }

    #[test]
    fn boundary_extrapolation() {
        for table in registry().tables() {
            let (lo, hi) = table.key_range();
            let first = table.entries()[&lo];
            let last = table.entries()[&hi];
            if lo > 0 {
                assert_eq!(
                    table.lookup(i64::from(lo) - 1).to_string(),
                    format!("< {first}")
                );
                assert_eq!(
                    table.lookup_text(i64::from(lo) - 1),
                    format!("< {}", table.published_text(lo).unwrap())
                );
            }
            assert_eq!(table.lookup(lo.into()), AcademicAge::Exact(first));
            assert_eq!(table.lookup(hi.into()), AcademicAge::Exact(last));
            if hi < table.definition().max_raw {
                assert_eq!(
                    table.lookup(i64::from(hi) + 1).to_string(),
                    format!("> {last}")
                );
            }
        }
    }

    #[test]
    fn impossible_scores_are_invalid() {
        let table = registry().get("numeracy-a").unwrap();
        assert_eq!(table.lookup(-1), AcademicAge::InvalidScore);
        let max = i64::from(table.definition().max_raw);
        assert_eq!(table.lookup(max + 1), AcademicAge::InvalidScore);
        assert_eq!(
            convert_to_academic_age("numeracy-a", 999).unwrap(),
            "Invalid score"
        );
    }

    #[test]
    fn lookup_by_display_name() {
        let by_name = registry().get("basic number screening test a").unwrap();
        assert_eq!(by_name.id(), "bnst-a");
        assert_eq!(registry().get("BNST-A").unwrap().id(), "bnst-a");
    }

    #[test]
    fn unknown_test_is_configuration_error() {
        let err = convert_to_academic_age("astrology", 3).unwrap_err();
        assert_eq!(err, NormError::UnknownTest("astrology".into()));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let table = registry().get("numeracy-a").unwrap().clone();
        let err = NormRegistry::from_tables([table.clone(), table]).unwrap_err();
        assert_eq!(err, NormError::DuplicateTest("numeracy-a".into()));
    }

    #[test]
    fn mixed_encoding_table_is_malformed() {
        let def = registry().get("bnst-a").unwrap().definition().clone();
        let entries = BTreeMap::from([(1, Age::new(6, 3, AgeEncoding::Tenths).unwrap())]);
        assert!(matches!(
            NormTable::new(def, entries),
            Err(NormError::MalformedTable { .. })
        ));
    }

    #[test]
    fn gap_falls_back_to_lower_entry() {
        let def = TestDefinition {
            id: "gappy".into(),
            name: "Gappy".into(),
            family: SubjectFamily::Reading,
            encoding: AgeEncoding::Months,
            max_raw: 10,
            description: String::new(),
        };
        let entries = BTreeMap::from([
            (2, Age::new(6, 0, AgeEncoding::Months).unwrap()),
            (5, Age::new(6, 6, AgeEncoding::Months).unwrap()),
        ]);
        let table = NormTable::new(def, entries).unwrap();
        assert_eq!(table.lookup(4).to_string(), "6.00");
        assert_eq!(table.lookup_text(4), "6.00");
        assert_eq!(table.lookup(6).to_string(), "> 6.06");
    }

    #[test]
    fn printed_text_is_kept_when_unambiguous() {
        let table = registry().get("spar-spelling-a").unwrap();
        assert_eq!(table.published_text(3), Some("6.0"));
        assert_eq!(table.lookup(3).to_string(), "6.00");
        assert_eq!(table.lookup_text(3), "6.0");
        assert_eq!(table.lookup_text(-1), "Invalid score");

        let toml = r#"
[test]
id = "short-months"
name = "Short Months"
family = "reading"
encoding = "months"
max_raw = 5

[norms]
1 = "6.0"
2 = "6.5"
3 = "6.10"
"#;
        let table = parser::parse_norm_file_str(toml, Path::new("short.toml")).unwrap();
        assert_eq!(table.lookup_text(1), "6.0");
        // "6.5" would read back as tenths, so the padded form is used.
        assert_eq!(table.lookup_text(2), "6.05");
        assert_eq!(table.lookup_text(4), "> 6.10");
    }

    #[test]
    fn directory_tables_override_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("numeracy-a.toml"),
            r#"
[test]
id = "numeracy-a"
name = "Numeracy Progress Test A (local)"
family = "numeracy"
encoding = "tenths"
max_raw = 5

[norms]
1 = "5.0"
2 = "5.5"
"#,
        )
        .unwrap();
        let registry = NormRegistry::with_directory(dir.path()).unwrap();
        assert_eq!(registry.len(), NormRegistry::builtin().len());
        assert_eq!(registry.convert("numeracy-a", 2).unwrap().to_string(), "5.5");
        // The shared built-in registry is untouched.
        assert_eq!(convert_to_academic_age("numeracy-a", 14).unwrap(), "6.0");
    }

    const LOCAL_READING: &str = r#"
[test]
id = "local-reading"
name = "Local Reading"
family = "reading"
encoding = "months"
max_raw = 5

[norms]
1 = "6.00"
2 = "6.04"
"#;

    #[test]
    fn directory_tables_add_new_tests() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("local.toml"), LOCAL_READING).unwrap();
        let registry = NormRegistry::with_directory(dir.path()).unwrap();
        assert_eq!(registry.len(), NormRegistry::builtin().len() + 1);
        assert_eq!(registry.convert_text("local-reading", 2).unwrap(), "6.04");
    }

    #[test]
    fn duplicate_ids_within_directory_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), LOCAL_READING).unwrap();
        std::fs::write(
            dir.path().join("b.toml"),
            LOCAL_READING.replace("\"6.04\"", "\"6.06\""),
        )
        .unwrap();
        let err = NormRegistry::with_directory(dir.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<NormError>(),
            Some(&NormError::DuplicateTest("local-reading".into()))
        );
    }
}
