//! The `academage validate` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use academage_core::parser::{find_norm_files, parse_norm_file, validate_norm_table};

pub fn execute(norms_path: PathBuf) -> Result<()> {
    let files = if norms_path.is_dir() {
        find_norm_files(&norms_path)?
    } else {
        vec![norms_path]
    };

    let mut total_warnings = 0;
    let mut total_errors = 0;
    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();

    for path in &files {
        let table = match parse_norm_file(path) {
            Ok(table) => table,
            Err(e) => {
                println!("  [{}] ERROR: {e:#}", path.display());
                total_errors += 1;
                continue;
            }
        };

        let def = table.definition();
        println!(
            "Norm table: {} ({} entries, {})",
            def.name,
            table.entries().len(),
            def.encoding
        );

        if let Some(first) = seen.insert(def.id.clone(), path.clone()) {
            println!(
                "  [{}] ERROR: test id '{}' is also defined in {}",
                path.display(),
                def.id,
                first.display()
            );
            total_errors += 1;
        }

        let warnings = validate_norm_table(&table);
        for w in &warnings {
            let prefix = w
                .raw
                .map(|raw| format!("  [{} @ {raw}]", w.test_id))
                .unwrap_or_else(|| format!("  [{}]", w.test_id));
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if files.is_empty() {
        println!("No norm tables found.");
    } else if total_warnings == 0 && total_errors == 0 {
        println!("All norm tables valid.");
    } else if total_warnings > 0 {
        println!("\n{total_warnings} warning(s) found.");
    }

    if total_errors > 0 {
        anyhow::bail!("{total_errors} norm file(s) failed validation");
    }

    Ok(())
}
