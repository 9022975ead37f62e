/// Scenario Linter — checks scenario CSV files for rows the player would
/// silently work around.
///
/// Usage: scenario_linter <scenario.csv|dir> [--config <game.ron>]

use scenario_player::core::config::GameConfig;
use scenario_player::schema::scenario::{col, read_table, ScenarioDocument, COLUMNS};
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: scenario_linter <scenario.csv|dir> [--config <game.ron>]");
        process::exit(0);
    }

    let target = Path::new(&args[1]);
    let mut config_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            i += 1;
            config_path = Some(args[i].clone());
        }
        i += 1;
    }

    let mut files = Vec::new();
    if target.is_file() {
        files.push(target.to_path_buf());
    } else if target.is_dir() {
        collect_csv_files(target, &mut files);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", target.display());
        process::exit(1);
    }
    files.sort();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for path in &files {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                errors.push(format!("{}: cannot read: {}", path.display(), e));
                continue;
            }
        };
        let doc = ScenarioDocument::parse(&contents);
        println!("  Loaded: {} ({} rows)", path.display(), doc.len());
        let (e, w) = lint_scenario(&path.display().to_string(), &contents, &doc);
        errors.extend(e);
        warnings.extend(w);
    }

    if let Some(ref path) = config_path {
        match GameConfig::load_from_ron(Path::new(path)) {
            Ok(config) => {
                let (e, w) = lint_config(path, &config);
                errors.extend(e);
                warnings.extend(w);
            }
            Err(e) => errors.push(format!("{}: failed to load config: {}", path, e)),
        }
    }

    println!("\n=== Scenario Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} files, {} errors, {} warnings",
        files.len(),
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn collect_csv_files(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_csv_files(&path, files);
            } else if path.extension().and_then(|s| s.to_str()) == Some("csv") {
                files.push(path);
            }
        }
    }
}

/// Row numbers in messages are the document's 0-based row indices, which
/// is what the player's own log lines use.
fn lint_scenario(name: &str, contents: &str, doc: &ScenarioDocument) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let table = read_table(contents);

    for (i, cells) in table.iter().enumerate() {
        if cells.iter().all(|c| c.trim().is_empty()) {
            warnings.push(format!(
                "{}: row {} is empty (trailing newline?) and plays as a blank line",
                name, i
            ));
            continue;
        }
        if cells.len() > COLUMNS {
            warnings.push(format!(
                "{}: row {} has {} cells; everything past column {} is ignored",
                name,
                i,
                cells.len(),
                COLUMNS
            ));
        }

        let cell = |col: usize| cells.get(col).map(|c| c.trim()).unwrap_or("");

        let delay = cell(col::DELAY);
        if !delay.is_empty() {
            match delay.parse::<f32>() {
                Ok(v) if !v.is_finite() => {
                    errors.push(format!("{}: row {} delay '{}' is not finite", name, i, delay))
                }
                Ok(v) if v < 0.0 => warnings.push(format!(
                    "{}: row {} delay {} is negative and will be clamped to 0",
                    name, i, v
                )),
                Ok(_) => {}
                Err(_) => errors.push(format!(
                    "{}: row {} delay '{}' is not a number",
                    name, i, delay
                )),
            }
        }

        for (col, label) in [(col::SHOW_CHOICES, "choice"), (col::DISABLE_CLICK, "click lock")] {
            let value = cell(col);
            if !matches!(value, "" | "0" | "1") {
                warnings.push(format!(
                    "{}: row {} {} flag '{}' is treated as unset (only '1' sets it)",
                    name, i, label, value
                ));
            }
        }
    }

    for (i, row) in doc.rows().iter().enumerate() {
        if !row.show_choices {
            continue;
        }
        if !row.disable_click {
            warnings.push(format!(
                "{}: row {} shows choices but is not click-locked; a click skips the choice",
                name, i
            ));
        }
        match doc.next_click_lock(i + 1) {
            Some(marker) if marker + 1 < doc.len() => {}
            Some(marker) => warnings.push(format!(
                "{}: choice at row {} resumes after row {}, the last row; picking it ends the scenario",
                name, i, marker
            )),
            None => errors.push(format!(
                "{}: choice at row {} has no click-locked row after it to resume from",
                name, i
            )),
        }
    }

    (errors, warnings)
}

fn lint_config(name: &str, config: &GameConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let ending = &config.ending;
    for (label, index) in [
        ("alternative_for_zero", ending.alternative_for_zero),
        ("alternative_for_one", ending.alternative_for_one),
        ("alternative_for_two", ending.alternative_for_two),
    ] {
        if ending.alternatives.get(index).map_or(true, |set| set.is_empty()) {
            warnings.push(format!(
                "{}: ending {} points at alternative {} which is missing or empty",
                name, label, index
            ));
        }
    }
    if ending.slides.is_empty() {
        warnings.push(format!("{}: ending has no default slides", name));
    }
    if config.illustrations.slides.is_empty() {
        warnings.push(format!("{}: no illustration slides configured", name));
    }

    let reaction = &config.reaction;
    if reaction.enemy_rigs.is_empty() {
        errors.push(format!("{}: reaction game has no enemy rigs", name));
    }
    if reaction.effect_delay_max < reaction.effect_delay_min {
        warnings.push(format!(
            "{}: reaction effect_delay_max {} is below effect_delay_min {}",
            name, reaction.effect_delay_max, reaction.effect_delay_min
        ));
    }
    if reaction.success_threshold > reaction.click_timeout {
        warnings.push(format!(
            "{}: reaction success_threshold {} exceeds click_timeout {}; slow clicks always win",
            name, reaction.success_threshold, reaction.click_timeout
        ));
    }

    if config.scenario.is_none() {
        warnings.push(format!("{}: no scenario file named", name));
    }

    (errors, warnings)
}
