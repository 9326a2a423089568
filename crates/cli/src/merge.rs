//! `catmerge run` / `catmerge validate`: config-driven catalog merge.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use catalog_merge::{load_source, write_records, MatchOutcome, MergeConfig, MergeError, MergeResult, Source};
use clap::Subcommand;

use crate::exit_codes::EXIT_MERGE_INVALID_CONFIG;
use crate::CliError;

#[derive(Subcommand)]
pub enum MergeCommands {
    /// Match products across both exports and write the merged CSV
    #[command(after_help = "\
Examples:
  catmerge run
  catmerge run merge.toml
  catmerge run --base fresh.csv --update optimized.csv -o merged.csv
  catmerge run merge.toml --dry-run --json
  catmerge run merge.toml --report merge-report.json -vv")]
    Run {
        /// Path to a .toml merge config (built-in defaults when omitted)
        #[arg(env = "CATMERGE_CONFIG")]
        config: Option<PathBuf>,

        /// Base ("fresh") export; keeps image columns. Overrides [base].file
        #[arg(long)]
        base: Option<PathBuf>,

        /// Update ("optimized") export; supplies text fields. Overrides [update].file
        #[arg(long)]
        update: Option<PathBuf>,

        /// Merged CSV path. Overrides [output].file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write the JSON report (summary + match decisions) to a file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print the JSON report to stdout instead of per-product lines
        #[arg(long)]
        json: bool,

        /// Match and merge, but do not write the merged CSV
        #[arg(long)]
        dry_run: bool,

        /// Suppress per-product match lines in the summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a merge config without running
    #[command(after_help = "\
Examples:
  catmerge validate merge.toml")]
    Validate {
        /// Path to the .toml merge config
        config: PathBuf,
    },
}

pub fn cmd_merge(cmd: MergeCommands) -> Result<(), CliError> {
    match cmd {
        MergeCommands::Run { config, base, update, output, report, json, dry_run, quiet } => {
            let overrides = Overrides { base, update, output, report };
            cmd_merge_run(config, overrides, json, dry_run, quiet)
        }
        MergeCommands::Validate { config } => cmd_merge_validate(config),
    }
}

struct Overrides {
    base: Option<PathBuf>,
    update: Option<PathBuf>,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
}

/// Config plus concrete file locations.
struct Plan {
    config: MergeConfig,
    base: PathBuf,
    update: PathBuf,
    output: PathBuf,
    report: Option<PathBuf>,
}

fn config_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_MERGE_INVALID_CONFIG, message: msg.into(), hint: None }
}

fn read_config(path: &Path) -> Result<MergeConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| config_err(format!("cannot read config {}: {e}", path.display())))?;
    Ok(MergeConfig::from_toml(&config_str)?)
}

/// Resolve config-relative paths, then apply command-line overrides.
fn resolve_plan(config_path: Option<PathBuf>, overrides: Overrides) -> Result<Plan, CliError> {
    let (config, base_dir) = match config_path {
        Some(path) => {
            let config = read_config(&path)?;
            let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            (config, dir)
        }
        None => (MergeConfig::default(), PathBuf::from(".")),
    };

    let base = overrides.base.unwrap_or_else(|| base_dir.join(&config.base.file));
    let update = overrides.update.unwrap_or_else(|| base_dir.join(&config.update.file));
    let output = overrides.output.unwrap_or_else(|| base_dir.join(&config.output.file));
    let report = overrides
        .report
        .or_else(|| config.output.report.as_ref().map(|r| base_dir.join(r)));

    Ok(Plan { config, base, update, output, report })
}

fn read_source(path: &Path) -> Result<Source, MergeError> {
    let name = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| MergeError::source_read(&name, e.to_string()))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| MergeError::source_read(&name, format!("invalid UTF-8: {e}")))?;
    load_source(&name, &text)
}

fn write_file(path: &Path, contents: &str) -> Result<(), MergeError> {
    std::fs::write(path, contents)
        .map_err(|e| MergeError::sink_write(&path.display().to_string(), e.to_string()))
}

fn cmd_merge_run(
    config_path: Option<PathBuf>,
    overrides: Overrides,
    json_output: bool,
    dry_run: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let plan = resolve_plan(config_path, overrides)?;

    // Both sources are read in full before any processing.
    let base = read_source(&plan.base)?;
    let update = read_source(&plan.update)?;

    let result = catalog_merge::run(&plan.config, &base, &update)?;

    // Render the whole output before touching the sink.
    let output_name = plan.output.display().to_string();
    let csv = write_records(&output_name, &result.headers, &result.records)?;

    if dry_run {
        log::info!("dry run: skipping {output_name}");
    } else {
        write_file(&plan.output, &csv)?;
    }

    if json_output || plan.report.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = plan.report {
            write_file(path, &json_str)?;
            eprintln!("wrote report {}", path.display());
        }
        if json_output {
            println!("{json_str}");
        }
    }

    eprint!("{}", render_summary(&result, quiet || json_output));
    if dry_run {
        eprintln!("dry run: {} rows not written", result.summary.rows_written);
    } else {
        eprintln!("wrote {} rows to {}", result.summary.rows_written, output_name);
    }

    Ok(())
}

fn cmd_merge_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)
        .map_err(|e| e.with_hint("see `catmerge run --help` for the config layout"))?;

    eprintln!(
        "ok: '{}' (base {}, update {}, output {}, {} protected columns, {} >= {})",
        config.name,
        config.base.file,
        config.update.file,
        config.output.file,
        config.columns.protected.len(),
        config.matching.metric,
        config.matching.threshold,
    );
    Ok(())
}

/// Human summary for stderr.
fn render_summary(result: &MergeResult, quiet: bool) -> String {
    let s = &result.summary;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "base: {} rows, {} products ({})",
        s.base_rows, s.base_entities, result.meta.base_source
    );
    let _ = writeln!(
        out,
        "update: {} rows, {} products ({})",
        s.update_rows, s.update_entities, result.meta.update_source
    );

    if !quiet {
        for decision in &result.matches {
            match &decision.outcome {
                MatchOutcome::Exact { .. } => {}
                MatchOutcome::Fuzzy { update_id, update_title, score } => {
                    let _ = writeln!(
                        out,
                        "  matched: '{}' -> '{}' (score: {:.2})",
                        decision.base_id, update_id, score
                    );
                    let _ = writeln!(out, "     base title:   {}", truncate(&decision.base_title, 60));
                    let _ = writeln!(out, "     update title: {}", truncate(update_title, 60));
                }
                MatchOutcome::Unmatched { reason, best_score, .. } => {
                    let _ = writeln!(
                        out,
                        "  no match: '{}' ({}, best score: {:.2})",
                        decision.base_id, reason, best_score
                    );
                }
            }
        }
    }

    let _ = writeln!(
        out,
        "matched {} products ({} exact, {} by title), {} unmatched",
        s.matched, s.matched_exact, s.matched_fuzzy, s.unmatched
    );
    let _ = writeln!(
        out,
        "merged {} rows ({} fields updated), {} without counterpart, {} base only",
        s.reconcile.rows_merged,
        s.reconcile.fields_overwritten,
        s.reconcile.rows_without_counterpart,
        s.reconcile.rows_base_only
    );
    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> MergeResult {
        let base = load_source(
            "fresh.csv",
            "Handle,Title,Image Src,Image Position,Image Alt Text,Variant Image\n\
             blue-mug,Blue Mug,a.jpg,1,,\n\
             red-cup,Red Cup,b.jpg,1,,\n\
             plate,Plate,c.jpg,1,,\n",
        )
        .unwrap();
        let update = load_source(
            "optimized.csv",
            "Handle,Title\nblue-mug-2024,Blue Mug\nplate,Dinner Plate\n",
        )
        .unwrap();
        catalog_merge::run(&MergeConfig::default(), &base, &update).unwrap()
    }

    #[test]
    fn summary_lists_fuzzy_and_unmatched() {
        let text = render_summary(&sample_result(), false);
        assert!(text.contains("base: 3 rows, 3 products (fresh.csv)"), "{text}");
        assert!(text.contains("matched: 'blue-mug' -> 'blue-mug-2024' (score: 1.00)"), "{text}");
        assert!(text.contains("no match: 'red-cup' (below_threshold"), "{text}");
        assert!(text.contains("matched 2 products (1 exact, 1 by title), 1 unmatched"), "{text}");
        assert!(!text.contains("'plate' ->"), "exact matches are not listed: {text}");
    }

    #[test]
    fn quiet_summary_keeps_counts_only() {
        let text = render_summary(&sample_result(), true);
        assert!(!text.contains("no match:"));
        assert!(text.contains("1 unmatched"));
    }

    #[test]
    fn plan_resolves_relative_to_config_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        let config_path = dir.join("merge.toml");
        std::fs::write(&config_path, "[base]\nfile = \"a.csv\"\n[output]\nreport = \"r.json\"\n").unwrap();

        let overrides = Overrides {
            base: None,
            update: Some(PathBuf::from("elsewhere/b.csv")),
            output: None,
            report: None,
        };
        let plan = resolve_plan(Some(config_path), overrides).unwrap();
        assert_eq!(plan.base, dir.join("a.csv"));
        assert_eq!(plan.update, PathBuf::from("elsewhere/b.csv"));
        assert_eq!(plan.output, dir.join("products_merged.csv"));
        assert_eq!(plan.report, Some(dir.join("r.json")));
    }

    #[test]
    fn plan_without_config_uses_defaults() {
        let overrides = Overrides { base: None, update: None, output: None, report: None };
        let plan = resolve_plan(None, overrides).unwrap();
        assert_eq!(plan.base, Path::new(".").join("products_export_fresh_import.csv"));
        assert_eq!(plan.update, Path::new(".").join("products_export_optimized.csv"));
        assert!(plan.report.is_none());
    }

    #[test]
    fn truncate_long_titles() {
        assert_eq!(truncate("Blue Mug", 60), "Blue Mug");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
