// catalog-merge CLI - merge a fresh catalog export with an optimized one

mod exit_codes;
mod logging;
mod merge;

use std::process::ExitCode;

use clap::Parser;

use exit_codes::{merge_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use merge::MergeCommands;

#[derive(Parser)]
#[command(name = "catmerge")]
#[command(about = "Merge product catalog exports: keep fresh image data, adopt optimized text fields")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<MergeCommands>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        None => Err(CliError {
            code: EXIT_USAGE,
            message: "no command given".into(),
            hint: Some("catmerge run [CONFIG] or catmerge --help".into()),
        }),
        Some(cmd) => merge::cmd_merge(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<catalog_merge::MergeError> for CliError {
    fn from(err: catalog_merge::MergeError) -> Self {
        let hint = match &err {
            catalog_merge::MergeError::MissingColumn { .. } => {
                Some("check the header row, or set [columns] in the config".to_string())
            }
            _ => None,
        };
        Self { code: merge_exit_code(&err), message: err.to_string(), hint }
    }
}
