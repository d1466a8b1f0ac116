use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use fancy_regex::Regex as FancyRegex;
use std::path::PathBuf;

use rstcheck_lib::config::Overrides;
use rstcheck_lib::exit_codes::exit;
use rstcheck_lib::file_processor::{FileError, check_files, find_files};
use rstcheck_lib::ignore::split_comma_separated;
use rstcheck_lib::output::{print_report, print_summary};
use rstcheck_lib::rst::ReportLevel;

const STDIN_ALONE: &str = "'-' is only allowed without additional files.";

fn parse_pattern(value: &str) -> Result<FancyRegex, String> {
    FancyRegex::new(value).map_err(|e| e.to_string())
}

/// Check syntax of reStructuredText and code blocks nested within it.
#[derive(Parser, Debug)]
#[command(name = "rstcheck", version, about, long_about = None)]
struct Cli {
    /// Files to check. Use '-' to read from standard input.
    #[arg(required = true, value_name = "FILES")]
    files: Vec<String>,

    /// Config file, or directory to start the config search from
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Recursively search directories for .rst files
    #[arg(short, long)]
    recursive: bool,

    /// Report system messages at or above this level (info, warning, error, severe, none)
    #[arg(long, value_name = "LEVEL")]
    report: Option<ReportLevel>,

    /// Comma-separated list of code block languages to skip
    #[arg(long, visible_alias = "ignore", value_name = "LANGUAGES")]
    ignore_language: Option<String>,

    /// Regular expression matched against messages to drop
    #[arg(long, value_name = "REGEX", value_parser = parse_pattern)]
    ignore_messages: Option<FancyRegex>,

    /// Comma-separated list of directives to accept unchecked
    #[arg(long, value_name = "DIRECTIVES")]
    ignore_directives: Option<String>,

    /// Comma-separated list of substitutions to accept undefined
    #[arg(long, value_name = "SUBSTITUTIONS")]
    ignore_substitutions: Option<String>,

    /// Comma-separated list of roles to accept unchecked
    #[arg(long, value_name = "ROLES")]
    ignore_roles: Option<String>,

    /// Accept the directives and roles Sphinx adds
    #[arg(long)]
    sphinx: bool,

    /// Show debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let list = |value: &Option<String>| value.as_deref().map(split_comma_separated).unwrap_or_default();
        Overrides {
            config: self.config.clone(),
            report: self.report,
            ignore_language: list(&self.ignore_language),
            ignore_messages: self.ignore_messages.clone(),
            ignore_directives: list(&self.ignore_directives),
            ignore_substitutions: list(&self.ignore_substitutions),
            ignore_roles: list(&self.ignore_roles),
            sphinx: self.sphinx,
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<bool> {
    if cli.files.len() > 1 && cli.files.iter().any(|file| file == "-") {
        eprintln!("{STDIN_ALONE}");
        exit::tool_error();
    }
    if let Some(config) = &cli.config
        && !config.exists()
    {
        anyhow::bail!("Config file not found: {}", config.display());
    }

    let overrides = cli.overrides();
    let files = find_files(&cli.files, cli.recursive);
    let reports = check_files(&files, &overrides);

    let (misconfigured, checked): (Vec<_>, Vec<_>) = reports
        .iter()
        .partition(|report| matches!(report.outcome, Err(FileError::Config(_))));

    let mut success = true;
    for report in checked {
        success &= print_report(report);
    }
    if let Some(report) = misconfigured.first()
        && let Err(e) = &report.outcome
    {
        for other in &misconfigured[1..] {
            print_report(other);
        }
        anyhow::bail!("{e}");
    }
    print_summary(success);
    Ok(success)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);
    log::debug!("[rstcheck] {cli:?}");

    match run(&cli) {
        Ok(true) => exit::success(),
        Ok(false) => exit::issues_found(),
        Err(e) => {
            eprintln!("{}: {e:#}", "Error".red().bold());
            exit::tool_error();
        }
    }
}
