use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tvrenamer_core::{
    app_paths, find_files, load_config, load_config_from, parse_filename, run_batch,
    save_config_to, AppConfig, BatchError, Console, TerminalConsole, TvMazeLookup,
};

#[derive(Debug, Parser)]
#[command(name = "tvrenamer", version)]
#[command(about = "Renames TV episode files using episode names looked up online")]
struct Cli {
    /// Files or directories to process
    paths: Vec<PathBuf>,

    /// Load config from this file instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the effective config to this file and exit
    #[arg(long)]
    save_config: Option<PathBuf>,
    /// Print the effective config and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,

    /// Rename without asking and pick the first search result
    #[arg(short, long, default_value_t = false)]
    batch: bool,
    /// Rename without asking
    #[arg(short, long, default_value_t = false)]
    always: bool,
    /// Pick the first search result instead of asking
    #[arg(short, long, default_value_t = false)]
    select_first: bool,
    /// Keep going with partial data when a lookup fails in unattended mode
    #[arg(long, default_value_t = false)]
    no_skip_on_error: bool,

    /// Override the series name used for lookups
    #[arg(short, long)]
    name: Option<String>,
    /// Look up this series id instead of searching by name
    #[arg(long)]
    series_id: Option<u64>,
    /// Preferred language for episode names
    #[arg(short, long)]
    lang: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long, default_value_t = false)]
    recursive: bool,

    /// Move files after renaming them
    #[arg(short = 'm', long = "move", default_value_t = false)]
    move_files: bool,
    /// Destination template, e.g. "/tv/{seriesname}/Season {seasonnumber}"
    #[arg(short = 'd', long)]
    move_destination: Option<String>,
    /// Move without asking for confirmation
    #[arg(long, default_value_t = false)]
    no_move_confirmation: bool,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // A blocked prompt read cannot be woken up, so an interrupt ends the
    // process here. Files already renamed stay renamed.
    ctrlc::set_handler(|| {
        eprintln!("\n{}", "Interrupted, stopping".yellow());
        std::process::exit(2);
    })?;

    let config = effective_config(&cli)?;

    if let Some(path) = cli.save_config.as_ref() {
        save_config_to(&config, path)?;
        println!("Saved config: {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    if cli.show_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    config.validate()?;

    if cli.paths.is_empty() {
        bail!("No filenames or directories supplied");
    }

    match cmd_rename(&cli.paths, &config) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err)
            if err
                .downcast_ref::<BatchError>()
                .is_some_and(BatchError::is_user_abort) =>
        {
            eprintln!("{}", err.to_string().yellow());
            Ok(ExitCode::from(2))
        }
        Err(err) => Err(err),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn effective_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match cli.config.as_ref() {
        Some(path) => {
            println!("Loading config: {}", path.display());
            load_config_from(path)?
        }
        None => {
            log::debug!("default config path: {}", app_paths()?.config_path.display());
            load_config()?
        }
    };

    if cli.batch {
        config.select_first = true;
        config.always_rename = true;
    }
    if cli.always {
        config.always_rename = true;
    }
    if cli.select_first {
        config.select_first = true;
    }
    if cli.no_skip_on_error {
        config.skip_file_on_error = false;
    }
    if let Some(name) = cli.name.as_ref() {
        config.force_name = Some(name.clone());
    }
    if let Some(id) = cli.series_id {
        config.series_id = Some(id);
    }
    if let Some(lang) = cli.lang.as_ref() {
        config.language = lang.clone();
    }
    if cli.recursive {
        config.recursive = true;
    }
    if cli.move_files {
        config.move_files_enable = true;
    }
    if let Some(destination) = cli.move_destination.as_ref() {
        config.move_files_destination = Some(destination.clone());
    }
    if cli.no_move_confirmation {
        config.move_files_confirmation = false;
    }

    Ok(config)
}

fn cmd_rename(paths: &[PathBuf], config: &AppConfig) -> Result<()> {
    let mut console = TerminalConsole;

    let files = find_files(paths, config, &mut console);
    if files.is_empty() {
        return Err(BatchError::NoFilesSupplied.into());
    }

    let mut candidates = Vec::with_capacity(files.len());
    for file in &files {
        match parse_filename(file, config) {
            Ok(episode) => candidates.push(episode),
            Err(err) => console.warn(&format!("Invalid filename: {err}")),
        }
    }
    if candidates.is_empty() {
        return Err(BatchError::NoValidEpisodes.into());
    }

    let lookup = TvMazeLookup::new(
        &config.lookup_endpoint,
        Duration::from_secs(config.lookup_timeout_secs),
    )?;

    run_batch(candidates, config, &lookup, &mut console)?;
    Ok(())
}
