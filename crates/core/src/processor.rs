use crate::config::AppConfig;
use crate::console::Console;
use crate::decision::{decide_move, decide_rename, Decision, RunState};
use crate::destination::destination_folder;
use crate::episode::{apply_replacements, Episode};
use crate::error::Abort;
use crate::executor::{move_file, rename_file};
use crate::file_handle::FileHandle;
use crate::lookup::{LookupError, LookupQuery, LookupSession};
use crate::sanitize::FilenameSanitizer;

pub const BANNER: &str = "####################";

/// Everything one batch run shares between episodes.
pub struct RunContext<'a> {
    pub config: &'a AppConfig,
    pub state: RunState,
    pub sanitizer: &'a dyn FilenameSanitizer,
}

impl<'a> RunContext<'a> {
    pub fn new(config: &'a AppConfig, sanitizer: &'a dyn FilenameSanitizer) -> Self {
        Self {
            config,
            state: RunState {
                always_rename: config.always_rename,
            },
            sanitizer,
        }
    }

    /// Unattended from the start, as opposed to escalated mid-run. Only this
    /// mode also skips the move confirmation.
    fn unattended_from_start(&self) -> bool {
        self.config.always_rename
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    AlreadyNamed,
    Renamed { moved: bool },
    /// Operator answered no.
    Declined,
    /// Lookup failed and skip-on-error applies.
    Abandoned,
    /// Rename failed on disk or no filename could be built.
    Failed,
}

/// Runs one episode from lookup to rename/move. Only batch-stopping
/// conditions come back as `Err`; everything else is warned here.
pub fn process_episode(
    ctx: &mut RunContext<'_>,
    session: &mut dyn LookupSession,
    console: &mut dyn Console,
    episode: &mut Episode,
) -> Result<EpisodeOutcome, Abort> {
    let config = ctx.config;

    console.say(BANNER);
    console.say(&format!("# Processing file: {}", episode.fullfilename));
    if !config.input_filename_replacements.is_empty() {
        console.say(&format!(
            "# With custom replacements: {}",
            apply_replacements(&episode.fullfilename, &config.input_filename_replacements)
        ));
    }
    console.say(&format!(
        "# Detected series: {} ({})",
        episode.seriesname,
        episode.number_string()
    ));

    if !resolve_metadata(ctx, session, console, episode)? {
        return Ok(EpisodeOutcome::Abandoned);
    }

    let new_name = match episode.generate_filename(config, ctx.sanitizer, true) {
        Ok(name) => name,
        Err(err) => {
            console.warn(&format!(
                "Could not build filename for {}: {err}",
                episode.fullfilename
            ));
            return Ok(EpisodeOutcome::Failed);
        }
    };

    if new_name == episode.fullfilename {
        console.say(BANNER);
        console.say(&format!(
            "Skipping: existing filename is correct: {}",
            episode.fullfilename
        ));
        console.say(BANNER);
        return Ok(EpisodeOutcome::AlreadyNamed);
    }

    console.say(BANNER);
    console.say(&format!("Old filename: {}", episode.fullfilename));
    if !config.output_filename_replacements.is_empty() {
        if let Ok(unreplaced) = episode.generate_filename(config, ctx.sanitizer, false) {
            console.say(&format!("Before custom output replacements: {unreplaced}"));
        }
    }
    console.say(&format!("New filename: {new_name}"));

    match decide_rename(console, &mut ctx.state)? {
        Decision::Quit => return Err(Abort::Quit),
        Decision::Skip => return Ok(EpisodeOutcome::Declined),
        Decision::Rename | Decision::Escalate => {}
    }

    let mut handle = FileHandle::new(&episode.fullpath);
    if !rename_file(&mut handle, &new_name, console) {
        return Ok(EpisodeOutcome::Failed);
    }

    if !config.move_files_enable {
        return Ok(EpisodeOutcome::Renamed { moved: false });
    }

    let dest_dir = destination_folder(episode, config, ctx.sanitizer)?;
    move_file(&mut handle, &dest_dir, true, config, console)?;

    let confirm = config.move_files_confirmation && !ctx.unattended_from_start();
    let moved = match decide_move(console, confirm)? {
        Decision::Quit => return Err(Abort::Quit),
        Decision::Skip => false,
        Decision::Rename | Decision::Escalate => {
            console.say("Moving file");
            move_file(&mut handle, &dest_dir, false, config, console)?.is_some()
        }
    };

    Ok(EpisodeOutcome::Renamed { moved })
}

/// Looks the episode up and applies whatever was found. Returns `false` when
/// the episode should be abandoned.
fn resolve_metadata(
    ctx: &RunContext<'_>,
    session: &mut dyn LookupSession,
    console: &mut dyn Console,
    episode: &mut Episode,
) -> Result<bool, Abort> {
    let config = ctx.config;
    let query = LookupQuery {
        seriesname: &episode.seriesname,
        seasonnumber: episode.seasonnumber,
        episodenumbers: &episode.episodenumbers,
        force_name: config.force_name.as_deref(),
        series_id: config.series_id,
    };

    let err = match session.resolve(&query, console) {
        Ok(resolved) => {
            episode.apply_resolution(Some(resolved.seriesname), resolved.episode_titles);
            return Ok(true);
        }
        Err(LookupError::Cancelled) => return Err(Abort::Interrupted),
        Err(err) => err,
    };

    if ctx.state.always_rename && config.skip_file_on_error {
        console.warn(&format!("Skipping file due to error: {err}"));
        return Ok(false);
    }

    console.warn(&err.to_string());
    if let Some(seriesname) = err.resolved_seriesname() {
        episode.apply_resolution(Some(seriesname.to_string()), Vec::new());
    }
    Ok(true)
}
