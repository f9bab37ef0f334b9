use crate::config::AppConfig;
use crate::console::Console;
use crate::episode::Episode;
use crate::error::BatchError;
use crate::lookup::{MetadataLookup, SessionOptions};
use crate::processor::{process_episode, RunContext, BANNER};
use crate::sanitize::{DefaultSanitizer, FilenameSanitizer};

pub fn run_batch(
    candidates: Vec<Episode>,
    config: &AppConfig,
    lookup: &dyn MetadataLookup,
    console: &mut dyn Console,
) -> Result<(), BatchError> {
    run_batch_with_sanitizer(candidates, config, lookup, &DefaultSanitizer, console)
}

/// Processes every eligible episode in sorted order. Per-episode problems are
/// warned and skipped over; a quit or interrupt stops the loop right away
/// without undoing earlier renames.
pub fn run_batch_with_sanitizer(
    candidates: Vec<Episode>,
    config: &AppConfig,
    lookup: &dyn MetadataLookup,
    sanitizer: &dyn FilenameSanitizer,
    console: &mut dyn Console,
) -> Result<(), BatchError> {
    if candidates.is_empty() {
        return Err(BatchError::NoFilesSupplied);
    }

    console.say(BANNER);
    console.say("# Starting tvrenamer");

    let mut episodes = Vec::with_capacity(candidates.len());
    for episode in candidates {
        if episode.is_eligible() {
            episodes.push(episode);
        } else {
            console.warn(&format!(
                "Parsed filename did not contain series name, skipping: {}",
                episode.fullpath.display()
            ));
        }
    }

    if episodes.is_empty() {
        return Err(BatchError::NoValidEpisodes);
    }

    let plural = if episodes.len() > 1 { "s" } else { "" };
    console.say(&format!("# Found {} episode{plural}", episodes.len()));

    episodes.sort_by_key(Episode::sort_key);

    let options = SessionOptions {
        interactive: !config.select_first,
        language: config.language.clone(),
        search_all_languages: config.search_all_languages,
    };
    let mut session = lookup.open_session(&options);
    let mut ctx = RunContext::new(config, sanitizer);
    log::info!(
        "processing {} episodes (unattended: {})",
        episodes.len(),
        ctx.state.always_rename
    );

    for episode in &mut episodes {
        let outcome = process_episode(&mut ctx, session.as_mut(), console, episode)?;
        log::debug!("{}: {outcome:?}", episode.fullfilename);
        console.say("");
    }

    console.say(BANNER);
    console.say("# Done");
    Ok(())
}
