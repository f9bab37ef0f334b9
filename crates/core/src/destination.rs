use crate::config::AppConfig;
use crate::episode::{format_episode_numbers, Episode};
use crate::error::MoveMisuse;
use crate::sanitize::FilenameSanitizer;
use crate::template::{parse_template, render_template, TemplateValues};

/// Builds the directory an episode should be moved to from
/// `move_files_destination`.
///
/// Only the series name and the formatted episode numbers go through the
/// sanitizer, each on its own and lowercased first when
/// `move_files_lowercase_destination` is set. The season number and the
/// template's literal text (including path separators) are used as is.
pub fn destination_folder(
    episode: &Episode,
    config: &AppConfig,
    sanitizer: &dyn FilenameSanitizer,
) -> Result<String, MoveMisuse> {
    let template = config
        .move_files_destination
        .as_deref()
        .ok_or(MoveMisuse::NoDestination)?;
    let parts = parse_template(template).map_err(|e| MoveMisuse::BadDestination(e.to_string()))?;

    let options = config.sanitize_options();
    let valid = |value: &str| {
        if config.move_files_lowercase_destination {
            sanitizer.sanitize(&value.to_lowercase(), &options)
        } else {
            sanitizer.sanitize(value, &options)
        }
    };

    let seriesname = valid(episode.display_seriesname());
    let episodenumbers = valid(&format_episode_numbers(
        &episode.episodenumbers,
        config.episode_single_width,
        &config.episode_separator,
    ));

    let values = TemplateValues {
        seriesname: Some(&seriesname),
        seasonnumber: Some(episode.seasonnumber),
        episodenumbers: Some(&episodenumbers),
        episodename: None,
        ext: None,
    };
    render_template(&parts, &values).map_err(|e| MoveMisuse::BadDestination(e.to_string()))
}
