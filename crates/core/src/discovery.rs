use crate::config::AppConfig;
use crate::console::Console;
use crate::episode::{apply_replacements, Episode};
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("cannot parse filename: {0}")]
    InvalidFilename(String),
}

/// `Show.Name.S01E02`, `S01E02E03`, `S01E02-E04`
static SEASON_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<series>.*?)[ ._\-\[]*s(?P<season>\d+)[ ._\-]*(?P<episodes>e\d+(?:[ ._\-]*(?:e|-e?)\d+)*)",
    )
    .expect("valid season/episode pattern")
});

/// `Show Name 1x02`, `[01x02]`, `1x02-03`, `1x02x03`
static CROSS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<series>.*?)[ ._\-\[]*(?P<season>\d+)x(?P<episodes>\d+(?:(?:x|-)\d+)*)",
    )
    .expect("valid cross pattern")
});

/// `Show.Name.102` (season 1, episode 2)
static COMPACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<series>.+?)[ ._\-]+(?P<season>\d)(?P<episodes>\d{2})(?:[ ._\-\[]|$)")
        .expect("valid compact pattern")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid number pattern"));

/// Collects candidate files from the given files and directories, sorted and
/// without duplicates. Paths that do not exist are warned about and skipped.
pub fn find_files(paths: &[PathBuf], config: &AppConfig, console: &mut dyn Console) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();

    for path in paths {
        if path.is_file() {
            if is_wanted(path, config) {
                found.insert(absolute(path));
            }
        } else if path.is_dir() {
            let depth = if config.recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(path)
                .max_depth(depth)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));
            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        if is_wanted(entry.path(), config) {
                            found.insert(absolute(entry.path()));
                        }
                    }
                    Ok(_) => {}
                    Err(err) => console.warn(&format!("Could not read {}: {err}", path.display())),
                }
            }
        } else {
            console.warn(&format!("Invalid path: {}", path.display()));
        }
    }

    found.into_iter().collect()
}

/// Extracts series, season and episode numbers from a filename. A name
/// without anything before the episode marker parses with an empty series
/// name, which the batch later drops.
pub fn parse_filename(path: &Path, config: &AppConfig) -> Result<Episode, ParseError> {
    let file_name = path
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .ok_or_else(|| ParseError::InvalidFilename(path.display().to_string()))?;
    let replaced = apply_replacements(&file_name, &config.input_filename_replacements);
    let stem = match replaced.rfind('.') {
        Some(idx) if idx > 0 => &replaced[..idx],
        _ => replaced.as_str(),
    };

    for pattern in [&*SEASON_EPISODE, &*CROSS, &*COMPACT] {
        if let Some(caps) = pattern.captures(stem) {
            if let Some(episode) = episode_from_captures(path, &caps) {
                log::debug!("parsed {file_name} with pattern {}", pattern.as_str());
                return Ok(episode);
            }
        }
    }

    Err(ParseError::InvalidFilename(file_name))
}

fn episode_from_captures(path: &Path, caps: &Captures<'_>) -> Option<Episode> {
    let season = caps.name("season")?.as_str().parse::<u32>().ok()?;
    let episodes_text = caps.name("episodes")?.as_str();
    let numbers: Vec<u32> = NUMBER
        .find_iter(episodes_text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    let episodenumbers = match numbers.as_slice() {
        [] => return None,
        [start, end] if episodes_text.contains('-') && end > start => (*start..=*end).collect(),
        _ => numbers,
    };

    let series = caps
        .name("series")
        .map(|m| clean_series_name(m.as_str()))
        .unwrap_or_default();

    Some(Episode::new(path, series, season, episodenumbers))
}

/// `Show.Name_` -> `Show Name`
pub fn clean_series_name(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if c == '.' || c == '_' { ' ' } else { c })
        .collect();
    replaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c == '[' || c == ' ')
        .to_string()
}

fn is_wanted(path: &Path, config: &AppConfig) -> bool {
    let Some(name) = path.file_name().map(|v| v.to_string_lossy()) else {
        return false;
    };
    if config.filename_blacklist.iter().any(|b| b == name.as_ref()) {
        return false;
    }
    if config.valid_extensions.is_empty() {
        return true;
    }
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            config
                .valid_extensions
                .iter()
                .any(|valid| valid.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Replacement;
    use crate::console::ScriptedConsole;
    use tempfile::tempdir;

    fn parse(name: &str) -> Episode {
        parse_filename(Path::new(name), &AppConfig::default()).expect("must parse")
    }

    #[test]
    fn parses_dotted_season_episode() {
        let ep = parse("Show.Name.S01E02.avi");
        assert_eq!(ep.seriesname, "Show Name");
        assert_eq!(ep.seasonnumber, 1);
        assert_eq!(ep.episodenumbers, vec![2]);
    }

    #[test]
    fn parses_multi_episode_forms() {
        assert_eq!(parse("show.s02e03e04.mkv").episodenumbers, vec![3, 4]);
        assert_eq!(parse("show.s02e03-e05.mkv").episodenumbers, vec![3, 4, 5]);
        assert_eq!(parse("Show Name 1x02-03.avi").episodenumbers, vec![2, 3]);
    }

    #[test]
    fn parses_bracketed_cross_and_compact() {
        let ep = parse("Show Name - [01x02] - Pilot.avi");
        assert_eq!(ep.seriesname, "Show Name");
        assert_eq!((ep.seasonnumber, ep.episodenumbers), (1, vec![2]));

        let ep = parse("show_name.102.hdtv.avi");
        assert_eq!(ep.seriesname, "show name");
        assert_eq!((ep.seasonnumber, ep.episodenumbers), (1, vec![2]));
    }

    #[test]
    fn missing_series_parses_as_ineligible() {
        let ep = parse("S01E02.avi");
        assert!(!ep.is_eligible());
    }

    #[test]
    fn unparseable_is_an_error() {
        let err = parse_filename(Path::new("holiday video.avi"), &AppConfig::default())
            .expect_err("must fail");
        assert!(matches!(err, ParseError::InvalidFilename(_)));
    }

    #[test]
    fn input_replacements_apply_before_parsing() {
        let config = AppConfig {
            input_filename_replacements: vec![Replacement {
                pattern: "^the\\.office".to_string(),
                replacement: "The Office (US)".to_string(),
                with_extension: false,
            }],
            ..AppConfig::default()
        };
        let ep = parse_filename(Path::new("the.office.s01e01.avi"), &config).expect("parse");
        assert_eq!(ep.seriesname, "The Office (US)");
        assert_eq!(ep.fullfilename, "the.office.s01e01.avi");
    }

    #[test]
    fn find_files_filters_and_reports_invalid_paths() {
        let temp = tempdir().expect("tempdir");
        let nested = temp.path().join("nested");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(temp.path().join("a.s01e01.avi"), b"x").expect("write");
        fs::write(temp.path().join("notes.txt"), b"x").expect("write");
        fs::write(temp.path().join(".hidden.s01e01.avi"), b"x").expect("write");
        fs::write(nested.join("b.s01e02.avi"), b"x").expect("write");

        let mut config = AppConfig {
            valid_extensions: vec!["avi".to_string()],
            ..AppConfig::default()
        };
        let mut console = ScriptedConsole::default();
        let paths = vec![temp.path().to_path_buf(), temp.path().join("missing")];

        let flat = find_files(&paths, &config, &mut console);
        assert_eq!(flat.len(), 1);
        assert_eq!(console.warnings.len(), 1);

        config.recursive = true;
        let deep = find_files(&paths, &config, &mut console);
        assert_eq!(deep.len(), 2);
    }
}
