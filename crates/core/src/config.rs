use crate::sanitize::SanitizeOptions;
use crate::template::parse_template;
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILENAME_WITH_EPISODE: &str =
    "{seriesname} - [{seasonnumber:02}x{episodenumbers}] - {episodename}{ext}";
pub const DEFAULT_FILENAME_WITHOUT_EPISODE: &str =
    "{seriesname} - [{seasonnumber:02}x{episodenumbers}]{ext}";
pub const DEFAULT_LOOKUP_ENDPOINT: &str = "https://api.tvmaze.com";

/// A regex find/replace applied to filenames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub with_extension: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub select_first: bool,
    pub always_rename: bool,
    pub skip_file_on_error: bool,
    pub language: String,
    pub search_all_languages: bool,
    pub force_name: Option<String>,
    pub series_id: Option<u64>,

    pub recursive: bool,
    pub valid_extensions: Vec<String>,
    pub filename_blacklist: Vec<String>,

    pub filename_with_episode: String,
    pub filename_without_episode: String,
    pub episode_single_width: usize,
    pub episode_separator: String,
    pub multiep_join_name_with: String,
    pub lowercase_filename: bool,

    pub windows_safe_filenames: bool,
    pub normalize_unicode_filenames: bool,
    pub custom_filename_character_blacklist: String,
    pub replace_invalid_characters_with: String,

    pub input_filename_replacements: Vec<Replacement>,
    pub output_filename_replacements: Vec<Replacement>,

    pub move_files_enable: bool,
    pub move_files_confirmation: bool,
    pub move_files_lowercase_destination: bool,
    pub move_files_destination: Option<String>,

    pub lookup_endpoint: String,
    pub lookup_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            select_first: false,
            always_rename: false,
            skip_file_on_error: true,
            language: "en".to_string(),
            search_all_languages: false,
            force_name: None,
            series_id: None,
            recursive: false,
            valid_extensions: Vec::new(),
            filename_blacklist: Vec::new(),
            filename_with_episode: DEFAULT_FILENAME_WITH_EPISODE.to_string(),
            filename_without_episode: DEFAULT_FILENAME_WITHOUT_EPISODE.to_string(),
            episode_single_width: 2,
            episode_separator: "-".to_string(),
            multiep_join_name_with: ", ".to_string(),
            lowercase_filename: false,
            windows_safe_filenames: cfg!(windows),
            normalize_unicode_filenames: false,
            custom_filename_character_blacklist: String::new(),
            replace_invalid_characters_with: "_".to_string(),
            input_filename_replacements: Vec::new(),
            output_filename_replacements: Vec::new(),
            move_files_enable: false,
            move_files_confirmation: true,
            move_files_lowercase_destination: false,
            move_files_destination: None,
            lookup_endpoint: DEFAULT_LOOKUP_ENDPOINT.to_string(),
            lookup_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn sanitize_options(&self) -> SanitizeOptions {
        SanitizeOptions {
            normalize_unicode: self.normalize_unicode_filenames,
            windows_safe: self.windows_safe_filenames,
            custom_blacklist: self.custom_filename_character_blacklist.clone(),
            replace_with: self.replace_invalid_characters_with.clone(),
        }
    }

    /// Checks templates and replacement patterns before a run starts, so a
    /// broken config fails up front instead of once per file.
    pub fn validate(&self) -> Result<()> {
        parse_template(&self.filename_with_episode)
            .context("invalid filename_with_episode template")?;
        parse_template(&self.filename_without_episode)
            .context("invalid filename_without_episode template")?;

        if self.move_files_enable {
            let Some(destination) = self.move_files_destination.as_deref() else {
                bail!("move_files_destination must be set when move_files_enable is on");
            };
            parse_template(destination).context("invalid move_files_destination template")?;
        }

        for replacement in self
            .input_filename_replacements
            .iter()
            .chain(&self.output_filename_replacements)
        {
            regex::Regex::new(&replacement.pattern).with_context(|| {
                format!("invalid filename replacement pattern: {}", replacement.pattern)
            })?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("org", "tvrenamer", "tvrenamer")
        .context("could not determine the OS config directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

/// Loads the config from the default location, or returns defaults when no
/// file exists there yet.
pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }
    load_config_from(&paths.config_path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read config file: {}", path.display()))?;

    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("could not parse config file: {}", path.display()))?;
    Ok(config)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("could not create config directory: {}", parent.display())
        })?;
    }
    let body = toml::to_string_pretty(config).context("could not serialize config")?;
    fs::write(path, body)
        .with_context(|| format!("could not write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_validate() {
        AppConfig::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn move_without_destination_is_rejected() {
        let config = AppConfig {
            move_files_enable: true,
            ..AppConfig::default()
        };
        let err = config.validate().expect_err("must fail");
        assert!(err.to_string().contains("move_files_destination"));
    }

    #[test]
    fn bad_replacement_pattern_is_rejected() {
        let config = AppConfig {
            output_filename_replacements: vec![Replacement {
                pattern: "(".to_string(),
                replacement: String::new(),
                with_extension: false,
            }],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("config.toml");
        let config = AppConfig {
            move_files_enable: true,
            move_files_destination: Some("/tv/{seriesname}/Season {seasonnumber}".to_string()),
            series_id: Some(42),
            ..AppConfig::default()
        };
        save_config_to(&config, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");
        assert!(loaded.move_files_enable);
        assert_eq!(loaded.series_id, Some(42));
        assert_eq!(
            loaded.move_files_destination.as_deref(),
            Some("/tv/{seriesname}/Season {seasonnumber}")
        );
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "always_rename = true\n").expect("write");
        let loaded = load_config_from(&path).expect("load");
        assert!(loaded.always_rename);
        assert_eq!(loaded.filename_with_episode, DEFAULT_FILENAME_WITH_EPISODE);
    }
}
