use crate::config::{AppConfig, Replacement};
use crate::sanitize::FilenameSanitizer;
use crate::template::{parse_template, render_template, TemplateError, TemplateValues};
use regex::Regex;
use std::path::PathBuf;

/// A discovered file plus the series/season/episode identity parsed from its
/// name. Lookup results are filled in by [`Episode::apply_resolution`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub fullpath: PathBuf,
    pub fullfilename: String,
    pub seriesname: String,
    pub seasonnumber: u32,
    pub episodenumbers: Vec<u32>,
    /// Extension including the leading dot, empty when the file has none.
    pub extension: String,
    pub resolved_name: Option<String>,
    pub resolved_episode_titles: Vec<String>,
}

impl Episode {
    pub fn new(
        fullpath: impl Into<PathBuf>,
        seriesname: impl Into<String>,
        seasonnumber: u32,
        episodenumbers: Vec<u32>,
    ) -> Self {
        let fullpath = fullpath.into();
        let fullfilename = fullpath
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = fullpath
            .extension()
            .map(|v| format!(".{}", v.to_string_lossy()))
            .unwrap_or_default();
        Self {
            fullpath,
            fullfilename,
            seriesname: seriesname.into(),
            seasonnumber,
            episodenumbers,
            extension,
            resolved_name: None,
            resolved_episode_titles: Vec::new(),
        }
    }

    pub fn is_eligible(&self) -> bool {
        !self.seriesname.trim().is_empty()
    }

    pub fn sort_key(&self) -> (String, u32, u32) {
        (
            self.seriesname.to_lowercase(),
            self.seasonnumber,
            self.episodenumbers.first().copied().unwrap_or(0),
        )
    }

    /// The series name to use for output: the corrected one once the lookup
    /// found the series, otherwise what was parsed.
    pub fn display_seriesname(&self) -> &str {
        self.resolved_name.as_deref().unwrap_or(&self.seriesname)
    }

    /// Short identity string for banners, e.g. `season: 1, episode: 2, 3`.
    pub fn number_string(&self) -> String {
        let numbers = self
            .episodenumbers
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let label = if self.episodenumbers.len() > 1 {
            "episodes"
        } else {
            "episode"
        };
        format!("season: {}, {label}: {numbers}", self.seasonnumber)
    }

    pub fn apply_resolution(&mut self, seriesname: Option<String>, titles: Vec<String>) {
        if let Some(name) = seriesname.filter(|n| !n.trim().is_empty()) {
            self.resolved_name = Some(name);
        }
        if !titles.is_empty() {
            self.resolved_episode_titles = titles;
        }
    }

    /// Builds the canonical filename. With `apply_output_replacements` off
    /// the configured output replacements are skipped, which is what gets
    /// shown to the operator as the pre-replacement variant.
    pub fn generate_filename(
        &self,
        config: &AppConfig,
        sanitizer: &dyn FilenameSanitizer,
        apply_output_replacements: bool,
    ) -> Result<String, TemplateError> {
        let episodenumbers = format_episode_numbers(
            &self.episodenumbers,
            config.episode_single_width,
            &config.episode_separator,
        );
        let episodename = format_episode_name(
            &self.resolved_episode_titles,
            &config.multiep_join_name_with,
        );

        let template = if episodename.is_some() {
            &config.filename_with_episode
        } else {
            &config.filename_without_episode
        };
        let parts = parse_template(template)?;
        let values = TemplateValues {
            seriesname: Some(self.display_seriesname()),
            seasonnumber: Some(self.seasonnumber),
            episodenumbers: Some(&episodenumbers),
            episodename: episodename.as_deref(),
            ext: Some(&self.extension),
        };

        let mut filename = render_template(&parts, &values)?;
        if config.lowercase_filename {
            filename = filename.to_lowercase();
        }
        let filename = sanitizer.sanitize(&filename, &config.sanitize_options());

        if apply_output_replacements {
            Ok(apply_replacements(&filename, &config.output_filename_replacements))
        } else {
            Ok(filename)
        }
    }
}

/// `[2, 3]` with width 2 and separator `-` gives `02-03`.
pub fn format_episode_numbers(numbers: &[u32], width: usize, separator: &str) -> String {
    numbers
        .iter()
        .map(|n| format!("{n:0width$}"))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Joins multi-episode titles. Titles sharing a base and differing only by a
/// trailing `(n)` collapse into `Base (1-2)`.
pub fn format_episode_name(titles: &[String], join_with: &str) -> Option<String> {
    let titles: Vec<&str> = titles
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    match titles.as_slice() {
        [] => None,
        [single] => Some((*single).to_string()),
        many => Some(collapse_numbered_titles(many).unwrap_or_else(|| many.join(join_with))),
    }
}

fn collapse_numbered_titles(titles: &[&str]) -> Option<String> {
    let mut base: Option<&str> = None;
    let mut numbers = Vec::with_capacity(titles.len());
    for title in titles {
        let (name, number) = split_part_number(title)?;
        match base {
            Some(existing) if existing != name => return None,
            _ => base = Some(name),
        }
        numbers.push(number);
    }
    let numbers = numbers.join("-");
    base.map(|b| format!("{b} ({numbers})"))
}

fn split_part_number(title: &str) -> Option<(&str, &str)> {
    let inner = title.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let number = &inner[open + 1..];
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((inner[..open].trim_end(), number))
}

/// Applies regex replacements in order. Replacements without
/// `with_extension` only touch the part before the last `.`.
pub fn apply_replacements(filename: &str, replacements: &[Replacement]) -> String {
    let mut out = filename.to_string();
    for replacement in replacements {
        let Ok(re) = Regex::new(&replacement.pattern) else {
            log::warn!("skipping invalid replacement pattern: {}", replacement.pattern);
            continue;
        };
        if replacement.with_extension {
            out = re.replace_all(&out, replacement.replacement.as_str()).into_owned();
        } else {
            let (stem, ext) = match out.rfind('.') {
                Some(idx) if idx > 0 => out.split_at(idx),
                _ => (out.as_str(), ""),
            };
            let replaced = format!(
                "{}{}",
                re.replace_all(stem, replacement.replacement.as_str()),
                ext
            );
            out = replaced;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::{DefaultSanitizer, SanitizeOptions};

    fn episode() -> Episode {
        Episode::new("/tv/Show.Name.S01E02.avi", "Show Name", 1, vec![2])
    }

    #[test]
    fn new_derives_filename_and_extension() {
        let ep = episode();
        assert_eq!(ep.fullfilename, "Show.Name.S01E02.avi");
        assert_eq!(ep.extension, ".avi");
    }

    #[test]
    fn eligibility_requires_series_name() {
        let mut ep = episode();
        assert!(ep.is_eligible());
        ep.seriesname = "  ".to_string();
        assert!(!ep.is_eligible());
    }

    #[test]
    fn filename_with_resolved_title() {
        let mut ep = episode();
        ep.apply_resolution(Some("Show Name".to_string()), vec!["Pilot 2".to_string()]);
        let name = ep
            .generate_filename(&AppConfig::default(), &DefaultSanitizer, true)
            .expect("generate");
        assert_eq!(name, "Show Name - [01x02] - Pilot 2.avi");
    }

    #[test]
    fn filename_without_title_uses_short_template() {
        let ep = episode();
        let name = ep
            .generate_filename(&AppConfig::default(), &DefaultSanitizer, true)
            .expect("generate");
        assert_eq!(name, "Show Name - [01x02].avi");
    }

    #[test]
    fn corrected_series_name_wins() {
        let mut ep = episode();
        ep.apply_resolution(Some("The Show Name".to_string()), Vec::new());
        let name = ep
            .generate_filename(&AppConfig::default(), &DefaultSanitizer, true)
            .expect("generate");
        assert_eq!(name, "The Show Name - [01x02].avi");
    }

    #[test]
    fn multi_episode_numbers_and_titles() {
        assert_eq!(format_episode_numbers(&[2, 3], 2, "-"), "02-03");
        let titles = vec!["Pilot (1)".to_string(), "Pilot (2)".to_string()];
        assert_eq!(
            format_episode_name(&titles, ", ").as_deref(),
            Some("Pilot (1-2)")
        );
        let titles = vec!["Alpha".to_string(), "Beta".to_string()];
        assert_eq!(
            format_episode_name(&titles, ", ").as_deref(),
            Some("Alpha, Beta")
        );
    }

    #[test]
    fn output_replacements_skip_extension_by_default() {
        let replacements = vec![Replacement {
            pattern: "a".to_string(),
            replacement: "4".to_string(),
            with_extension: false,
        }];
        assert_eq!(apply_replacements("banana.avi", &replacements), "b4n4n4.avi");
    }

    #[test]
    fn preview_variant_skips_output_replacements() {
        let mut ep = episode();
        ep.apply_resolution(None, vec!["Pilot".to_string()]);
        let config = AppConfig {
            output_filename_replacements: vec![Replacement {
                pattern: " - ".to_string(),
                replacement: ".".to_string(),
                with_extension: false,
            }],
            ..AppConfig::default()
        };
        let with = ep
            .generate_filename(&config, &DefaultSanitizer, true)
            .expect("generate");
        let without = ep
            .generate_filename(&config, &DefaultSanitizer, false)
            .expect("generate");
        assert_eq!(with, "Show Name.[01x02].Pilot.avi");
        assert_eq!(without, "Show Name - [01x02] - Pilot.avi");
    }

    struct UnderscoreSpaces;

    impl FilenameSanitizer for UnderscoreSpaces {
        fn sanitize(&self, value: &str, _options: &SanitizeOptions) -> String {
            value.replace(' ', "_")
        }
    }

    #[test]
    fn filename_goes_through_supplied_sanitizer() {
        let ep = episode();
        let name = ep
            .generate_filename(&AppConfig::default(), &UnderscoreSpaces, true)
            .expect("generate");
        assert_eq!(name, "Show_Name_-_[01x02].avi");
    }

    #[test]
    fn sort_key_orders_by_series_season_episode() {
        let a = Episode::new("/a.avi", "Beta", 1, vec![1]);
        let b = Episode::new("/b.avi", "alpha", 2, vec![1]);
        let c = Episode::new("/c.avi", "Alpha", 1, vec![5]);
        let mut eps = vec![a, b, c];
        eps.sort_by_key(Episode::sort_key);
        let order: Vec<_> = eps.iter().map(|e| e.fullfilename.as_str()).collect();
        assert_eq!(order, vec!["c.avi", "b.avi", "a.avi"]);
    }
}
