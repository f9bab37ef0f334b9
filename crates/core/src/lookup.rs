use crate::console::Console;
use thiserror::Error;

/// Failures a metadata lookup can report. The last three mean the series
/// itself was identified, so they carry its corrected name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("show not found: {0}")]
    ShowNotFound(String),
    #[error("error retrieving data: {0}")]
    DataRetrieval(String),
    #[error("series selection cancelled by operator")]
    Cancelled,
    #[error("season {season} of show {seriesname} could not be found")]
    SeasonNotFound { seriesname: String, season: u32 },
    #[error("episode {episode} of show {seriesname}, season {season} could not be found")]
    EpisodeNotFound {
        seriesname: String,
        season: u32,
        episode: u32,
    },
    #[error("episode name not found for {seriesname}, season {season}, episode {episode}")]
    EpisodeNameNotFound {
        seriesname: String,
        season: u32,
        episode: u32,
    },
}

impl LookupError {
    /// The corrected series name, when the series was found before the
    /// failure happened.
    pub fn resolved_seriesname(&self) -> Option<&str> {
        match self {
            LookupError::ShowNotFound(_)
            | LookupError::DataRetrieval(_)
            | LookupError::Cancelled => None,
            LookupError::SeasonNotFound { seriesname, .. }
            | LookupError::EpisodeNotFound { seriesname, .. }
            | LookupError::EpisodeNameNotFound { seriesname, .. } => Some(seriesname),
        }
    }
}

/// Batch-wide settings a lookup session is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Let the operator pick between ambiguous search results instead of
    /// taking the first one.
    pub interactive: bool,
    pub language: String,
    pub search_all_languages: bool,
}

/// What one episode is looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupQuery<'a> {
    pub seriesname: &'a str,
    pub seasonnumber: u32,
    pub episodenumbers: &'a [u32],
    pub force_name: Option<&'a str>,
    pub series_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolved {
    pub seriesname: String,
    /// One title per requested episode number, in order.
    pub episode_titles: Vec<String>,
}

pub trait LookupSession {
    /// `console` is available for services that ask the operator to choose
    /// between ambiguous matches.
    fn resolve(
        &mut self,
        query: &LookupQuery<'_>,
        console: &mut dyn Console,
    ) -> Result<Resolved, LookupError>;
}

/// Opens one [`LookupSession`] per batch.
pub trait MetadataLookup {
    fn open_session(&self, options: &SessionOptions) -> Box<dyn LookupSession + '_>;
}
