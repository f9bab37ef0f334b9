//! Metadata lookup against the TVmaze public API.

use crate::console::Console;
use crate::lookup::{
    LookupError, LookupQuery, LookupSession, MetadataLookup, Resolved, SessionOptions,
};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// How many search results are offered when the operator picks a series.
const MAX_CHOICES: usize = 10;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Show {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub premiered: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchHit {
    show: Show,
}

#[derive(Debug, Clone, Deserialize)]
struct EpisodeRecord {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SeasonRecord {
    number: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct TvMazeLookup {
    client: Client,
    endpoint: String,
}

impl TvMazeLookup {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tvrenamer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("could not build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// `Ok(None)` for a 404, so callers can tell "not there" from "broken".
    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, LookupError> {
        let url = format!("{}{path}", self.endpoint);
        log::debug!("GET {url} {params:?}");
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .map_err(|e| LookupError::DataRetrieval(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| LookupError::DataRetrieval(e.to_string()))?;
        response
            .json::<T>()
            .map(Some)
            .map_err(|e| LookupError::DataRetrieval(e.to_string()))
    }
}

impl MetadataLookup for TvMazeLookup {
    fn open_session(&self, options: &SessionOptions) -> Box<dyn LookupSession + '_> {
        if options.language != "en" || options.search_all_languages {
            log::debug!(
                "TVmaze serves a single language; ignoring language preference {:?}",
                options.language
            );
        }
        Box::new(TvMazeSession {
            lookup: self,
            interactive: options.interactive,
            shows: HashMap::new(),
            seasons: HashMap::new(),
        })
    }
}

struct TvMazeSession<'a> {
    lookup: &'a TvMazeLookup,
    interactive: bool,
    /// Search name (lowercased) to chosen show, so the operator is asked
    /// once per series per batch.
    shows: HashMap<String, Show>,
    seasons: HashMap<u64, Vec<u32>>,
}

impl TvMazeSession<'_> {
    fn find_show(
        &mut self,
        query: &LookupQuery<'_>,
        console: &mut dyn Console,
    ) -> Result<Show, LookupError> {
        if let Some(id) = query.series_id {
            return self
                .lookup
                .get::<Show>(&format!("/shows/{id}"), &[])?
                .ok_or_else(|| LookupError::ShowNotFound(format!("series id {id}")));
        }

        let name = query.force_name.unwrap_or(query.seriesname);
        let key = name.to_lowercase();
        if let Some(show) = self.shows.get(&key) {
            return Ok(show.clone());
        }

        let hits = self
            .lookup
            .get::<Vec<SearchHit>>("/search/shows", &[("q", name.to_string())])?
            .unwrap_or_default();
        let shows: Vec<Show> = hits.into_iter().map(|hit| hit.show).collect();

        let show = match shows.len() {
            0 => return Err(LookupError::ShowNotFound(name.to_string())),
            1 => shows[0].clone(),
            _ if !self.interactive => shows[0].clone(),
            _ => choose_show(name, &shows, console)?,
        };
        self.shows.insert(key, show.clone());
        Ok(show)
    }

    fn season_exists(&mut self, show_id: u64, season: u32) -> Result<bool, LookupError> {
        if !self.seasons.contains_key(&show_id) {
            let numbers = self
                .lookup
                .get::<Vec<SeasonRecord>>(&format!("/shows/{show_id}/seasons"), &[])?
                .unwrap_or_default()
                .into_iter()
                .filter_map(|s| s.number)
                .collect();
            self.seasons.insert(show_id, numbers);
        }
        Ok(self
            .seasons
            .get(&show_id)
            .is_some_and(|numbers| numbers.contains(&season)))
    }
}

impl LookupSession for TvMazeSession<'_> {
    fn resolve(
        &mut self,
        query: &LookupQuery<'_>,
        console: &mut dyn Console,
    ) -> Result<Resolved, LookupError> {
        let show = self.find_show(query, console)?;
        let season = query.seasonnumber;

        let mut titles = Vec::with_capacity(query.episodenumbers.len());
        for &number in query.episodenumbers {
            let record = self.lookup.get::<EpisodeRecord>(
                &format!("/shows/{}/episodebynumber", show.id),
                &[("season", season.to_string()), ("number", number.to_string())],
            )?;
            let Some(record) = record else {
                if !self.season_exists(show.id, season)? {
                    return Err(LookupError::SeasonNotFound {
                        seriesname: show.name,
                        season,
                    });
                }
                return Err(LookupError::EpisodeNotFound {
                    seriesname: show.name,
                    season,
                    episode: number,
                });
            };
            match record.name.filter(|n| !n.trim().is_empty()) {
                Some(name) => titles.push(name),
                None => {
                    return Err(LookupError::EpisodeNameNotFound {
                        seriesname: show.name,
                        season,
                        episode: number,
                    })
                }
            }
        }

        Ok(Resolved {
            seriesname: show.name,
            episode_titles: titles,
        })
    }
}

/// Lists the search results and asks which one is meant. Enter picks the
/// first, `q` or closed input cancels.
pub fn choose_show(
    name: &str,
    shows: &[Show],
    console: &mut dyn Console,
) -> Result<Show, LookupError> {
    let shown = &shows[..shows.len().min(MAX_CHOICES)];
    console.say(&format!("TVmaze search results for \"{name}\":"));
    for (index, show) in shown.iter().enumerate() {
        let year = show
            .premiered
            .as_deref()
            .and_then(|date| date.get(..4))
            .unwrap_or("????");
        console.say(&format!("{} -> {} ({year}) [id {}]", index + 1, show.name, show.id));
    }

    loop {
        let answer = match console.read_answer("Enter choice (first number, q to quit) [1]: ") {
            Ok(Some(answer)) => answer,
            Ok(None) | Err(_) => return Err(LookupError::Cancelled),
        };
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(shown[0].clone());
        }
        if answer == "q" {
            return Err(LookupError::Cancelled);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=shown.len()).contains(&n) => return Ok(shown[n - 1].clone()),
            _ => console.say(&format!("Invalid choice: {answer}")),
        }
    }
}
