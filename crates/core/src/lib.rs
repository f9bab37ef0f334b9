mod batch;
mod config;
mod console;
mod decision;
mod destination;
mod discovery;
mod episode;
mod error;
mod executor;
mod file_handle;
mod lookup;
mod processor;
mod sanitize;
mod template;
mod tvmaze;

pub use batch::{run_batch, run_batch_with_sanitizer};
pub use config::{
    app_paths, load_config, load_config_from, save_config_to, AppConfig, AppPaths, Replacement,
    DEFAULT_FILENAME_WITHOUT_EPISODE, DEFAULT_FILENAME_WITH_EPISODE, DEFAULT_LOOKUP_ENDPOINT,
};
pub use console::{Console, ScriptedConsole, TerminalConsole};
pub use decision::{
    ask, decide_move, decide_rename, Answer, Decision, Prompt, RunState, MOVE_PROMPT,
    RENAME_PROMPT,
};
pub use destination::destination_folder;
pub use discovery::{clean_series_name, find_files, parse_filename, ParseError};
pub use episode::{apply_replacements, format_episode_name, format_episode_numbers, Episode};
pub use error::{Abort, BatchError, MoveMisuse};
pub use executor::{move_file, rename_file};
pub use file_handle::FileHandle;
pub use lookup::{
    LookupError, LookupQuery, LookupSession, MetadataLookup, Resolved, SessionOptions,
};
pub use processor::{process_episode, EpisodeOutcome, RunContext};
pub use sanitize::{make_valid_filename, DefaultSanitizer, FilenameSanitizer, SanitizeOptions};
pub use template::{
    parse_template, render_template, validate_template, TemplateError, TemplatePart,
    TemplateValues, Token,
};
pub use tvmaze::{choose_show, Show, TvMazeLookup};
