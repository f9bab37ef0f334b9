use thiserror::Error;

/// Move was requested in a way the configuration does not allow. This is an
/// integration bug, not something skipping the file would fix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveMisuse {
    #[error("move_files feature is disabled but a move was requested")]
    Disabled,
    #[error("move_files_destination must be set when move_files_enable is on")]
    NoDestination,
    #[error("move_files_destination cannot be used: {0}")]
    BadDestination(String),
}

/// Conditions that stop the whole batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Abort {
    #[error("user exited with q")]
    Quit,
    #[error("interrupted while waiting for input")]
    Interrupted,
    #[error(transparent)]
    Misuse(#[from] MoveMisuse),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("no filenames or directories supplied")]
    NoFilesSupplied,
    #[error("no valid episodes were found")]
    NoValidEpisodes,
    #[error(transparent)]
    Aborted(#[from] Abort),
}

impl BatchError {
    /// Operator-requested stops are not application failures.
    pub fn is_user_abort(&self) -> bool {
        matches!(
            self,
            BatchError::Aborted(Abort::Quit) | BatchError::Aborted(Abort::Interrupted)
        )
    }
}
