use nomvote_voting::VotingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("task #{index} ({task}) failed: {source}")]
    Task {
        index: usize,
        task: &'static str,
        #[source]
        source: VotingError,
    },

    #[error("registry error: {0}")]
    Voting(#[from] VotingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
