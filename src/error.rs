use thiserror::Error;

use crate::job::Stage;

#[derive(Error, Debug)]
pub enum SetmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// An external program could not be started or exited unsuccessfully.
    #[error("{tool} failed ({status}): {stderr}")]
    Tool {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Subtitle error: {0}")]
    Subtitle(String),

    #[error("Expected artifact is missing or empty: {0}")]
    MissingArtifact(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Wraps whatever went wrong inside a pipeline stage.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<SetmError>,
    },
}

impl SetmError {
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            // Keep the innermost stage when an error is re-tagged.
            already @ SetmError::Stage { .. } => already,
            other => SetmError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage the error was raised in, if it came out of the pipeline.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SetmError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SetmError>;
