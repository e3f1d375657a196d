use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CobertaError {
    #[error("bad mode line: {line}")]
    BadModeLine { line: String },

    #[error("inconsistent statement count: changed from {from} to {to}")]
    InconsistentStatementCount { from: u32, to: u32 },

    #[error("can't find {file:?}")]
    FileNotFound { file: String },

    #[error("failed to parse {path}: {message}")]
    SourceParse { path: PathBuf, message: String },

    #[error("failed to read input: {source}")]
    Input {
        #[source]
        source: std::io::Error,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {source}")]
    Output {
        #[source]
        source: std::io::Error,
    },
}
