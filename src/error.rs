use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot open output file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write to output file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no case number given\nexample: trf5_scraper fetch 0015648-78.1999.4.05.0000"
    )]
    MissingCaseNumber,

    #[error("output path is empty")]
    EmptyOutputPath,

    #[error("cannot read case list {path}: {source}")]
    CaseList {
        path: PathBuf,
        source: std::io::Error,
    },
}
