use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ConfigError;
use crate::parser::extract::process_number::PROCESS_NUMBER_RE;
use crate::sink::DateStyle;

pub const DEFAULT_OUTPUT: &str = "results.jl";

/// Where and how records are persisted for one run.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub output: PathBuf,
    pub dates: DateStyle,
}

impl SinkConfig {
    pub fn new(output: PathBuf, iso_dates: bool) -> Result<Self, ConfigError> {
        if output.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputPath);
        }
        let dates = if iso_dates {
            DateStyle::Iso8601
        } else {
            DateStyle::AsExtracted
        };
        Ok(SinkConfig { output, dates })
    }
}

/// Collect case numbers from the command line and an optional list file
/// (one per line). Blank entries are dropped; nothing left is an error.
pub fn case_numbers(args: Vec<String>, list: Option<&Path>) -> Result<Vec<String>, ConfigError> {
    let mut numbers: Vec<String> = args;

    if let Some(path) = list {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::CaseList {
            path: path.to_path_buf(),
            source,
        })?;
        numbers.extend(content.lines().map(str::to_string));
    }

    let numbers: Vec<String> = numbers
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    if numbers.is_empty() {
        return Err(ConfigError::MissingCaseNumber);
    }

    for n in &numbers {
        if !PROCESS_NUMBER_RE.is_match(n) {
            warn!(numero = %n, "Case number is not in NNNNNNN-NN.NNNN.N.NN.NNNN form, sending as-is");
        }
    }

    Ok(numbers)
}
