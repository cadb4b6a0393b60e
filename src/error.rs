use thiserror::Error;

use crate::models::RuleName;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("evaluation result has no outcome for {0}")]
    MissingRule(RuleName),

    #[error("unexpected header in audit log: {0}")]
    BadHeader(String),

    #[error("line {line}: expected True or False in {column}, found {value:?}")]
    BadBool {
        line: u64,
        column: &'static str,
        value: String,
    },
}
