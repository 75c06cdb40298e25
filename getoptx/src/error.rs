use std::io;

#[derive(Debug, thiserror::Error)]
pub enum GetoptxError {
    #[error("bad option: {0}")]
    BadOption(String),

    #[error("argument expected after -{0} option")]
    ArgumentExpected(char),

    #[error("not enough arguments")]
    NotEnoughArguments,

    #[error("empty or illegal long option spec: {0}")]
    InvalidSpec(String),

    #[error("not an identifier: {0}")]
    NotAnIdentifier(String),

    #[error("cannot assign to {name}: {reason}")]
    Assign { name: String, reason: String },

    #[error("unmatched quote in {0}")]
    UnmatchedQuote(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GetoptxError>;
