use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    SourceNotFound(PathBuf),
    SourceMalformed(String),
    StoreCorrupt(String),
    Provider(String),
    EmptyDesiredSet,
    Config(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SourceNotFound(path) => write!(f, "Source file not found: {}", path.display()),
            Error::SourceMalformed(msg) => write!(f, "Source file unreadable: {msg}"),
            Error::StoreCorrupt(msg) => write!(f, "Record store corrupt: {msg}"),
            Error::Provider(msg) => write!(f, "Provider error: {msg}"),
            Error::EmptyDesiredSet => write!(
                f,
                "Desired IP set is empty; refusing to delete all records without --allow-empty"
            ),
            Error::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}
