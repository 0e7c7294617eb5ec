use thiserror::Error;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable document: {0}")]
    UnreadableDocument(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("remote store unavailable ({0}); the batch was not applied, try again later")]
    Transport(String),

    #[error("the store rejected the batch with {0} field error(s)")]
    RemoteValidation(usize),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_yaml::Error> for RosterError {
    fn from(e: serde_yaml::Error) -> Self {
        RosterError::Config(e.to_string())
    }
}
