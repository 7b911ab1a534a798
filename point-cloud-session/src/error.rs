use point_cloud_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("load {ticket} was superseded by load {current}")]
    Superseded { ticket: u64, current: u64 },

    #[error("session driver thread could not be started: {0}")]
    Driver(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
