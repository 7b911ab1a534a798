/// Error types for LAS/LAZ ingestion.
///
/// Format and decompression errors are fatal: the caller never sees a
/// partially decoded header or point buffer alongside one of these.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IngestError {
    /// The first four bytes are not `LASF`.
    #[error("Invalid LAS signature: expected \"LASF\", found {found:?}")]
    InvalidSignature { found: String },

    /// A fixed-offset field lies past the end of the buffer.
    #[error("Truncated buffer: {field} needs {needed} bytes at offset {offset}, buffer is {len} bytes")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// A compressed payload without the laszip variable length record.
    #[error("LAZ file has no laszip VLR")]
    LaszipVlrMissing,

    /// The decompression engine refused to open or decode the stream.
    #[error("LAZ decompression failed: {0}")]
    Decompression(String),

    /// Failed to read the input file.
    #[error("Failed to read point cloud file")]
    Io(#[from] std::io::Error),

    /// The background decode thread panicked.
    #[error("Decode worker panicked: {0}")]
    WorkerPanicked(String),
}

impl From<::laz::LasZipError> for IngestError {
    fn from(err: ::laz::LasZipError) -> Self {
        IngestError::Decompression(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
