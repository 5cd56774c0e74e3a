use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading a `.structure` template file. These files are
/// static assets, so any defect is fatal at startup.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("unable to read structure file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("structure file {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("structure file {path} references unknown block id {id}")]
    UnknownBlock { path: PathBuf, id: u8 },

    #[error("structure directory {path} contains no .structure files")]
    EmptyDirectory { path: PathBuf },
}

/// Top-level error for world construction.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("structure loading failed")]
    Structure(#[from] StructureError),
}
