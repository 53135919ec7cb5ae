use std::io;
use std::path::PathBuf;

/// Failure to build a [`Lexicon`](crate::Lexicon) from its source.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("dictionary file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("error reading dictionary file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading dictionary source: {0}")]
    Read(#[from] io::Error),

    #[error("failed to build headword index: {0}")]
    Index(#[from] fst::Error),
}

impl LoadError {
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound { path },
            _ => LoadError::Io { path, source },
        }
    }
}
