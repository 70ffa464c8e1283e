//! Error types shared by the page generator and the import rewriter.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("repository '{0}' should be in the form github.com/user/project")]
    InvalidRepository(String),

    #[error("invalid import suffix '{0}'")]
    InvalidSuffix(String),

    #[error("domain is missing (manifest or flag)")]
    MissingDomain,

    #[error("invalid rewrite rule: {0}")]
    InvalidRule(String),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to parse manifest {}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid exclude pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to load Go grammar")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("generate {suffix}")]
    Entry {
        suffix: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns `true` for errors raised before any filesystem access.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::InvalidRepository(_)
            | Self::InvalidSuffix(_)
            | Self::MissingDomain
            | Self::InvalidRule(_) => true,
            Self::Entry { source, .. } => source.is_validation(),
            _ => false,
        }
    }
}
