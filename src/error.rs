use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid setting `{name}`: {reason}")]
    Setting {
        name: &'static str,
        reason: &'static str,
    },

    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to load mesh {path}: {source}")]
    Mesh {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("malformed node {node}: {reason}")]
    InvalidNode { node: u32, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
