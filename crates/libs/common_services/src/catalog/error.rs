use common_types::ImageAssetError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("catalog file {path} is not a valid garment list: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("garment {0} not found")]
    NotFound(String),

    #[error("garment image {0} is outside the image folder")]
    InvalidImagePath(String),

    #[error("could not fetch garment image: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("could not read garment image {path}: {source}")]
    ImageIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Image(#[from] ImageAssetError),
}
