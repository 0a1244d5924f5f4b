use std::path::PathBuf;

use thiserror::Error;

use crate::negotiate::SurfaceProfile;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Framebuffer negotiation failure.
///
/// Always a configuration error: there is no safe default to fall back to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("platform offered no framebuffer configurations")]
    NoConfigs,

    #[error(
        "no framebuffer configuration matches {requested} \
         ({eligible} of {offered} met the depth/stencil/sample minimums)"
    )]
    NoMatchingConfig {
        requested: SurfaceProfile,
        offered: usize,
        eligible: usize,
    },
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("surface configuration error: {0}")]
    Configuration(#[from] NegotiationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
