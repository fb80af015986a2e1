use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Host-side configuration mistakes. These are the only fatal conditions in the
/// core; everything else degrades to a defined default.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid canvas size {width}x{height}: both dimensions must be positive")]
    InvalidDimensions { width: usize, height: usize },

    #[error("entity pool capacity must be at least 1")]
    InvalidCapacity,

    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    #[error("unknown palette: {0}")]
    UnknownPalette(String),

    #[error("invalid color {0:?}: expected six hex digits like ff8000")]
    InvalidColor(String),
}
