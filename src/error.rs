use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Standard output is not attached to a terminal we can draw into.
    #[error("no terminal attached to draw into")]
    NoSurface,
    #[error("viewport {width}x{height} has no area")]
    EmptyViewport { width: usize, height: usize },
    #[error("terminal I/O failed")]
    Io(#[from] std::io::Error),
}

/// Error used by the [`std::str::FromStr`] implementation of [`crate::color::Color`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("unrecognized color `{0}`")]
    Unknown(String),
    #[error("malformed hex color `{0}`, expected 6 hex digits")]
    MalformedHex(String),
    #[error("malformed hsl() color `{0}`, expected `hsl(h, s%, l%)`")]
    MalformedHsl(String),
}
