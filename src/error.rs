// Error type for the logo effect. Every variant states *where* things went wrong.
// Most of these never reach main: the effect logs them and degrades to
// "nothing rendered" instead.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Bitmap failed to load or decode (recovered by the text fallback).
    #[error("logo decode error: {0}")]
    Decode(String),

    /// Creating the window / render context failed.
    #[error("context init error: {0}")]
    ContextInit(String),

    /// Updating the window buffer failed.
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// Container or artwork has zero area; sampling must be retried later.
    #[error("zero dimensions: {0}")]
    ZeroDimensions(String),

    /// Config file missing or malformed.
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
