//! Script generators: new scripts from a URL, and k6 source from a script.

pub mod http;
pub mod k6;

/// Errors raised while generating a script.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The URL is not a syntactically valid absolute URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
