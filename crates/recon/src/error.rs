use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, bad column mapping, etc.).
    ConfigValidation(String),
    /// Fewer sources than a comparison needs.
    TooFewSources { found: usize },
    /// A source was supplied with an empty label.
    UnlabeledSource { position: usize },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::TooFewSources { found } => {
                write!(f, "at least 2 sources are required, found {found}")
            }
            Self::UnlabeledSource { position } => {
                write!(f, "source #{} has an empty label", position + 1)
            }
        }
    }
}

impl std::error::Error for ReconError {}
