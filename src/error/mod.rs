use std::fmt;

use crate::archive::ArchiveError;
use crate::keymap::KeyMapError;
use crate::parser::ParseError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    KeyMap(#[from] KeyMapError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("failed to list themes matching {pattern}: {message}")]
    Discovery { pattern: String, message: String },
}

impl AppError {
    /// True for failures caused by the source theme itself.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

/// Which static table a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    Theme,
    Transparency,
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Theme => f.write_str("theme map"),
            Self::Transparency => f.write_str("transparency map"),
        }
    }
}

/// Non-fatal conditions. They never abort a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    UnknownKey { map: MapKind, key: String },
    IgnoredTransparency { key: String },
    InvalidTransparency { key: String, value: String },
    UnmappedKey { desktop_key: String, source_key: String },
    MissingBackground,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey { map, key } => write!(f, "unknown key in {map}: {key}"),
            Self::IgnoredTransparency { key } => write!(
                f,
                "transparency for {key} key will be ignored; add it to the theme map or remove it from the transparency map"
            ),
            Self::InvalidTransparency { key, value } => {
                write!(f, "invalid transparency value: {key}={value}")
            }
            Self::UnmappedKey {
                desktop_key,
                source_key,
            } => write!(
                f,
                "missing {source_key} key in source theme; {desktop_key} left unset"
            ),
            Self::MissingBackground => f.write_str("missing background in source theme"),
        }
    }
}

/// A value together with the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosed<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Diagnosed<T> {
    pub fn new(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    /// Emits every warning through `tracing` and returns the bare value.
    pub fn log_warnings(self, context: &str) -> T {
        for warning in &self.warnings {
            tracing::warn!(context = %context, "{warning}");
        }
        self.value
    }
}
