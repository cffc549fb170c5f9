//! Command classification labels and the interpreter's result type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the assistant decided a transcript was asking for.
///
/// Persisted in history records as the snake_case label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    PlayMedia,
    SearchMedia,
    TellTime,
    SearchWeb,
    LookupSummary,
    ShowHelp,
    Unrecognized,
}

impl Classification {
    pub const ALL: [Classification; 7] = [
        Self::PlayMedia,
        Self::SearchMedia,
        Self::TellTime,
        Self::SearchWeb,
        Self::LookupSummary,
        Self::ShowHelp,
        Self::Unrecognized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayMedia => "play_media",
            Self::SearchMedia => "search_media",
            Self::TellTime => "tell_time",
            Self::SearchWeb => "search_web",
            Self::LookupSummary => "lookup_summary",
            Self::ShowHelp => "show_help",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown classification: {0}")]
pub struct UnknownClassification(pub String);

impl FromStr for Classification {
    type Err = UnknownClassification;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownClassification(s.to_owned()))
    }
}

/// Outcome of interpreting one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    pub classification: Classification,
    pub response: String,
}
