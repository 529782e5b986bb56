//! Failures of the `flowfield` binary and the exit code each one maps to.
//!
//! | code | meaning |
//! |------|---------|
//! | 2    | argument parsing (reported by clap) |
//! | 10   | the preset could not be built or run |
//! | 11   | filesystem trouble with scenes, frame folders or PNGs |
//! | 12   | a flag value or scene file that does not parse |
//! | 13   | the `--json` report could not be encoded |

use flowfield_core::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Unknown preset, params rejected by validation, or a zero-sized or
    /// oversized surface.
    #[error(transparent)]
    Engine(EngineError),
    /// Scene file unreadable, `--out-dir` not creatable, PNG not written.
    #[error("{0}")]
    Io(String),
    /// Malformed `--params`, `--background` or `--every`, an unknown
    /// palette, or a scene file missing required fields.
    #[error("{0}")]
    Input(String),
    /// Encoding the `--json` summary failed.
    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    /// Process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// `EngineError::Io` (PNG writes) maps to the filesystem exit code.
impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            other => CliError::Engine(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
