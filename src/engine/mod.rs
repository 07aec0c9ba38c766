//! Scoring engine subprocess management
//!
//! The similarity scores come from an external engine process (a CLIP-style
//! model runner) that indexes the candidate images once at launch and then
//! answers query batches over its stdin/stdout for as long as it runs.
//!
//! Architecture:
//! - `session`: lifecycle state machine that owns the process and its pipes
//! - `protocol`: the line-oriented wire contract (requests in, JSON scores out)
//!
//! The engine is opaque: nothing here depends on how it scores, only on the
//! launch contract and the wire contract. Tests substitute a fake engine
//! with the same contract.

pub mod protocol;
pub mod session;

pub use protocol::{ProtocolError, ScoreMap};
pub use session::{EngineError, EngineResult, EngineSession};

use std::path::PathBuf;
use std::time::Duration;

/// Flag that keeps the engine alive to answer repeated queries over one index
pub const INTERACTIVE_FLAG: &str = "--interactive";

/// Default bound on the wait for a single engine response
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the engine command
pub const ENGINE_ENV: &str = "FIM_ENGINE";

/// How the engine is launched and how long to wait for its answers.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments that precede the interactive flag (a script path, usually)
    pub args: Vec<String>,
    /// Directory the engine runs in; candidate identifiers resolve here
    pub working_dir: PathBuf,
    /// Bound on the wait for each query response
    pub query_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./venv/bin/python"),
            args: vec!["search.py".to_string()],
            working_dir: PathBuf::from("."),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Build a config from an optional command override such as
    /// `"python3 search.py"`, falling back to the `FIM_ENGINE` environment
    /// variable and then to the bundled default.
    pub fn from_command(
        command: Option<String>,
        query_timeout: Duration,
        working_dir: PathBuf,
    ) -> Self {
        let mut config = Self {
            query_timeout,
            working_dir,
            ..Self::default()
        };

        let command = command.or_else(|| std::env::var(ENGINE_ENV).ok());
        if let Some(command) = command {
            let mut parts = command.split_whitespace();
            if let Some(program) = parts.next() {
                config.program = PathBuf::from(program);
                config.args = parts.map(str::to_string).collect();
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_splits_program_and_args() {
        let config = EngineConfig::from_command(
            Some("python3 search.py --device cpu".to_string()),
            Duration::from_secs(5),
            PathBuf::from("/tmp"),
        );
        assert_eq!(config.program, PathBuf::from("python3"));
        assert_eq!(config.args, vec!["search.py", "--device", "cpu"]);
        assert_eq!(config.query_timeout, Duration::from_secs(5));
        assert_eq!(config.working_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn test_from_command_empty_override_keeps_default() {
        let config = EngineConfig::from_command(
            Some("   ".to_string()),
            DEFAULT_QUERY_TIMEOUT,
            PathBuf::from("."),
        );
        assert_eq!(config.program, EngineConfig::default().program);
        assert_eq!(config.args, EngineConfig::default().args);
    }
}
