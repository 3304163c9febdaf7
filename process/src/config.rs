//! Process configuration.

use alloc::string::String;
use alloc::vec::Vec;

/// Platform identity reported by default.
pub const DEFAULT_PLATFORM: &str = "browser";

/// Working directory a new process starts in.
pub const ROOT_DIR: &str = "/";

/// Construction-time settings for a [`Process`](crate::Process).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Platform string reported by `Process::platform`.
    pub platform: String,
    /// Starting working directory. Normalized at construction.
    pub initial_cwd: String,
    /// Initial invocation arguments.
    pub argv: Vec<String>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        ProcessConfig {
            platform: String::from(DEFAULT_PLATFORM),
            initial_cwd: String::from(ROOT_DIR),
            argv: Vec::new(),
        }
    }
}
