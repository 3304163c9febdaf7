//! Error types for the process state.

use alloc::string::String;
use core::fmt;

/// Errors surfaced by [`Process`](crate::Process) and the global instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The path resolver could not be acquired.
    ResolverUnavailable(String),
    /// The process-wide instance was already initialized.
    AlreadyInitialized,
    /// The process-wide instance has not been initialized yet.
    NotInitialized,
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::ResolverUnavailable(msg) => {
                write!(f, "path resolver unavailable: {}", msg)
            }
            ProcessError::AlreadyInitialized => write!(f, "process already initialized"),
            ProcessError::NotInitialized => write!(f, "process not initialized"),
        }
    }
}
