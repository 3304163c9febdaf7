//! The process-wide instance.
//!
//! There is exactly one of these per running application. It is set once at
//! startup with [`init`] and never torn down. Code that wants isolation, tests
//! in particular, builds its own [`Process`] instead.

use spin::Once;

use crate::{Process, ProcessError};

static PROCESS: Once<Process> = Once::new();

/// Install `process` as the process-wide instance.
///
/// Fails with [`ProcessError::AlreadyInitialized`] if an instance exists;
/// `process` is dropped in that case.
pub fn init(process: Process) -> Result<&'static Process, ProcessError> {
    let mut installed = false;
    let current = PROCESS.call_once(|| {
        installed = true;
        process
    });
    if installed {
        log::debug!("[KPIO Process] Process-wide instance initialized");
        Ok(current)
    } else {
        Err(ProcessError::AlreadyInitialized)
    }
}

/// The process-wide instance, if initialized.
pub fn get() -> Result<&'static Process, ProcessError> {
    PROCESS.get().ok_or(ProcessError::NotInitialized)
}

/// Whether [`init`] has run.
pub fn is_initialized() -> bool {
    PROCESS.is_completed()
}

/// The process-wide instance, created with defaults on first access.
#[cfg(feature = "std")]
pub fn current() -> &'static Process {
    PROCESS.call_once(|| {
        log::debug!("[KPIO Process] Process-wide instance initialized with defaults");
        Process::new()
    })
}
