//! KPIO Process
//!
//! Virtual process state for sandboxed filesystem emulation. Code running on
//! top of the KPIO VFS expects a conventional process around it: a working
//! directory, an uptime, a platform name, invocation arguments and stdio. This
//! crate provides exactly that and nothing more. There is no spawning, no
//! signals, no environment and no exit codes.
//!
//! # Architecture
//!
//! - `process`: the [`Process`] record (`chdir`, `cwd`, `uptime`, `argv`, stdio)
//! - `global`: the single process-wide instance (`init` / `get`)
//! - `path`: path normalization and the lazily acquired [`PathResolver`]
//! - `stream`: loopback [`DuplexStream`] with data/end/error events
//! - `clock`: millisecond time sources for uptime
//! - `config`: [`ProcessConfig`] construction-time settings

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod clock;
pub mod config;
pub mod error;
pub mod global;
pub mod path;
pub mod process;
pub mod stream;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock};
#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use config::ProcessConfig;
pub use error::ProcessError;
pub use path::{LazyResolver, PathResolver, PosixPathResolver};
pub use process::{Process, ProcessBuilder};
pub use stream::{DuplexStream, EventKind, StreamError, StreamEvent, StreamFactory};
