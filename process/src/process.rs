//! The process state record.
//!
//! A [`Process`] holds the handful of process-like facts that filesystem
//! emulation code expects from its host: working directory, uptime, platform,
//! arguments and the three stdio streams. Nothing here touches a real
//! filesystem; `chdir` accepts any path.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::{Mutex, RwLock};

use crate::clock::Clock;
use crate::config::ProcessConfig;
use crate::path::{self, LazyResolver, PathResolver};
use crate::stream::{DuplexStream, LoopbackStreamFactory, StreamFactory};
use crate::ProcessError;

/// Process-like state for a sandboxed environment.
pub struct Process {
    start_ms: u64,
    cwd: RwLock<String>,
    platform: String,
    argv: Mutex<Vec<String>>,
    stdout: Arc<DuplexStream>,
    stderr: Arc<DuplexStream>,
    stdin: Arc<DuplexStream>,
    clock: Arc<dyn Clock>,
    resolver: LazyResolver,
}

impl Process {
    /// Start building a process around `clock`.
    pub fn builder(clock: Arc<dyn Clock>) -> ProcessBuilder {
        ProcessBuilder::new(clock)
    }

    /// Build a process with default settings, timed by `SystemClock`.
    #[cfg(feature = "std")]
    pub fn new() -> Self {
        ProcessBuilder::new(Arc::new(crate::clock::SystemClock::new())).build()
    }

    /// Change the working directory.
    ///
    /// `dir` may be absolute or relative to the current directory. The target
    /// is never checked for existence. The resolver's answer is normalized
    /// before it is stored. If the resolver cannot be acquired the error is
    /// returned and the directory is unchanged.
    pub fn chdir(&self, dir: &str) -> Result<(), ProcessError> {
        let resolver = self.resolver.get().map_err(|e| {
            log::warn!("[KPIO Process] chdir({}) failed: {}", dir, e);
            e
        })?;
        // The resolver may read `cwd` itself, so no lock is held across it.
        let current = self.cwd();
        let next = path::normalize(&resolver.resolve(&current, dir));
        log::trace!("[KPIO Process] chdir {} -> {}", current, next);
        *self.cwd.write() = next;
        Ok(())
    }

    /// Current working directory.
    pub fn cwd(&self) -> String {
        self.cwd.read().clone()
    }

    /// Whole seconds since construction, truncated.
    pub fn uptime(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.start_ms) / 1000
    }

    /// Clock reading captured at construction.
    pub fn start_time_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Snapshot of the invocation arguments.
    pub fn argv(&self) -> Vec<String> {
        self.argv.lock().clone()
    }

    /// Replace the invocation arguments.
    pub fn set_argv(&self, argv: Vec<String>) {
        *self.argv.lock() = argv;
    }

    /// Append one argument.
    pub fn push_arg(&self, arg: impl Into<String>) {
        self.argv.lock().push(arg.into());
    }

    /// Run `f` with mutable access to the arguments.
    pub fn with_argv_mut<R>(&self, f: impl FnOnce(&mut Vec<String>) -> R) -> R {
        f(&mut self.argv.lock())
    }

    pub fn stdout(&self) -> &Arc<DuplexStream> {
        &self.stdout
    }

    pub fn stderr(&self) -> &Arc<DuplexStream> {
        &self.stderr
    }

    pub fn stdin(&self) -> &Arc<DuplexStream> {
        &self.stdin
    }
}

impl core::fmt::Debug for Process {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Process")
            .field("cwd", &*self.cwd.read())
            .field("platform", &self.platform)
            .field("argv", &*self.argv.lock())
            .field("start_ms", &self.start_ms)
            .field("resolver", &self.resolver)
            .finish()
    }
}

#[cfg(feature = "std")]
impl Default for Process {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Wires configuration and collaborators into a [`Process`].
///
/// Defaults: [`ProcessConfig::default`], a [`PosixPathResolver`] injected up
/// front, and loopback stdio streams.
///
/// [`PosixPathResolver`]: crate::path::PosixPathResolver
pub struct ProcessBuilder {
    clock: Arc<dyn Clock>,
    config: ProcessConfig,
    resolver: LazyResolver,
    streams: Arc<dyn StreamFactory>,
}

impl ProcessBuilder {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            config: ProcessConfig::default(),
            resolver: LazyResolver::default(),
            streams: Arc::new(LoopbackStreamFactory),
        }
    }

    pub fn config(mut self, config: ProcessConfig) -> Self {
        self.config = config;
        self
    }

    /// Inject a resolver at construction.
    pub fn resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = LazyResolver::ready(resolver);
        self
    }

    /// Acquire the resolver on the first `chdir`.
    pub fn lazy_resolver(mut self, resolver: LazyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn stream_factory(mut self, streams: Arc<dyn StreamFactory>) -> Self {
        self.streams = streams;
        self
    }

    pub fn build(self) -> Process {
        let ProcessConfig {
            platform,
            initial_cwd,
            argv,
        } = self.config;
        let cwd = path::normalize(&initial_cwd);
        log::debug!(
            "[KPIO Process] Creating process (platform={}, cwd={})",
            platform,
            cwd
        );
        Process {
            start_ms: self.clock.now_ms(),
            cwd: RwLock::new(cwd),
            platform,
            argv: Mutex::new(argv),
            stdout: self.streams.create(true, true),
            stderr: self.streams.create(true, true),
            stdin: self.streams.create(true, true),
            clock: self.clock,
            resolver: self.resolver,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
