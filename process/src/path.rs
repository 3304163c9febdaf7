//! Path resolution for the working directory.
//!
//! The process only needs one operation from the path layer: resolve a
//! possibly-relative target against the current directory. The path layer in
//! turn needs the process for its own `resolve`, so the resolver is reached
//! through [`LazyResolver`], which can be injected up front or acquired on the
//! first `chdir`.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::{Mutex, Once};

use crate::ProcessError;

// ─── Normalization ─────────────────────────────────────────────────

/// Returns true if `path` starts at the root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Normalize a path to absolute form.
///
/// Collapses repeated slashes, drops `.` segments and applies `..` segments.
/// `..` at the root stays at the root.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
    if parts.is_empty() {
        return String::from("/");
    }
    let mut out = String::with_capacity(path.len() + 1);
    for part in parts {
        out.push('/');
        out.push_str(part);
    }
    out
}

// ─── Resolver ──────────────────────────────────────────────────────

/// Resolves a target path against a working directory.
pub trait PathResolver: Send + Sync {
    /// Return the normalized absolute form of `path` as seen from `cwd`.
    fn resolve(&self, cwd: &str, path: &str) -> String;
}

/// POSIX-style resolver: absolute targets replace `cwd`, relative ones are
/// appended to it. Never touches a filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixPathResolver;

impl PathResolver for PosixPathResolver {
    fn resolve(&self, cwd: &str, path: &str) -> String {
        if is_absolute(path) {
            normalize(path)
        } else {
            normalize(&alloc::format!("{}/{}", cwd, path))
        }
    }
}

// ─── Installed resolver slot ───────────────────────────────────────

static INSTALLED: Mutex<Option<Arc<dyn PathResolver>>> = Mutex::new(None);

/// Install the process-wide resolver, returning the previous one.
///
/// This is the second phase of startup: the path layer registers itself
/// once it exists, and processes built with [`LazyResolver::from_installed`]
/// pick it up on their first `chdir`.
pub fn install(resolver: Arc<dyn PathResolver>) -> Option<Arc<dyn PathResolver>> {
    log::debug!("[KPIO Process] Installing path resolver");
    INSTALLED.lock().replace(resolver)
}

/// Fetch the installed resolver.
pub fn installed() -> Result<Arc<dyn PathResolver>, ProcessError> {
    INSTALLED
        .lock()
        .clone()
        .ok_or_else(|| ProcessError::ResolverUnavailable(String::from("no resolver installed")))
}

// ─── Deferred reference ────────────────────────────────────────────

type ResolverProvider = Box<dyn Fn() -> Result<Arc<dyn PathResolver>, ProcessError> + Send + Sync>;

/// A resolver reference that is either ready or acquired on first use.
///
/// Once acquired, the resolver is cached for the lifetime of the cell. A
/// failed acquisition caches nothing, so the next `get` tries again.
pub struct LazyResolver {
    cell: Once<Arc<dyn PathResolver>>,
    provider: Option<ResolverProvider>,
}

impl LazyResolver {
    /// A cell that already holds `resolver`.
    pub fn ready(resolver: Arc<dyn PathResolver>) -> Self {
        Self {
            cell: Once::initialized(resolver),
            provider: None,
        }
    }

    /// A cell filled by calling `provider` on first use.
    pub fn deferred<F>(provider: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn PathResolver>, ProcessError> + Send + Sync + 'static,
    {
        Self {
            cell: Once::new(),
            provider: Some(Box::new(provider)),
        }
    }

    /// A cell filled from the installed resolver slot on first use.
    pub fn from_installed() -> Self {
        Self::deferred(installed)
    }

    /// Whether the resolver has been acquired.
    pub fn is_resolved(&self) -> bool {
        self.cell.is_completed()
    }

    /// Get the resolver, acquiring it if needed.
    pub fn get(&self) -> Result<&Arc<dyn PathResolver>, ProcessError> {
        if let Some(resolver) = self.cell.get() {
            return Ok(resolver);
        }
        let provider = self.provider.as_ref().ok_or_else(|| {
            ProcessError::ResolverUnavailable(String::from("no resolver provider"))
        })?;
        let resolver = provider()?;
        Ok(self.cell.call_once(|| resolver))
    }
}

impl Default for LazyResolver {
    fn default() -> Self {
        Self::ready(Arc::new(PosixPathResolver))
    }
}

impl core::fmt::Debug for LazyResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazyResolver")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────
