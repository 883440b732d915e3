//! Progress reporting and cooperative cancellation for long-running operations.
//!
//! ```
//! use quadro::prelude::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//!     true // keep going
//! });
//! assert!(progress.report(1, 10, "matching").is_ok());
//!
//! let cancel = Progress::cancel_after(0);
//! assert!(cancel.report(1, 10, "matching").is_err());
//! ```

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::error::MeshingError;

/// A progress callback polled at fixed work boundaries.
///
/// The callback receives:
/// - `current`: Current step
/// - `total`: Total number of steps (0 if unknown)
/// - `message`: Description of the current operation
///
/// and returns `false` to request cancellation.
/// Clones share the same callback, so a pipeline can hand it to each of its stages.
#[derive(Clone)]
pub struct Progress {
    callback: Arc<dyn Fn(usize, usize, &str) -> bool + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Report progress.
    /// Returns `MeshingError::Cancelled` when the callback asks to stop.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) -> anyhow::Result<()> {
        if (self.callback)(current, total, message) {
            Ok(())
        } else {
            Err(MeshingError::Cancelled.into())
        }
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| true)
    }

    /// Create a progress reporter forwarding updates to the `log` facade.
    #[cfg(feature = "log")]
    pub fn logging() -> Self {
        Self::new(|current, total, message| {
            log::info!("{}: {}/{}", message, current, total);
            true
        })
    }

    /// Create a progress reporter that cancels once it has been polled more than `n` times.
    pub fn cancel_after(n: usize) -> Self {
        let polls = AtomicUsize::new(0);
        Self::new(move |_, _, _| polls.fetch_add(1, Ordering::Relaxed) < n)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
