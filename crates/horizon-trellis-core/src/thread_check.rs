//! UI-thread affinity for the view engine.
//!
//! Every view tree mutation, layout pass, paint and event dispatch happens on a
//! single designated UI thread. This module records which thread that is and
//! offers the checks the engine uses to decide whether an entry point may run
//! directly or has to be re-posted through a [`UiQueue`](crate::dispatch::UiQueue).
//!
//! ```
//! use horizon_trellis_core::thread_check::{self, ThreadAffinity};
//!
//! thread_check::set_ui_thread();
//! assert!(thread_check::is_ui_thread());
//!
//! let affinity = ThreadAffinity::ui_thread();
//! assert!(affinity.is_same_thread());
//! ```
//!
//! Entry points that must never run elsewhere call
//! [`ThreadAffinity::check_same_thread`], which panics in debug builds (or
//! whenever [`set_thread_checks_enabled`] turned the checks on).

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

static UI_THREAD_ID: OnceLock<ThreadId> = OnceLock::new();

static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Register the calling thread as the UI thread.
///
/// Calling this again from the same thread is harmless.
///
/// # Panics
///
/// Panics if a different thread has already been registered.
pub fn set_ui_thread() {
    let current = std::thread::current().id();
    match UI_THREAD_ID.set(current) {
        Ok(()) => crate::trellis_debug!(thread = ?current, "registered ui thread"),
        Err(_) if UI_THREAD_ID.get() == Some(&current) => {}
        Err(_) => panic!(
            "set_ui_thread() called from a second thread; \
             the UI thread can only be registered once"
        ),
    }
}

/// The registered UI thread, if any.
#[inline]
pub fn ui_thread_id() -> Option<ThreadId> {
    UI_THREAD_ID.get().copied()
}

/// Whether the calling thread is the UI thread.
///
/// Before any thread has been registered every thread counts as the UI thread,
/// so single-threaded hosts and tests never need to call [`set_ui_thread`].
#[inline]
pub fn is_ui_thread() -> bool {
    match UI_THREAD_ID.get() {
        Some(&ui) => std::thread::current().id() == ui,
        None => true,
    }
}

/// Enable or disable the runtime checks performed by [`ThreadAffinity`].
///
/// Checks default to on in debug builds and off in release builds.
pub fn set_thread_checks_enabled(enabled: bool) {
    crate::trellis_info!(enabled, "thread affinity checks toggled");
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Whether runtime thread checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// The thread a view tree (or any other UI-bound object) belongs to.
///
/// # Example
///
/// ```
/// use horizon_trellis_core::thread_check::ThreadAffinity;
///
/// let affinity = ThreadAffinity::current();
/// assert!(affinity.is_same_thread());
///
/// let other = std::thread::spawn(move || affinity.is_same_thread())
///     .join()
///     .unwrap();
/// assert!(!other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::ui_thread()
    }
}

impl ThreadAffinity {
    /// Affinity for the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Affinity for the registered UI thread, or the calling thread when none
    /// has been registered yet.
    pub fn ui_thread() -> Self {
        Self {
            thread_id: ui_thread_id().unwrap_or_else(|| std::thread::current().id()),
        }
    }

    /// The bound thread.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Whether the calling thread is the bound thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panic if called from another thread while checks are enabled.
    pub fn check_same_thread(&self, what: &str) {
        if are_thread_checks_enabled() && !self.is_same_thread() {
            self.panic_wrong_thread(what);
        }
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, what: &str) -> ! {
        let current = std::thread::current();
        crate::trellis_error!(bound = ?self.thread_id, called_from = ?current.id(), "{what}");
        panic!(
            "THREAD AFFINITY VIOLATION: {what}\n\
             bound to thread {:?}, called from \"{}\" ({:?})",
            self.thread_id,
            current.name().unwrap_or("<unnamed>"),
            current.id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.check_same_thread("tree");
    }

    #[test]
    fn test_affinity_from_other_thread() {
        let affinity = ThreadAffinity::current();
        let seen = Arc::new(AtomicBool::new(false));
        let seen_clone = seen.clone();

        std::thread::spawn(move || {
            seen_clone.store(!affinity.is_same_thread(), Ordering::SeqCst);
        })
        .join()
        .unwrap();

        assert!(seen.load(Ordering::SeqCst));
    }

    #[test]
    fn test_check_same_thread_respects_switch() {
        let original = are_thread_checks_enabled();
        let affinity = ThreadAffinity::current();

        set_thread_checks_enabled(true);
        let loud = std::thread::spawn(move || affinity.check_same_thread("tree")).join();
        assert!(loud.is_err());

        set_thread_checks_enabled(false);
        let quiet = std::thread::spawn(move || affinity.check_same_thread("tree")).join();
        assert!(quiet.is_ok());

        set_thread_checks_enabled(original);
    }

    #[test]
    fn test_affinity_equality() {
        let a = ThreadAffinity::current();
        let b = a;
        assert_eq!(a, b);
        assert_eq!(a.thread_id(), std::thread::current().id());
    }
}
