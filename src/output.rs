//! Line-oriented output buffer shared between a munge job and its observer.
//!
//! The job appends tool output as it arrives while the observer polls for the
//! lines written so far. Writes land in a pending list; a view moves the
//! pending lines into the visible list when it can take the pending lock
//! without waiting, otherwise it returns the previous snapshot unchanged.

use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

/// Thread-safe, append-only buffer of output lines.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    pending: Mutex<Vec<Arc<str>>>,
    visible: Mutex<Vec<Arc<str>>>,
}

/// Read-only view over the visible lines of an [`OutputBuffer`].
///
/// The view holds the visible list locked for as long as it lives, so keep
/// it short-lived.
pub struct LinesView<'a> {
    lines: MutexGuard<'a, Vec<Arc<str>>>,
}

impl Deref for LinesView<'_> {
    type Target = [Arc<str>];

    fn deref(&self) -> &[Arc<str>] {
        &self.lines
    }
}

impl std::fmt::Debug for LinesView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.lines.iter()).finish()
    }
}

impl OutputBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text, split on line breaks.
    ///
    /// A trailing line break does not produce an empty line. Empty text is
    /// ignored.
    pub fn write(&self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            return;
        }

        let lines: Vec<Arc<str>> = text.lines().map(Arc::from).collect();
        lock(&self.pending).extend(lines);
    }

    /// View every line made visible so far.
    ///
    /// Pending writes are folded in first unless a writer currently holds the
    /// pending list, in which case they show up on a later call.
    pub fn view_lines(&self) -> LinesView<'_> {
        let mut visible = lock(&self.visible);

        match self.pending.try_lock() {
            Ok(mut pending) => visible.append(&mut pending),
            Err(TryLockError::Poisoned(poisoned)) => visible.append(&mut poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => {}
        }

        LinesView { lines: visible }
    }

    /// Drop every line, pending or visible.
    pub fn clear(&self) {
        let mut visible = lock(&self.visible);
        let mut pending = lock(&self.pending);
        visible.clear();
        pending.clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
