//! One-pass sequence cursors for the dmatch matcher.
//!
//! A `Stream` wraps a forward-only iterator behind a shared handle so a
//! "continue from here" view can be captured mid-match and bound to an
//! open trailing splat without draining the source.

use crate::value::Value;
use parking_lot::Mutex;
use std::sync::Arc;

/// A cloneable handle over a shared one-pass sequence of values.
///
/// All clones of a handle advance the same underlying cursor: binding an
/// open trailing splat hands the remaining elements to the binding, and
/// the original holder must not keep pulling. This is an ownership
/// transfer by convention, enforced by the one-pass nature of the source
/// rather than the type system.
#[derive(Clone)]
pub struct Stream {
    inner: Arc<Mutex<Box<dyn Iterator<Item = Value> + Send>>>,
}

impl Stream {
    /// Wrap an iterator as a one-pass stream.
    ///
    /// The iterator is fused so a misbehaving source cannot yield again
    /// after reporting end-of-sequence.
    pub fn new<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Box::new(iter.into_iter().fuse()))),
        }
    }

    /// Pull the next element, or `None` at end-of-sequence
    pub fn pull(&self) -> Option<Value> {
        self.inner.lock().next()
    }

    /// A new cursor view starting at the current position.
    ///
    /// The view shares the underlying cursor; advancing it advances the
    /// source. Used to bind open trailing splats.
    pub fn resume_from_here(&self) -> Stream {
        Stream {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Stable identity of the underlying cursor, shared by all views
    pub(crate) fn handle_id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl Iterator for Stream {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.pull()
    }
}

// Streams compare by handle identity: two handles are equal only if they
// view the same underlying cursor
impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}
