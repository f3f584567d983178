use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// Cloneable handle to the application instance shared by both timelines.
///
/// Locking is coarse: a callback holds the lock for its whole invocation and
/// releases it on return. There is no read/write split and no reentrancy; locking
/// twice from the same thread deadlocks.
pub struct SharedState<A> {
    inner: Arc<Mutex<A>>,
}

impl<A> SharedState<A> {
    pub fn new(app: A) -> Self {
        Self {
            inner: Arc::new(Mutex::new(app)),
        }
    }

    /// Blocks until the domain is free.
    pub fn lock(&self) -> MutexGuard<'_, A> {
        self.inner.lock()
    }

    /// Runs `f` with exclusive access to the application.
    pub fn with<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Like [`with`](Self::with) but returns `None` instead of waiting.
    pub fn try_with<R>(&self, f: impl FnOnce(&mut A) -> R) -> Option<R> {
        let mut guard = self.inner.try_lock()?;
        Some(f(&mut guard))
    }

    /// Unwraps the application if this is the last handle.
    pub fn try_into_inner(self) -> Result<A, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<A> Clone for SharedState<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
