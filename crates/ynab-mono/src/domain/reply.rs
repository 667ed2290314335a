use std::{fmt, sync::Arc};

use parking_lot::Mutex;

/// Single-assignment slot through which the claiming handler of a
/// value-producing event hands its result back to the caller.
///
/// Clones share the same slot. The first `set` wins; later ones are rejected
/// and get their value back.
pub struct Reply<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Reply<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set(&self, value: T) -> Result<(), T> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(value);
        }
        *slot = Some(value);
        Ok(())
    }

    pub fn take(&self) -> Option<T> {
        self.slot.lock().take()
    }

    pub fn is_set(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl<T> Default for Reply<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Reply<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for Reply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_set() { "set" } else { "empty" };
        write!(f, "Reply({state})")
    }
}

/// Type-erased view of a [`Reply`] used by the dispatcher to enforce the
/// result shape without knowing `T`.
pub trait ReplySlot: Send + Sync {
    fn is_set(&self) -> bool;

    /// Drops a stored value. Returns whether there was one.
    fn discard(&self) -> bool;
}

impl<T: Send> ReplySlot for Reply<T> {
    fn is_set(&self) -> bool {
        Reply::is_set(self)
    }

    fn discard(&self) -> bool {
        self.take().is_some()
    }
}
