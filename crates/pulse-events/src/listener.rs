//! Listener handles and the entries stored per topic.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type Callback<P> = dyn Fn(&P) + Send + Sync;

/// Cloneable handle around a listener callback.
///
/// Identity is the shared allocation: clones of a handle are the same
/// listener, while two handles built from identical closures are not.
pub struct Listener<P> {
    callback: Arc<Callback<P>>,
}

impl<P> Listener<P> {
    /// Wrap a callback in a new listener identity.
    #[must_use]
    pub fn new(callback: impl Fn(&P) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invoke the callback with `payload`.
    pub fn call(&self, payload: &P) {
        (self.callback)(payload);
    }

    /// Whether both handles refer to the same listener.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<P: 'static> Listener<P> {
    /// Adapter delegating to `self` under a fresh identity.
    pub(crate) fn adapter(&self) -> Self {
        let inner = self.clone();
        Self::new(move |payload: &P| inner.call(payload))
    }
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<P> Debug for Listener<P> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Listener")
            .field("id", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// One registration in a topic's sequence.
///
/// Once entries share a fired flag across every snapshot clone, so the entry
/// fires at most once however it is reached.
pub(crate) struct Entry<P> {
    pub(crate) listener: Listener<P>,
    fired: Option<Arc<AtomicBool>>,
}

impl<P> Entry<P> {
    pub(crate) const fn persistent(listener: Listener<P>) -> Self {
        Self {
            listener,
            fired: None,
        }
    }

    pub(crate) fn once(listener: Listener<P>) -> Self {
        Self {
            listener,
            fired: Some(Arc::new(AtomicBool::new(false))),
        }
    }

    pub(crate) const fn is_once(&self) -> bool {
        self.fired.is_some()
    }

    /// Claim the single firing of a once entry; persistent entries always claim.
    pub(crate) fn claim(&self) -> bool {
        self.fired
            .as_ref()
            .is_none_or(|fired| !fired.swap(true, Ordering::AcqRel))
    }
}

impl<P> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener.clone(),
            fired: self.fired.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn clones_share_identity() {
        let listener = Listener::new(|_: &u8| {});
        let clone = listener.clone();
        assert!(listener.same(&clone));
    }

    #[test]
    fn identical_closures_are_distinct_listeners() {
        let first = Listener::new(|_: &u8| {});
        let second = Listener::new(|_: &u8| {});
        assert!(!first.same(&second));
    }

    #[test]
    fn once_entry_claims_once_across_clones() {
        let entry = Entry::once(Listener::new(|_: &u8| {}));
        let snapshot = entry.clone();
        assert!(entry.is_once());
        assert!(snapshot.claim());
        assert!(!entry.claim());
        assert!(!snapshot.claim());
    }

    #[test]
    fn persistent_entry_always_claims() {
        let entry = Entry::persistent(Listener::new(|_: &u8| {}));
        assert!(!entry.is_once());
        assert!(entry.claim());
        assert!(entry.claim());
    }

    #[test]
    fn adapter_delegates_under_new_identity() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let original = Listener::new(move |value: &usize| {
            counter.fetch_add(*value, Ordering::SeqCst);
        });
        let adapter = original.adapter();

        adapter.call(&3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(!adapter.same(&original));
    }
}
